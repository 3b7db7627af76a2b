use crate::error::{Error, Result};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, warn};
use webunit_core::{Method, PageFetcher, PageResult, Request, RequestBody};

const MAX_REDIRECTS: usize = 10;

/// Fetches pages over HTTP with a blocking client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, follow_redirects: bool) -> Result<Self> {
        let redirect = if follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };
        let client = Client::builder()
            .timeout(timeout)
            .redirect(redirect)
            .user_agent(concat!("webunit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn send(&self, request: &Request) -> Result<PageResult> {
        let mut builder = self
            .client
            .request(http_method(request.method()), request.url().clone());
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        let builder = with_body(builder, request.body())?;

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                format!("{}: {}", name.as_str(), String::from_utf8_lossy(value.as_bytes()))
            })
            .collect();
        let body = match response.text() {
            Ok(body) => body,
            Err(error) => {
                warn!(status, error = %error, "failed to read response body");
                String::new()
            }
        };

        debug!(status, bytes = body.len(), "response received");
        Ok(PageResult::new(status, headers, body))
    }
}

impl PageFetcher for HttpFetcher {
    /// Transport failures are reported as status code 0 with no headers and
    /// an empty body.
    fn fetch(&self, request: &Request) -> PageResult {
        match self.send(request) {
            Ok(page) => page,
            Err(error) => {
                warn!(
                    method = %request.method(),
                    url = %request.url(),
                    error = %error,
                    "request failed"
                );
                PageResult::new(0, Vec::new(), "")
            }
        }
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn with_body(builder: RequestBuilder, body: &RequestBody) -> Result<RequestBuilder> {
    let builder = match body {
        RequestBody::Empty => builder,
        RequestBody::Raw(content) => builder.body(content.clone()),
        RequestBody::Form { parameters, files } if files.is_empty() => builder.form(parameters),
        RequestBody::Form { parameters, files } => {
            let mut form = Form::new();
            for (name, value) in parameters {
                form = form.text(name.clone(), value.clone());
            }
            for (name, path) in files {
                form = form
                    .file(name.clone(), path)
                    .map_err(|source| Error::ReadAttachment {
                        path: path.clone(),
                        source,
                    })?;
            }
            builder.multipart(form)
        }
    };
    Ok(builder)
}
