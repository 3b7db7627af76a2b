//! The boundary to the page fetcher: outgoing requests and fetched pages.

use std::fmt;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Maps a request command (`get`, `post`, ...) to its method.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "get" => Some(Method::Get),
            "post" => Some(Method::Post),
            "put" => Some(Method::Put),
            "patch" => Some(Method::Patch),
            "delete" => Some(Method::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Raw(String),
    Form {
        parameters: Vec<(String, String)>,
        files: Vec<(String, PathBuf)>,
    },
}

/// A request as it is handed to the [`PageFetcher`], after all request
/// modifiers of a test case have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: RequestBody,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn add_post_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let entry = (name.into(), value.into());
        match &mut self.body {
            RequestBody::Form { parameters, .. } => parameters.push(entry),
            body => {
                *body = RequestBody::Form {
                    parameters: vec![entry],
                    files: Vec::new(),
                }
            }
        }
    }

    pub fn add_post_file(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        let entry = (name.into(), path.into());
        match &mut self.body {
            RequestBody::Form { files, .. } => files.push(entry),
            body => {
                *body = RequestBody::Form {
                    parameters: Vec::new(),
                    files: vec![entry],
                }
            }
        }
    }

    pub fn set_raw_content(&mut self, content: impl Into<String>) {
        self.body = RequestBody::Raw(content.into());
    }
}

/// A fetched page: status code, raw `Name: Value` header lines and body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageResult {
    status_code: u16,
    headers: Vec<String>,
    body: String,
}

impl PageResult {
    pub fn new(status_code: u16, headers: Vec<String>, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers,
            body: body.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Performs the network request for a test case.
///
/// Transport failures are reported as an ordinary [`PageResult`] (status
/// code 0 by convention); the assertions then fail like on any other
/// mismatch.
pub trait PageFetcher {
    fn fetch(&self, request: &Request) -> PageResult;
}

impl<F> PageFetcher for F
where
    F: Fn(&Request) -> PageResult,
{
    fn fetch(&self, request: &Request) -> PageResult {
        self(request)
    }
}
