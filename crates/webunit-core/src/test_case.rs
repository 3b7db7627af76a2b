use crate::assert::{Assert, AssertKind, AssertResult};
use crate::error::{Error, Result};
use crate::location::Location;
use crate::page::{Method, PageFetcher, Request};
use crate::request_modifier::RequestModifier;
use tracing::{debug, trace};
use url::Url;

/// One request and the assertions checked against its response.
#[derive(Debug, Clone)]
pub struct TestCase {
    location: Location,
    method: Method,
    url: Url,
    asserts: Vec<Assert>,
    request_modifiers: Vec<RequestModifier>,
}

impl TestCase {
    pub fn new(location: Location, method: Method, url: Url) -> Self {
        Self {
            location,
            method,
            url,
            asserts: Vec::new(),
            request_modifiers: Vec::new(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn asserts(&self) -> &[Assert] {
        &self.asserts
    }

    pub fn request_modifiers(&self) -> &[RequestModifier] {
        &self.request_modifiers
    }

    /// Appends an assertion. An explicit status code assertion replaces the
    /// implicit 2xx check so non-2xx codes can be asserted.
    pub fn add_assert(&mut self, assert: Assert) {
        if matches!(assert.kind(), AssertKind::StatusCode(_)) {
            self.asserts
                .retain(|existing| !matches!(existing.kind(), AssertKind::Default));
        }
        self.asserts.push(assert);
    }

    /// Attaches a request modifier after checking it against the request
    /// method and every modifier already attached.
    pub fn add_request_modifier(&mut self, modifier: RequestModifier) -> Result<()> {
        if !modifier.is_allowed_for(self.method) {
            return Err(Error::MethodNotAllowedForRequestModifier {
                modifier: modifier.command(),
                method: self.method,
            });
        }
        if let Some(existing) = self
            .request_modifiers
            .iter()
            .find(|existing| !modifier.is_compatible_with(existing))
        {
            return Err(Error::IncompatibleRequestModifier {
                modifier: modifier.command(),
                other: existing.command(),
            });
        }
        self.request_modifiers.push(modifier);
        Ok(())
    }

    /// The request to send, with all request modifiers applied in order.
    pub fn build_request(&self) -> Request {
        let mut request = Request::new(self.method, self.url.clone());
        for modifier in &self.request_modifiers {
            modifier.modify_request(&mut request);
        }
        request
    }

    pub fn run(&self, fetcher: &dyn PageFetcher) -> TestCaseResult<'_> {
        self.run_with(fetcher, &mut |_| {})
    }

    /// Fetches the page and evaluates the assertions in order, stopping at
    /// the first failure. `observer` sees every evaluated assertion.
    pub fn run_with(
        &self,
        fetcher: &dyn PageFetcher,
        observer: &mut dyn FnMut(&AssertResult<'_>),
    ) -> TestCaseResult<'_> {
        debug!(location = %self.location, method = %self.method, url = %self.url, "fetching page");
        let page = fetcher.fetch(&self.build_request());
        debug!(status = page.status_code(), "page fetched");

        for assert in &self.asserts {
            let result = assert.test(&page);
            trace!(
                location = %assert.location(),
                command = assert.command(),
                success = result.is_success(),
                "assertion evaluated"
            );
            observer(&result);
            if !result.is_success() {
                return TestCaseResult {
                    test_case: self,
                    failed_assert: Some(result),
                };
            }
        }

        TestCaseResult {
            test_case: self,
            failed_assert: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestCaseResult<'a> {
    test_case: &'a TestCase,
    failed_assert: Option<AssertResult<'a>>,
}

impl<'a> TestCaseResult<'a> {
    pub fn test_case(&self) -> &'a TestCase {
        self.test_case
    }

    pub fn is_success(&self) -> bool {
        self.failed_assert.is_none()
    }

    /// The assertion that stopped the test case, if any.
    pub fn failed_assert(&self) -> Option<&AssertResult<'a>> {
        self.failed_assert.as_ref()
    }
}
