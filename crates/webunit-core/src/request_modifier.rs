use crate::error::{Error, Result};
use crate::page::{Method, Request};
use std::path::PathBuf;

/// A change applied to the outgoing request of a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestModifier {
    WithHeader { name: String, value: String },
    WithPostParameter { name: String, value: String },
    WithPostFile { name: String, path: PathBuf },
    WithRawContent(String),
}

impl RequestModifier {
    /// Parses a `Name: value` header line.
    pub fn header(line: &str) -> Result<Self> {
        let Some((name, value)) = line.split_once(':') else {
            return Err(Error::InvalidHeader(line.to_string()));
        };
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(Error::InvalidHeader(line.to_string()));
        }
        Ok(RequestModifier::WithHeader {
            name: name.to_string(),
            value: value.trim().to_string(),
        })
    }

    pub fn post_parameter(name: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyParameterName);
        }
        Ok(RequestModifier::WithPostParameter {
            name,
            value: value.into(),
        })
    }

    /// The file must be given by absolute path and exist as a regular file.
    pub fn post_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        let path = path.into();
        if name.is_empty() {
            return Err(Error::EmptyParameterName);
        }
        if !path.is_absolute() {
            return Err(Error::InvalidFilePath(path));
        }
        if !path.is_file() {
            return Err(Error::FileNotFound(path));
        }
        Ok(RequestModifier::WithPostFile { name, path })
    }

    pub fn raw_content(content: impl Into<String>) -> Self {
        RequestModifier::WithRawContent(content.into())
    }

    pub fn command(&self) -> &'static str {
        match self {
            RequestModifier::WithHeader { .. } => "with-header",
            RequestModifier::WithPostParameter { .. } => "with-post-parameter",
            RequestModifier::WithPostFile { .. } => "with-post-file",
            RequestModifier::WithRawContent(_) => "with-raw-content",
        }
    }

    /// Only headers may be attached to a GET request.
    pub fn is_allowed_for(&self, method: Method) -> bool {
        match self {
            RequestModifier::WithHeader { .. } => true,
            RequestModifier::WithPostParameter { .. }
            | RequestModifier::WithPostFile { .. }
            | RequestModifier::WithRawContent(_) => method != Method::Get,
        }
    }

    /// A raw body and a form body exclude each other. Symmetric.
    pub fn is_compatible_with(&self, other: &RequestModifier) -> bool {
        !matches!(
            (self, other),
            (
                RequestModifier::WithRawContent(_),
                RequestModifier::WithPostParameter { .. } | RequestModifier::WithPostFile { .. }
            ) | (
                RequestModifier::WithPostParameter { .. } | RequestModifier::WithPostFile { .. },
                RequestModifier::WithRawContent(_)
            )
        )
    }

    pub fn modify_request(&self, request: &mut Request) {
        match self {
            RequestModifier::WithHeader { name, value } => request.add_header(name, value),
            RequestModifier::WithPostParameter { name, value } => {
                request.add_post_parameter(name, value)
            }
            RequestModifier::WithPostFile { name, path } => {
                request.add_post_file(name, path.clone())
            }
            RequestModifier::WithRawContent(content) => request.set_raw_content(content),
        }
    }
}
