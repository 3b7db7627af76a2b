use crate::modifiers::Modifiers;
use crate::page::Method;
use std::path::PathBuf;
use thiserror::Error;

/// Invariant violations raised while constructing assertions, request
/// modifiers or attaching them to a test case.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parameter name must not be empty.")]
    EmptyParameterName,

    #[error("File path \"{}\" is not absolute.", .0.display())]
    InvalidFilePath(PathBuf),

    #[error("File \"{}\" does not exist or is not a regular file.", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid header \"{0}\", expected \"Name: value\".")]
    InvalidHeader(String),

    #[error("Invalid status code {0}, expected a value between 100 and 599.")]
    InvalidStatusCode(u16),

    #[error("Modifier(s) {} not allowed for {}.", .modifiers.describe(), .command)]
    NotAllowedModifier {
        command: &'static str,
        modifiers: Modifiers,
    },

    #[error("Invalid regular expression \"{pattern}\": {source}")]
    InvalidRegexp {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Request modifier {modifier} cannot be combined with {other}.")]
    IncompatibleRequestModifier {
        modifier: &'static str,
        other: &'static str,
    },

    #[error("Request modifier {modifier} is not allowed for {method} requests.")]
    MethodNotAllowedForRequestModifier {
        modifier: &'static str,
        method: Method,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
