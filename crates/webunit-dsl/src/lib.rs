//! Parser for webunit test files.
//!
//! A test file is a sequence of line commands:
//!
//! ```text
//! set-default HOST = localhost:8080
//!
//! get http://{HOST}/
//! assert-contains "welcome" ~
//! assert-header "Content-Type: text/html"
//!
//! post http://{HOST}/login
//! with-post-parameter user jane
//! assert-status-code 302
//! ```
//!
//! Parsing never stops at the first defect: [`ParseResult::errors`] holds
//! one [`ParseError`] per malformed line, and the suite may only be run when
//! that list is empty.

pub mod context;
pub mod parser;
pub mod value;

pub use context::ParseContext;
pub use parser::{parse_content, ParseError, ParseErrorKind, ParseResult, Parser};
pub use value::{tokenize, Token, TokenizeError, ValueError, ValueParser};

use std::path::Path;

/// Reads and parses the test file at `path`.
pub fn parse_file(path: impl AsRef<Path>, context: ParseContext) -> std::io::Result<ParseResult> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    Ok(parse_content(&content, path, context))
}
