//! Command-line runner for webunit test files.

pub mod cli;
pub mod error;
pub mod fetcher;
pub mod output;
pub mod runner;

pub use error::{Error, Result};
pub use fetcher::HttpFetcher;
pub use runner::{run, usage_status, Status};
