use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot read test file {}: {source}", .path.display())]
    ReadTestFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot read attachment {}: {source}", .path.display())]
    ReadAttachment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
