//! Error types for language file handling

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The line does not start with the prefix its record kind requires.
    #[error("not a {expected} record: {line:?}")]
    Parse {
        expected: &'static str,
        line: String,
    },

    /// The record prefix is present but its id is not a number.
    #[error("malformed record id: {value:?}")]
    MalformedId { value: String },

    #[error("language file not found: {}", path.display())]
    MissingFile { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
