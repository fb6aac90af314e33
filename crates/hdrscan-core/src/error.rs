//! Error types for hdrscan

use std::process::ExitStatus;
use thiserror::Error;

/// hdrscan error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The compilation database does not match a known shape
    #[error("Unexpected compilation database format: {0}")]
    Format(String),

    #[error("Malformed command in entry {index}: {reason}")]
    MalformedCommand { index: usize, reason: String },

    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The preprocessor ran but exited unsuccessfully
    #[error("`{program}` exited with {status}: {stderr}")]
    SubprocessFailure {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Result type alias for hdrscan
pub type Result<T> = std::result::Result<T, Error>;
