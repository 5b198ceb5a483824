//! Output error types.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while writing or reading output artifacts.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The temporary file could not replace the target.
    #[error("failed to replace {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Panel snapshot could not be encoded or decoded.
    #[error("invalid panel snapshot {path}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Error from Polars DataFrame operations.
    #[error("DataFrame error: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for OutputError {
    fn from(err: PolarsError) -> Self {
        OutputError::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
