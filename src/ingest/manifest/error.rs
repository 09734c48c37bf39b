//! Error types for manifest parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that make a manifest unreadable as a whole.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// I/O error while reading the manifest
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV structure error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record that cannot be interpreted at all
    #[error("Invalid record {row}: {message}")]
    InvalidRecord {
        /// 1-based record number
        row: usize,
        /// Description of the problem
        message: String,
    },

    /// No registered format handles this file
    #[error("Unsupported manifest format: {path:?}")]
    UnsupportedFormat {
        /// The manifest path
        path: PathBuf,
    },
}
