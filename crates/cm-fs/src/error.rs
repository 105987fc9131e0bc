//! Error types for cm-fs

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cm-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cm-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} document at {path}: {message}")]
    DocumentParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} document for {path}: {message}")]
    DocumentSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported document format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Short write to {path}: expected {expected} bytes, wrote {written}")]
    ShortWrite {
        path: PathBuf,
        expected: u64,
        written: u64,
    },

    #[error("Could not acquire lock {path} within {waited:?}")]
    LockTimeout { path: PathBuf, waited: Duration },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the operation may succeed if retried later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. })
    }
}
