//! Error types for cm-core

use std::path::PathBuf;
use std::time::Duration;

/// Result type for cm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while merging, writing, or reconciling manifests
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The core manifest lacks a field every root manifest depends on
    #[error("Invalid core manifest: {reason}")]
    InvalidCoreManifest { reason: String },

    /// A core or component manifest could not be read or parsed
    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: cm_fs::Error,
    },

    /// The root manifest could not be persisted
    #[error("Failed to write root manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: cm_fs::Error,
    },

    /// The installed-package snapshot is missing or unreadable
    #[error("Failed to read installed packages from {path}: {source}")]
    SnapshotRead {
        path: PathBuf,
        #[source]
        source: cm_fs::Error,
    },

    /// The installed-package snapshot is not a package list
    #[error("Malformed installed packages at {path}: {message}")]
    SnapshotParse { path: PathBuf, message: String },

    /// Another process holds the write lock
    #[error("Could not acquire lock {lock} within {waited:?}")]
    LockTimeout { lock: String, waited: Duration },

    /// Extension discovery failed to walk a directory
    #[error("Failed to scan {path} for extensions: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resolver binary could not be started
    #[error("Failed to run {program}: {source}")]
    ResolverSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The resolver ran but reported failure
    #[error("composer {action} failed with exit code {code}: {stderr}")]
    ResolverFailed {
        action: String,
        code: i32,
        stderr: String,
    },

    /// Filesystem error from cm-fs
    #[error(transparent)]
    Fs(#[from] cm_fs::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the caller may retry the operation later.
    ///
    /// Only lock acquisition is expected to contend transiently.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LockTimeout { .. } => true,
            Self::Fs(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}
