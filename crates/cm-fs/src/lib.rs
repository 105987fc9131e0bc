//! Filesystem layer for composer-manager
//!
//! Provides path normalization, atomic writes, a format-agnostic document
//! store for the JSON manifests and TOML settings, and the advisory file lock
//! that serializes regeneration of the root manifest.

pub mod checksum;
pub mod error;
pub mod io;
pub mod lock;
pub mod path;
pub mod store;

pub use error::{Error, Result};
pub use lock::{FileLock, FileLockGuard};
pub use path::NormalizedPath;
pub use store::DocumentStore;
