//! Advisory file lock with a bounded wait
//!
//! Regenerating the root manifest is a read-merge-write sequence that must not
//! interleave across processes. [`FileLock`] polls an exclusive `fs2` lock on a
//! sidecar file with exponential backoff until the timeout elapses.

use std::fs::{File, OpenOptions};
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// A named lock backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileLock {
    path: NormalizedPath,
}

/// Holds the lock until dropped.
#[derive(Debug)]
pub struct FileLockGuard {
    file: File,
    path: NormalizedPath,
}

impl FileLock {
    pub fn new(path: impl Into<NormalizedPath>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    /// Try to take the lock, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] when another holder keeps the lock for
    /// the whole wait, or an I/O error when the lock file cannot be opened.
    pub fn acquire(&self, timeout: Duration) -> Result<FileLockGuard> {
        let native = self.path.to_native();
        if let Some(parent) = native.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&native)
            .map_err(|e| Error::io(&native, e))?;

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(20))
            .with_max_interval(Duration::from_millis(500))
            .with_max_elapsed_time(Some(timeout))
            .build();

        let attempt = || {
            file.try_lock_exclusive()
                .map_err(backoff::Error::transient)
        };

        match backoff::retry(policy, attempt) {
            Ok(()) => {
                tracing::debug!(path = %self.path, "acquired lock");
                Ok(FileLockGuard {
                    file,
                    path: self.path.clone(),
                })
            }
            Err(backoff::Error::Permanent(err) | backoff::Error::Transient { err, .. }) => {
                tracing::warn!(path = %self.path, ?timeout, error = %err, "lock wait timed out");
                Err(Error::LockTimeout {
                    path: native,
                    waited: timeout,
                })
            }
        }
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path, error = %e, "failed to release lock");
        } else {
            tracing::debug!(path = %self.path, "released lock");
        }
    }
}
