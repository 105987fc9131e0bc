//! Exclusive access to the root manifest

use std::time::Duration;

use cm_fs::FileLock;

use crate::error::{Error, Result};

/// Default wait before giving up on a held lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// A lock guarding the read-merge-write of the root manifest.
pub trait WriteLock {
    /// Take the lock, waiting at most `timeout`.
    ///
    /// Fails with [`Error::LockTimeout`] if the lock stays held.
    fn acquire(&self, timeout: Duration) -> Result<LockGuard>;
}

/// Releases the lock it represents when dropped.
pub struct LockGuard {
    _held: Option<Box<dyn Send>>,
}

impl LockGuard {
    /// Wrap an implementation guard that releases on drop.
    pub fn new(held: impl Send + 'static) -> Self {
        Self {
            _held: Some(Box::new(held)),
        }
    }

    /// A guard with nothing to release.
    pub fn unlocked() -> Self {
        Self { _held: None }
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("held", &self._held.is_some())
            .finish()
    }
}

impl WriteLock for FileLock {
    fn acquire(&self, timeout: Duration) -> Result<LockGuard> {
        match FileLock::acquire(self, timeout) {
            Ok(guard) => Ok(LockGuard::new(guard)),
            Err(cm_fs::Error::LockTimeout { path, waited }) => Err(Error::LockTimeout {
                lock: path.display().to_string(),
                waited,
            }),
            Err(other) => Err(other.into()),
        }
    }
}

/// A lock that is always free, for single-process use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLock;

impl WriteLock for NoopLock {
    fn acquire(&self, _timeout: Duration) -> Result<LockGuard> {
        Ok(LockGuard::unlocked())
    }
}
