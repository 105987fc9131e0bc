//! Error types for cm-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from cm-core
    #[error(transparent)]
    Core(#[from] cm_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output could not be produced
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Hint printed after the error, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Core(e) if e.is_retryable() => Some("another rebuild is running; try again shortly"),
            Self::Core(cm_core::Error::SnapshotRead { .. }) => {
                Some("no installed packages found; run `composer-manager install` first")
            }
            _ => None,
        }
    }
}
