//! Error types for forksync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from forksync-core
    #[error(transparent)]
    Core(#[from] forksync_core::Error),

    /// Error from forksync-git
    #[error(transparent)]
    Git(#[from] forksync_git::Error),

    /// Error from forksync-fs
    #[error(transparent)]
    Fs(#[from] forksync_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },

    /// The operator declined to continue
    #[error("aborted, no changes were made")]
    Cancelled,

    /// Protected paths were changed
    #[error("{count} protected path(s) changed")]
    Violations { count: usize },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Violations { .. } => 2,
            Self::Cancelled => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(CliError::user("bad").exit_code(), 1);
        assert_eq!(CliError::Violations { count: 2 }.exit_code(), 2);
        assert_eq!(CliError::Cancelled.exit_code(), 3);
    }

    #[test]
    fn test_core_error_passes_through() {
        let err: CliError = forksync_core::Error::PolicyNotFound {
            path: "/r/.forksync/allowlist".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains(".forksync/allowlist"));
    }
}
