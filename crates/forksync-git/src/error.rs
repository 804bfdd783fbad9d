//! Error types for forksync-git

use std::path::PathBuf;

/// Result type for forksync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in forksync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("`{command}` failed (exit code {}): {stderr}", exit_code.map_or("none".to_string(), |c| c.to_string()))]
    CommandFailed {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("`{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed name-status line: {line:?}")]
    MalformedDiffLine { line: String },

    #[error("Malformed log record: {record:?}")]
    MalformedLog { record: String },

    #[error("Reference '{name}' not found")]
    RefNotFound { name: String },

    #[error("HEAD is detached in {path}; check out a branch first")]
    DetachedHead { path: PathBuf },

    #[error("Invalid message pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Filesystem error: {0}")]
    Fs(#[from] forksync_fs::Error),
}
