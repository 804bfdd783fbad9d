//! Error types for forksync-core

use std::path::PathBuf;

/// Result type for forksync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in forksync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Policy file does not exist
    #[error("Policy file not found at {path}")]
    PolicyNotFound { path: PathBuf },

    /// Policy file exists but cannot be read
    #[error("Cannot read policy file {path}: {source}")]
    PolicyUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Policy file contains no rules and the empty policy was not opted into
    #[error(
        "Policy file {path} contains no rules; set `policy.allow_empty = true` to protect every upstream path"
    )]
    EmptyPolicy { path: PathBuf },

    /// Running in CI without one of the dual-checkout directories
    #[error("Running in {vendor} CI but {variable} is not set")]
    MissingCiPath {
        variable: &'static str,
        vendor: String,
    },

    /// A dual-checkout directory is missing on disk
    #[error("Checkout directory not found: {path}")]
    CheckoutNotFound { path: PathBuf },

    /// Invalid TOML in a config layer
    #[error("Invalid configuration in {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A single change entry could not be applied
    #[error("Failed to apply change to {path}: {source}")]
    ApplyFailed {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// A commit could not be replayed; the run stopped here
    #[error("Failed to replay commit {commit}: {source}")]
    ReplayFailed {
        commit: String,
        #[source]
        source: Box<Error>,
    },

    /// The replay target already has staged changes
    #[error("Cannot replay into a repository with staged changes ({}); commit or unstage them first", paths.join(", "))]
    StagedChanges { paths: Vec<String> },

    /// A pre-commit hook not written by forksync is already installed
    #[error("A pre-commit hook already exists at {path}; use --force to replace it")]
    HookExists { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from forksync-fs
    #[error(transparent)]
    Fs(#[from] forksync_fs::Error),

    /// Git error from forksync-git
    #[error(transparent)]
    Git(#[from] forksync_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
