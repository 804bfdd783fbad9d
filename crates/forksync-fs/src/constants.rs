//! Constants for well-known repository paths.

use std::path::Path;

/// Directories never walked when comparing two checkouts: version-control
/// metadata and dependency/build output.
pub const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "target", "vendor", ".venv"];

/// Whether a directory name is skipped during checkout comparison.
pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

/// Standard repository filesystem markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoPath {
    /// The `.forksync` directory (configuration root)
    ConfigDir,
    /// The shared configuration file
    ConfigFile,
    /// The git-ignored local configuration overlay
    LocalConfigFile,
    /// The default allow-list policy file
    PolicyFile,
}

impl RepoPath {
    /// Get the string representation of the path, relative to the repo root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigDir => ".forksync",
            Self::ConfigFile => ".forksync/config.toml",
            Self::LocalConfigFile => ".forksync/config.local.toml",
            Self::PolicyFile => ".forksync/allowlist",
        }
    }
}

impl AsRef<Path> for RepoPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
