//! Configuration resolution with layered merge
//!
//! Two layers are read, later wins per field:
//!
//! 1. Repository config (`.forksync/config.toml`)
//! 2. Local overrides (`.forksync/config.local.toml`, git-ignored)
//!
//! Missing layers are skipped; defaults fill whatever neither layer sets.

use std::path::{Path, PathBuf};
use std::time::Duration;

use forksync_fs::{NormalizedPath, RepoPath};
use serde::Serialize;

use super::manifest::Manifest;
use crate::Result;

pub const DEFAULT_REMOTE: &str = "upstream";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Effective configuration after merging all layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub remote: String,
    pub url: Option<String>,
    pub branch: String,
    /// Policy file relative to the repository root
    pub policy_file: String,
    pub allow_empty_policy: bool,
    pub timeout_secs: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::from(Manifest::empty())
    }
}

impl From<Manifest> for ResolvedConfig {
    fn from(manifest: Manifest) -> Self {
        Self {
            remote: manifest
                .upstream
                .remote
                .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
            url: manifest.upstream.url,
            branch: manifest
                .upstream
                .branch
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            policy_file: manifest
                .policy
                .file
                .unwrap_or_else(|| RepoPath::PolicyFile.as_str().to_string()),
            allow_empty_policy: manifest.policy.allow_empty.unwrap_or(false),
            timeout_secs: manifest.git.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ResolvedConfig {
    /// Remote-tracking reference to synchronize from, e.g. `upstream/main`.
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }

    /// Absolute path of the policy file under `root`.
    pub fn policy_path(&self, root: &Path) -> PathBuf {
        root.join(&self.policy_file)
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Resolves configuration for one repository root.
pub struct ConfigResolver {
    root: NormalizedPath,
}

impl ConfigResolver {
    pub fn new(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    /// Merge both layers into the effective configuration.
    ///
    /// # Errors
    ///
    /// Invalid TOML in either layer is an [`Error::ConfigParse`](crate::Error::ConfigParse)
    /// naming the file.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let mut manifest = Manifest::empty();

        let repo_config_path = self.root.join(RepoPath::ConfigFile.as_str());
        if let Some(layer) = Manifest::load(&repo_config_path.to_native())? {
            tracing::debug!(path = %repo_config_path, "Loaded repo config");
            manifest.merge(&layer);
        }

        let local_config_path = self.root.join(RepoPath::LocalConfigFile.as_str());
        if let Some(layer) = Manifest::load(&local_config_path.to_native())? {
            tracing::debug!(path = %local_config_path, "Loaded local overrides");
            manifest.merge(&layer);
        }

        Ok(ResolvedConfig::from(manifest))
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Check if a repository configuration exists
    pub fn has_config(&self) -> bool {
        self.root.join(RepoPath::ConfigFile.as_str()).is_file()
    }

    /// Check if local overrides exist
    pub fn has_local_overrides(&self) -> bool {
        self.root.join(RepoPath::LocalConfigFile.as_str()).is_file()
    }
}
