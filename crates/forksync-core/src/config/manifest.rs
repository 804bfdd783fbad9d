//! Manifest parsing for config.toml files
//!
//! A manifest is one configuration layer. Every field is optional so that a
//! layer only overrides what it mentions; defaults are applied once, when
//! layers are resolved into a [`ResolvedConfig`](super::ResolvedConfig).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// `[upstream]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    /// Remote name in the fork
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Remote URL, used by `init` to add the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Branch on the remote to synchronize from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

/// `[policy]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySection {
    /// Policy file, relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Accept a policy file without rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty: Option<bool>,
}

/// `[git]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitSection {
    /// Per-command timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// One configuration layer parsed from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub policy: PolicySection,

    #[serde(default)]
    pub git: GitSection,
}

impl Manifest {
    /// Parse a manifest from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use forksync_core::config::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"
    /// [upstream]
    /// remote = "upstream"
    /// branch = "develop"
    /// "#).unwrap();
    ///
    /// assert_eq!(manifest.upstream.branch.as_deref(), Some("develop"));
    /// ```
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse the manifest at `path`, or `None` if there is no file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] naming the file when the TOML is invalid.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map(Some)
            .map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })
    }

    /// Create an empty manifest.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Serialize to TOML, omitting unset fields.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Overlay `other` onto this manifest. Fields set in `other` win.
    pub fn merge(&mut self, other: &Manifest) {
        overlay(&mut self.upstream.remote, &other.upstream.remote);
        overlay(&mut self.upstream.url, &other.upstream.url);
        overlay(&mut self.upstream.branch, &other.upstream.branch);
        overlay(&mut self.policy.file, &other.policy.file);
        overlay(&mut self.policy.allow_empty, &other.policy.allow_empty);
        overlay(&mut self.git.timeout_secs, &other.git.timeout_secs);
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        base.clone_from(other);
    }
}
