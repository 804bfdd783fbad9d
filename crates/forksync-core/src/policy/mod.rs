//! Pattern policy engine
//!
//! A [`Policy`] is the ordered list of allow-list rules loaded from the
//! policy file. It answers two questions about a repository path:
//!
//! - [`Policy::allows_local_override`]: may the fork change this path?
//!   Unmatched paths are protected.
//! - [`Policy::classify_for_sync`]: should an upstream change to this path
//!   be taken? Unmatched paths are taken.
//!
//! A negation rule always wins: the path stays protected and upstream
//! changes to it are always taken, whatever other rules say.

mod rule;

pub use rule::Rule;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use forksync_fs::normalize_repo_path;
use serde::Serialize;

use crate::{Error, Result};

/// What the sync should do with an upstream change to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// No rule matched; take the upstream change.
    ImplicitSync,
    /// A negation rule matched; always take the upstream change.
    ExplicitSync,
    /// The fork owns this path; keep the local version.
    ExplicitSkip,
}

impl Classification {
    /// Whether the sync applies changes with this classification.
    pub fn is_synced(&self) -> bool {
        !matches!(self, Self::ExplicitSkip)
    }
}

/// Ordered allow-list rules.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    rules: Vec<Rule>,
    source: Option<PathBuf>,
}

impl Policy {
    /// Parse policy file content. Blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        let rules = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Rule::parse)
            .collect();
        Self {
            rules,
            source: None,
        }
    }

    pub fn from_rules<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            rules: rules.into_iter().map(|r| Rule::parse(r.as_ref())).collect(),
            source: None,
        }
    }

    /// A policy without rules: every path is protected, every upstream
    /// change is taken.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the policy file at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::PolicyNotFound`] if the file does not exist
    /// - [`Error::PolicyUnreadable`] if it cannot be read
    /// - [`Error::EmptyPolicy`] if it has no rules and `allow_empty` is false
    pub fn load(path: &Path, allow_empty: bool) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::PolicyNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(Error::PolicyUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let mut policy = Self::parse(&content);
        if policy.rules.is_empty() && !allow_empty {
            return Err(Error::EmptyPolicy {
                path: path.to_path_buf(),
            });
        }
        policy.source = Some(path.to_path_buf());

        tracing::debug!(path = %path.display(), rules = policy.rules.len(), "Loaded policy");
        Ok(policy)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// File the policy was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Whether the fork may change `path`.
    ///
    /// A matching negation rule vetoes immediately. A plain match allows the
    /// override unless a later negation vetoes it. No match means protected.
    pub fn allows_local_override(&self, path: &str) -> bool {
        let path = normalize_repo_path(path);
        let mut allowed = false;
        for rule in &self.rules {
            if rule.matches(&path) {
                if rule.is_negated() {
                    return false;
                }
                allowed = true;
            }
        }
        allowed
    }

    /// How an upstream change to `path` is treated by the sync.
    pub fn classify_for_sync(&self, path: &str) -> Classification {
        let path = normalize_repo_path(path);
        let mut plain_match = false;
        for rule in &self.rules {
            if rule.matches(&path) {
                if rule.is_negated() {
                    return Classification::ExplicitSync;
                }
                plain_match = true;
            }
        }
        if plain_match {
            Classification::ExplicitSkip
        } else {
            Classification::ImplicitSync
        }
    }
}
