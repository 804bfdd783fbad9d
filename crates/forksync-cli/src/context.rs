//! Repository context detection
//!
//! Finds the repository root from any directory inside it, so commands work
//! from anywhere in the working tree the way git does.

use std::path::{Path, PathBuf};

use forksync_core::{ConfigResolver, Policy, ResolvedConfig};
use forksync_git::GitRunner;
use forksync_git::helpers::{is_repository, toplevel};

use crate::error::{CliError, Result};

/// A discovered repository with its effective configuration.
pub struct RepoContext {
    pub root: PathBuf,
    pub config: ResolvedConfig,
    /// Runner rooted at `root`, using the configured timeout
    pub runner: GitRunner,
}

impl RepoContext {
    /// Locate the repository containing `start` and resolve its config.
    pub fn discover(start: &Path) -> Result<Self> {
        let lookup = GitRunner::new(start);
        if !is_repository(&lookup) {
            return Err(CliError::user(format!(
                "{} is not inside a git repository",
                start.display()
            )));
        }
        let root = toplevel(&lookup)?;
        let config = ConfigResolver::new(root.as_path()).resolve()?;
        let runner = GitRunner::new(&root).with_timeout(config.git_timeout());

        tracing::debug!(root = %root.display(), upstream = %config.upstream_ref(), "Repository context");
        Ok(Self {
            root,
            config,
            runner,
        })
    }

    /// Load the allow-list named by the configuration.
    pub fn load_policy(&self) -> Result<Policy> {
        let path = self.config.policy_path(&self.root);
        Ok(Policy::load(&path, self.config.allow_empty_policy)?)
    }
}
