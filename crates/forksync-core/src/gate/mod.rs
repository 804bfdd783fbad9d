//! Protection gate
//!
//! Rejects changes to upstream-owned paths the policy does not allow the
//! fork to override. Two contexts are supported:
//!
//! - **Local**: staged changes are compared against the upstream tree
//!   listing, for use from a pre-commit hook
//! - **Dual checkout**: in CI, the upstream and fork checkouts are walked and
//!   files present in both with different content are checked
//!
//! Commits made by forksync itself set the
//! [`SYNC_OPERATION_ENV`](crate::SYNC_OPERATION_ENV) escape hatch and pass
//! without any per-file evaluation.

mod walk;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use forksync_fs::checksum::files_identical;
use forksync_git::diff::staged_changes;
use forksync_git::helpers::list_tree;
use forksync_git::{ChangeEntry, ChangeKind, GitRunner};
use serde::Serialize;

use crate::context::ExecutionContext;
use crate::policy::Policy;
use crate::Result;

/// What the gate inspects.
#[derive(Debug, Clone)]
pub enum CheckContext {
    /// Staged changes checked against the paths that exist upstream
    Local {
        staged: Vec<ChangeEntry>,
        upstream_paths: BTreeSet<String>,
    },
    /// Two checkouts compared file by file
    DualCheckout {
        upstream_root: PathBuf,
        fork_root: PathBuf,
    },
}

impl CheckContext {
    /// Collect the staged changes and the tree listing of `upstream_ref`.
    pub fn local(runner: &GitRunner, upstream_ref: &str) -> Result<Self> {
        Ok(Self::Local {
            staged: staged_changes(runner)?,
            upstream_paths: list_tree(runner, upstream_ref)?,
        })
    }

    pub fn dual_checkout(upstream_root: impl Into<PathBuf>, fork_root: impl Into<PathBuf>) -> Self {
        Self::DualCheckout {
            upstream_root: upstream_root.into(),
            fork_root: fork_root.into(),
        }
    }
}

/// A change to a protected path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub change_kind: ChangeKind,
    /// Upstream copy of the file, in dual-checkout mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_path: Option<PathBuf>,
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GateReport {
    pub violations: Vec<Violation>,
    /// The escape hatch was set and nothing was checked
    pub bypassed: bool,
}

impl GateReport {
    pub fn bypassed() -> Self {
        Self {
            violations: Vec::new(),
            bypassed: true,
        }
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// The report with violations ordered by path.
    pub fn sorted(mut self) -> Self {
        self.violations.sort_by(|a, b| a.path.cmp(&b.path));
        self
    }
}

/// Checks changes against a policy.
pub struct ProtectionGate<'a> {
    policy: &'a Policy,
}

impl<'a> ProtectionGate<'a> {
    pub fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    /// Evaluate `context`, returning a path-sorted report.
    pub fn check(&self, context: &CheckContext, exec: &ExecutionContext) -> Result<GateReport> {
        if exec.sync_operation {
            tracing::info!("Synchronization commit, protection check bypassed");
            return Ok(GateReport::bypassed());
        }

        let violations = match context {
            CheckContext::Local {
                staged,
                upstream_paths,
            } => self.check_staged(staged, upstream_paths),
            CheckContext::DualCheckout {
                upstream_root,
                fork_root,
            } => self.check_checkouts(upstream_root, fork_root)?,
        };

        tracing::debug!(violations = violations.len(), "Protection check finished");
        Ok(GateReport {
            violations,
            bypassed: false,
        }
        .sorted())
    }

    fn check_staged(
        &self,
        staged: &[ChangeEntry],
        upstream_paths: &BTreeSet<String>,
    ) -> Vec<Violation> {
        staged
            .iter()
            .filter_map(|entry| {
                entry
                    .paths()
                    .find(|path| {
                        upstream_paths.contains(*path) && !self.policy.allows_local_override(path)
                    })
                    .map(|path| Violation {
                        path: path.to_string(),
                        change_kind: entry.kind,
                        upstream_path: None,
                    })
            })
            .collect()
    }

    fn check_checkouts(&self, upstream_root: &Path, fork_root: &Path) -> Result<Vec<Violation>> {
        let upstream_files = walk::list_files(upstream_root)?;
        let fork_files = walk::list_files(fork_root)?;

        let mut violations = Vec::new();
        for path in upstream_files.intersection(&fork_files) {
            if self.policy.allows_local_override(path) {
                continue;
            }
            let upstream_file = upstream_root.join(path);
            let fork_file = fork_root.join(path);
            if !files_identical(&upstream_file, &fork_file)? {
                violations.push(Violation {
                    path: path.clone(),
                    change_kind: ChangeKind::Modified,
                    upstream_path: Some(upstream_file),
                });
            }
        }
        Ok(violations)
    }
}
