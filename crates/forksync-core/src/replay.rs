//! Commit replay engine
//!
//! Ports commits whose message matches a pattern from a source repository
//! into the current one, oldest first. A commit is identified by its
//! message: one already present in the target is skipped, so a run can be
//! repeated safely.
//!
//! The first failure stops the run and names the commit; later commits are
//! never replayed out of order.

use std::collections::HashSet;

use forksync_fs::NormalizedPath;
use forksync_fs::io::{remove_file_if_exists, write_atomic};
use forksync_git::commits::{commit_messages, find_matching_commits};
use forksync_git::diff::{diff_tree, staged_changes};
use forksync_git::helpers::{commit, read_blob, stage, stage_removal, toplevel};
use forksync_git::{CommitInfo, GitRunner, MessagePattern};
use serde::Serialize;

use crate::context::SYNC_OPERATION_ENV;
use crate::{Error, Result};

/// Commit hashes (in the source repository) grouped by what happened to them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub replayed: Vec<String>,
    /// Already present in the target by message
    pub skipped_existing: Vec<String>,
    /// Touched no files
    pub skipped_empty: Vec<String>,
}

impl ReplayReport {
    pub fn replayed_count(&self) -> usize {
        self.replayed.len()
    }
}

/// Replays commits from `source` into `target`.
pub struct CommitReplay<'a> {
    source: &'a GitRunner,
    target: &'a GitRunner,
}

impl<'a> CommitReplay<'a> {
    pub fn new(source: &'a GitRunner, target: &'a GitRunner) -> Self {
        Self { source, target }
    }

    /// Replay every matching commit not yet present in the target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StagedChanges`] without replaying anything when the
    /// target index is not clean, and [`Error::ReplayFailed`] for the first
    /// commit that could not be ported. Commits replayed before it remain
    /// committed.
    pub fn run(&self, pattern: &MessagePattern) -> Result<ReplayReport> {
        let staged = staged_changes(self.target)?;
        if !staged.is_empty() {
            return Err(Error::StagedChanges {
                paths: staged.into_iter().map(|entry| entry.path).collect(),
            });
        }

        let candidates = find_matching_commits(self.source, "HEAD", pattern)?;
        let mut existing: HashSet<String> = commit_messages(self.target)?.into_iter().collect();
        let target_root = NormalizedPath::new(toplevel(self.target)?);

        tracing::info!(
            pattern = pattern.as_str(),
            candidates = candidates.len(),
            "Replaying commits"
        );

        let mut report = ReplayReport::default();
        for info in candidates {
            if existing.contains(&info.message) {
                tracing::debug!(commit = %info.short_hash, "Already present in target");
                report.skipped_existing.push(info.hash);
                continue;
            }

            let replayed = self
                .replay_commit(&target_root, &info)
                .map_err(|source| Error::ReplayFailed {
                    commit: info.hash.clone(),
                    source: Box::new(source),
                })?;

            if replayed {
                tracing::info!(commit = %info.short_hash, summary = %info.summary, "Replayed");
                existing.insert(info.message);
                report.replayed.push(info.hash);
            } else {
                tracing::warn!(
                    commit = %info.short_hash,
                    summary = %info.summary,
                    "Commit changes no files, skipping"
                );
                report.skipped_empty.push(info.hash);
            }
        }

        Ok(report)
    }

    /// Port one commit. Returns `false` when the commit touched nothing.
    fn replay_commit(&self, target_root: &NormalizedPath, info: &CommitInfo) -> Result<bool> {
        let changes = diff_tree(self.source, &info.hash)?;
        if changes.is_empty() {
            return Ok(false);
        }

        for change in &changes {
            let destination = target_root.join(&change.path);
            if change.is_deletion() {
                remove_file_if_exists(&destination)?;
                stage_removal(self.target, &change.path)?;
            } else {
                let content = read_blob(self.source, &info.hash, &change.path)?;
                write_atomic(&destination, &content)?;
                stage(self.target, &change.path)?;
            }
        }

        commit(self.target, &info.message, &[(SYNC_OPERATION_ENV, "1")])?;
        Ok(true)
    }
}
