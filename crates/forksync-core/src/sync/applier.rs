//! The apply state machine

use forksync_fs::NormalizedPath;
use forksync_fs::io::{remove_file_if_exists, write_atomic};
use forksync_git::diff::diff;
use forksync_git::helpers::{current_branch, toplevel};
use forksync_git::{ChangeEntry, ChangeKind, GitRunner, TransientBranch};

use super::report::{
    AppliedChange, LocalAction, SyncOptions, SyncOutcome, SyncPlan, SyncReport, SyncState,
};
use crate::policy::Policy;
use crate::{Error, Result};

/// Pulls policy-filtered upstream changes into a working tree.
pub struct SyncApplier<'a> {
    runner: &'a GitRunner,
    policy: &'a Policy,
    upstream_ref: String,
    options: SyncOptions,
}

impl<'a> SyncApplier<'a> {
    pub fn new(runner: &'a GitRunner, policy: &'a Policy, upstream_ref: impl Into<String>) -> Self {
        Self {
            runner,
            policy,
            upstream_ref: upstream_ref.into(),
            options: SyncOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Diff the upstream reference against `HEAD` and split the entries
    /// by policy.
    pub fn plan(&self) -> Result<SyncPlan> {
        let local_branch = current_branch(self.runner)?;
        let changes = diff(self.runner, &self.upstream_ref, "HEAD")?;
        Ok(self.filter(local_branch, changes))
    }

    /// Split `changes` into kept and skipped entries.
    ///
    /// A rename is kept only when both its upstream and local paths are
    /// synced; applying it removes the local path.
    pub fn filter(&self, local_branch: String, changes: Vec<ChangeEntry>) -> SyncPlan {
        let (kept, skipped): (Vec<_>, Vec<_>) = changes.into_iter().partition(|entry| {
            entry
                .paths()
                .all(|path| self.policy.classify_for_sync(path).is_synced())
        });

        tracing::debug!(
            upstream = %self.upstream_ref,
            kept = kept.len(),
            skipped = skipped.len(),
            "Planned sync"
        );

        SyncPlan {
            upstream_ref: self.upstream_ref.clone(),
            local_branch,
            kept,
            skipped,
        }
    }

    /// Run the plan through confirmation, application and cleanup.
    ///
    /// An empty plan or a declined confirmation ends in
    /// [`SyncState::Failed`] without touching the working tree; `confirm` is
    /// not called for an empty plan. The transient branch is cleaned up on
    /// every path once created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApplyFailed`] for the first entry that could not be
    /// applied. Entries before it stay applied.
    pub fn apply<F>(&self, plan: SyncPlan, confirm: F) -> Result<SyncReport>
    where
        F: FnOnce(&SyncPlan) -> bool,
    {
        let mut run = Run::new();

        if plan.is_empty() {
            tracing::info!(upstream = %plan.upstream_ref, "Nothing to apply");
            return Ok(run.finish(SyncState::Failed, SyncOutcome::NothingToApply));
        }

        if self.options.dry_run {
            return Ok(run.finish(SyncState::Done, SyncOutcome::DryRun));
        }

        run.enter(SyncState::AwaitingConfirmation);
        if !confirm(&plan) {
            tracing::info!("Sync declined");
            return Ok(run.finish(SyncState::Failed, SyncOutcome::Cancelled));
        }

        run.enter(SyncState::Applying);
        let root = match toplevel(self.runner) {
            Ok(root) => NormalizedPath::new(root),
            Err(e) => {
                run.enter(SyncState::Failed);
                return Err(e.into());
            }
        };
        let mut transient = match TransientBranch::create(self.runner, &plan.upstream_ref) {
            Ok(branch) => branch,
            Err(e) => {
                run.enter(SyncState::Failed);
                return Err(e.into());
            }
        };

        let result = self.apply_entries(&root, &transient, &plan, &mut run.applied);

        run.enter(SyncState::Cleanup);
        run.cleanup = Some(transient.cleanup());

        match result {
            Ok(()) => {
                tracing::info!(count = run.applied.len(), "Applied upstream changes");
                Ok(run.finish(SyncState::Done, SyncOutcome::Applied))
            }
            Err(e) => {
                run.enter(SyncState::Failed);
                Err(e)
            }
        }
    }

    fn apply_entries(
        &self,
        root: &NormalizedPath,
        transient: &TransientBranch<'_>,
        plan: &SyncPlan,
        applied: &mut Vec<AppliedChange>,
    ) -> Result<()> {
        for entry in &plan.kept {
            let action = apply_entry(root, transient, entry).map_err(|source| {
                Error::ApplyFailed {
                    path: entry.path.clone(),
                    source: Box::new(source),
                }
            })?;
            tracing::debug!(path = %entry.path, ?action, "Applied change");
            applied.push(AppliedChange {
                entry: entry.clone(),
                action,
            });
        }
        Ok(())
    }
}

fn apply_entry(
    root: &NormalizedPath,
    transient: &TransientBranch<'_>,
    entry: &ChangeEntry,
) -> Result<LocalAction> {
    match entry.kind {
        ChangeKind::Deleted | ChangeKind::Modified => {
            let content = transient.read(&entry.path)?;
            write_atomic(&root.join(&entry.path), &content)?;
        }
        ChangeKind::Added => {
            remove_file_if_exists(&root.join(&entry.path))?;
        }
        ChangeKind::Renamed => {
            if let Some(previous) = &entry.previous_path {
                remove_file_if_exists(&root.join(previous))?;
            }
            let content = transient.read(&entry.path)?;
            write_atomic(&root.join(&entry.path), &content)?;
        }
    }
    Ok(LocalAction::for_kind(entry.kind))
}

/// Mutable bookkeeping for one apply run.
struct Run {
    trace: Vec<SyncState>,
    applied: Vec<AppliedChange>,
    cleanup: Option<forksync_git::CleanupState>,
}

impl Run {
    fn new() -> Self {
        Self {
            trace: vec![SyncState::Idle],
            applied: Vec::new(),
            cleanup: None,
        }
    }

    fn enter(&mut self, state: SyncState) {
        tracing::debug!(%state, "Sync state");
        self.trace.push(state);
    }

    fn finish(mut self, state: SyncState, outcome: SyncOutcome) -> SyncReport {
        self.enter(state);
        SyncReport {
            outcome,
            applied: self.applied,
            state_trace: self.trace,
            cleanup: self.cleanup,
        }
    }
}
