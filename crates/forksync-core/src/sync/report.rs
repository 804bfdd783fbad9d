//! Plan and report types for the sync applier

use std::fmt;

use forksync_git::{ChangeEntry, ChangeKind, CleanupState};
use serde::Serialize;

/// Phases of one apply run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    Idle,
    AwaitingConfirmation,
    Applying,
    Cleanup,
    Done,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AwaitingConfirmation => write!(f, "awaiting-confirmation"),
            Self::Applying => write!(f, "applying"),
            Self::Cleanup => write!(f, "cleanup"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// How an apply run ended, when it did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncOutcome {
    /// Every kept entry was written to the working tree
    Applied,
    /// The plan had no entries to apply
    NothingToApply,
    /// The confirmation was declined
    Cancelled,
    /// Dry run; the plan was reported only
    DryRun,
}

/// What happened to a local file for one change entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocalAction {
    /// Missing locally, restored from upstream
    Revived,
    /// Replaced with the upstream content
    Overwritten,
    /// Not present upstream, removed locally
    Removed,
    /// Old local path removed, upstream path written
    Moved,
}

impl LocalAction {
    /// The local action for an entry of `kind` in an upstream-to-local diff.
    pub fn for_kind(kind: ChangeKind) -> Self {
        match kind {
            ChangeKind::Deleted => Self::Revived,
            ChangeKind::Modified => Self::Overwritten,
            ChangeKind::Added => Self::Removed,
            ChangeKind::Renamed => Self::Moved,
        }
    }
}

impl fmt::Display for LocalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revived => write!(f, "revive"),
            Self::Overwritten => write!(f, "overwrite"),
            Self::Removed => write!(f, "remove"),
            Self::Moved => write!(f, "move"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedChange {
    pub entry: ChangeEntry,
    pub action: LocalAction,
}

/// Result of the planning step: what apply would touch.
///
/// Entries come from `git diff <upstream_ref> HEAD`, so `Added` means the
/// file exists only locally and `Deleted` means it exists only upstream.
/// For renames, `path` is the upstream location and `previous_path` the
/// local one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub upstream_ref: String,
    pub local_branch: String,
    /// Entries to apply, in diff order
    pub kept: Vec<ChangeEntry>,
    /// Entries left alone because the fork owns them
    pub skipped: Vec<ChangeEntry>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }

    /// Kept entries with the local action each one will cause.
    pub fn actions(&self) -> impl Iterator<Item = (&ChangeEntry, LocalAction)> {
        self.kept
            .iter()
            .map(|entry| (entry, LocalAction::for_kind(entry.kind)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Report the plan without touching the working tree.
    pub dry_run: bool,
}

/// Record of a finished apply run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    pub applied: Vec<AppliedChange>,
    /// Every state the run passed through, starting with `Idle`
    pub state_trace: Vec<SyncState>,
    /// Final transient branch state, if one was created
    #[serde(skip)]
    pub cleanup: Option<CleanupState>,
}

impl SyncReport {
    pub fn final_state(&self) -> SyncState {
        self.state_trace.last().copied().unwrap_or(SyncState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_mapping_is_reciprocal() {
        assert_eq!(LocalAction::for_kind(ChangeKind::Added), LocalAction::Removed);
        assert_eq!(LocalAction::for_kind(ChangeKind::Deleted), LocalAction::Revived);
        assert_eq!(LocalAction::for_kind(ChangeKind::Modified), LocalAction::Overwritten);
        assert_eq!(LocalAction::for_kind(ChangeKind::Renamed), LocalAction::Moved);
    }

    #[test]
    fn test_final_state_of_empty_trace() {
        let report = SyncReport {
            outcome: SyncOutcome::NothingToApply,
            applied: Vec::new(),
            state_trace: Vec::new(),
            cleanup: None,
        };
        assert_eq!(report.final_state(), SyncState::Idle);
    }
}
