//! Disposable branches for reading upstream content
//!
//! A [`TransientBranch`] pins an upstream reference under a unique local
//! name so blob content can be read from it while the working tree stays on
//! the caller's branch. Removal is modelled as a small state machine:
//!
//! ```text
//! Created --delete ok--> Done
//! Created --delete failed--> DeletionAttempted
//! DeletionAttempted --worktree removed--> WorktreeRemoved --retry--> DeletionRetried
//! DeletionAttempted --no worktree to remove--> Abandoned
//! DeletionRetried --delete ok--> Done
//! DeletionRetried --delete failed--> Abandoned
//! ```
//!
//! Cleanup never returns an error. An abandoned branch is logged loudly and
//! left for the operator to delete.

use std::fmt;

use crate::helpers;
use crate::naming::transient_branch_name;
use crate::{GitRunner, Result};

/// Where a transient branch is in its removal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupState {
    Created,
    DeletionAttempted,
    WorktreeRemoved,
    DeletionRetried,
    Done,
    Abandoned,
}

/// Observations that drive [`CleanupState`] forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupEvent {
    DeleteSucceeded,
    DeleteFailed,
    WorktreeRemoved,
    WorktreeUnavailable,
    RetryStarted,
}

impl CleanupState {
    /// Apply `event` to this state.
    ///
    /// Events that make no sense in the current state leave it unchanged;
    /// terminal states absorb everything.
    pub fn advance(self, event: CleanupEvent) -> Self {
        use CleanupEvent as E;
        match (self, event) {
            (Self::Created, E::DeleteSucceeded) => Self::Done,
            (Self::Created, E::DeleteFailed) => Self::DeletionAttempted,
            (Self::DeletionAttempted, E::WorktreeRemoved) => Self::WorktreeRemoved,
            (Self::DeletionAttempted, E::WorktreeUnavailable) => Self::Abandoned,
            (Self::WorktreeRemoved, E::RetryStarted) => Self::DeletionRetried,
            (Self::DeletionRetried, E::DeleteSucceeded) => Self::Done,
            (Self::DeletionRetried, E::DeleteFailed) => Self::Abandoned,
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Abandoned)
    }
}

impl fmt::Display for CleanupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::DeletionAttempted => "deletion attempted",
            Self::WorktreeRemoved => "worktree removed",
            Self::DeletionRetried => "deletion retried",
            Self::Done => "done",
            Self::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// A uniquely named local branch pointing at an upstream reference.
///
/// Dropping a branch that has not been cleaned up runs [`cleanup`](Self::cleanup).
#[derive(Debug)]
pub struct TransientBranch<'a> {
    runner: &'a GitRunner,
    name: String,
    original_branch: Option<String>,
    state: CleanupState,
}

impl<'a> TransientBranch<'a> {
    /// Create a branch at `source_ref` without checking it out.
    ///
    /// The branch checked out at creation time is remembered so cleanup can
    /// make sure the working tree ends up back on it.
    pub fn create(runner: &'a GitRunner, source_ref: &str) -> Result<Self> {
        let original_branch = helpers::current_branch(runner).ok();
        let name = transient_branch_name(source_ref);
        helpers::create_branch(runner, &name, source_ref)?;
        tracing::debug!(branch = %name, source = source_ref, "Created transient branch");

        Ok(Self {
            runner,
            name,
            original_branch,
            state: CleanupState::Created,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> CleanupState {
        self.state
    }

    /// Content of `path` as recorded on this branch.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        helpers::read_blob(self.runner, &self.name, path)
    }

    /// Remove the branch, returning the terminal state reached.
    ///
    /// Calling this again after a terminal state is a no-op.
    pub fn cleanup(&mut self) -> CleanupState {
        if self.state.is_terminal() {
            return self.state;
        }

        self.restore_original_branch();

        while !self.state.is_terminal() {
            let event = match self.state {
                CleanupState::Created | CleanupState::DeletionRetried => self.try_delete(),
                CleanupState::DeletionAttempted => self.try_remove_worktree(),
                CleanupState::WorktreeRemoved => CleanupEvent::RetryStarted,
                CleanupState::Done | CleanupState::Abandoned => break,
            };
            self.state = self.state.advance(event);
        }

        match self.state {
            CleanupState::Done => {
                tracing::debug!(branch = %self.name, "Deleted transient branch");
            }
            _ => {
                tracing::warn!(
                    branch = %self.name,
                    "Could not delete transient branch; remove it with `git branch -D {}`",
                    self.name
                );
            }
        }
        self.state
    }

    fn restore_original_branch(&self) {
        let Some(original) = &self.original_branch else {
            return;
        };
        let current = helpers::current_branch(self.runner).ok();
        if current.as_deref() != Some(original.as_str()) {
            if let Err(e) = helpers::switch_branch(self.runner, original) {
                tracing::warn!(branch = %original, error = %e, "Failed to return to original branch");
            }
        }
    }

    fn try_delete(&self) -> CleanupEvent {
        match helpers::delete_branch(self.runner, &self.name) {
            Ok(()) => CleanupEvent::DeleteSucceeded,
            Err(e) => {
                tracing::debug!(branch = %self.name, error = %e, "Transient branch deletion failed");
                CleanupEvent::DeleteFailed
            }
        }
    }

    fn try_remove_worktree(&self) -> CleanupEvent {
        let worktree = match helpers::worktree_for_branch(self.runner, &self.name) {
            Ok(Some(path)) => path,
            Ok(None) => return CleanupEvent::WorktreeUnavailable,
            Err(e) => {
                tracing::debug!(error = %e, "Could not list worktrees");
                return CleanupEvent::WorktreeUnavailable;
            }
        };

        match helpers::remove_worktree(self.runner, &worktree) {
            Ok(()) => {
                tracing::info!(path = %worktree.display(), "Removed worktree holding transient branch");
                CleanupEvent::WorktreeRemoved
            }
            Err(e) => {
                tracing::warn!(path = %worktree.display(), error = %e, "Failed to remove worktree");
                CleanupEvent::WorktreeUnavailable
            }
        }
    }
}

impl Drop for TransientBranch<'_> {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            self.cleanup();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CleanupEvent as E;
    use CleanupState as S;

    #[test]
    fn test_first_delete_succeeds() {
        assert_eq!(S::Created.advance(E::DeleteSucceeded), S::Done);
    }

    #[test]
    fn test_retry_after_worktree_removal() {
        let state = S::Created
            .advance(E::DeleteFailed)
            .advance(E::WorktreeRemoved)
            .advance(E::RetryStarted);
        assert_eq!(state, S::DeletionRetried);
        assert_eq!(state.advance(E::DeleteSucceeded), S::Done);
    }

    #[test]
    fn test_retry_fails_only_once() {
        let state = S::Created
            .advance(E::DeleteFailed)
            .advance(E::WorktreeRemoved)
            .advance(E::RetryStarted)
            .advance(E::DeleteFailed);
        assert_eq!(state, S::Abandoned);
    }

    #[test]
    fn test_no_worktree_abandons() {
        let state = S::Created
            .advance(E::DeleteFailed)
            .advance(E::WorktreeUnavailable);
        assert_eq!(state, S::Abandoned);
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        for event in [E::DeleteSucceeded, E::DeleteFailed, E::RetryStarted] {
            assert_eq!(S::Done.advance(event), S::Done);
            assert_eq!(S::Abandoned.advance(event), S::Abandoned);
        }
    }

    #[test]
    fn test_unexpected_event_keeps_state() {
        assert_eq!(S::Created.advance(E::RetryStarted), S::Created);
    }
}
