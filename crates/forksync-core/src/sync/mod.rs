//! Sync applier
//!
//! Brings upstream changes into the fork's working tree, leaving paths the
//! fork owns alone:
//!
//! - **plan**: diff the upstream reference against `HEAD` and drop entries
//!   the policy classifies as [`ExplicitSkip`](crate::Classification::ExplicitSkip)
//! - **apply**: after confirmation, materialize each kept entry from a
//!   transient branch, then always clean the branch up
//!
//! Nothing is staged or committed; the operator reviews the working tree
//! and commits the result.

mod applier;
mod report;

pub use applier::SyncApplier;
pub use report::{
    AppliedChange, LocalAction, SyncOptions, SyncOutcome, SyncPlan, SyncReport, SyncState,
};
