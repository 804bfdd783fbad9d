//! Git abstraction for forksync
//!
//! Everything here talks to git through its command-line interface via
//! [`GitRunner`]. No richer library API is used, so the behavior seen by
//! forksync is exactly what an operator would see running the same
//! commands by hand.

pub mod commits;
pub mod diff;
pub mod error;
pub mod helpers;
pub mod naming;
pub mod runner;
pub mod transient;

pub use commits::{CommitInfo, MessagePattern};
pub use diff::{ChangeEntry, ChangeKind, TreeChange};
pub use error::{Error, Result};
pub use runner::{DEFAULT_TIMEOUT, GitRunner};
pub use transient::{CleanupEvent, CleanupState, TransientBranch};
