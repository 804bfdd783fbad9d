//! Core engine for forksync
//!
//! This crate keeps a fork of an upstream repository in step with it while
//! letting the fork own an explicit set of paths:
//!
//! - **Policy**: allow-list rules deciding which paths the fork may change
//!   and which upstream changes are taken
//! - **Sync**: pull filtered upstream changes into the working tree
//! - **Gate**: reject commits or CI builds that touch protected paths
//! - **Replay**: port matching commits from another repository
//!
//! # Architecture
//!
//! ```text
//!                 forksync-cli
//!                      |
//!                forksync-core
//!                      |
//!            +---------+---------+
//!            |                   |
//!       forksync-git        forksync-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use forksync_core::{Policy, SyncApplier};
//! use forksync_git::GitRunner;
//!
//! let runner = GitRunner::new("/path/to/fork");
//! let policy = Policy::load(".forksync/allowlist".as_ref(), false)?;
//! let applier = SyncApplier::new(&runner, &policy, "upstream/main");
//! let plan = applier.plan()?;
//! let report = applier.apply(plan, |plan| !plan.kept.is_empty())?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod hooks;
pub mod policy;
pub mod replay;
pub mod sync;

pub use config::{ConfigResolver, Manifest, ResolvedConfig};
pub use context::{CiVendor, ExecutionContext, SYNC_OPERATION_ENV};
pub use error::{Error, Result};
pub use gate::{CheckContext, GateReport, ProtectionGate, Violation};
pub use hooks::{HookStatus, install_pre_commit_hook};
pub use policy::{Classification, Policy, Rule};
pub use replay::{CommitReplay, ReplayReport};
pub use sync::{
    AppliedChange, LocalAction, SyncApplier, SyncOptions, SyncOutcome, SyncPlan, SyncReport,
    SyncState,
};
