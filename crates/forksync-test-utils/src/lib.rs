//! Shared test utilities for the forksync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git fixtures driven through the `git` CLI, including a
//!   paired upstream/fork setup
//! - [`repo`]: [`TestRepo`](repo::TestRepo) for single-checkout scenarios

pub mod git;
pub mod repo;

pub use git::UpstreamFork;
pub use repo::TestRepo;
