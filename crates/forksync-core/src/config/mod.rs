//! Configuration resolution
//!
//! forksync reads its settings from `.forksync/config.toml`, overlaid by a
//! git-ignored `.forksync/config.local.toml`:
//!
//! ```toml
//! [upstream]
//! remote = "upstream"
//! url = "https://github.com/org/project.git"
//! branch = "main"
//!
//! [policy]
//! file = ".forksync/allowlist"
//! allow_empty = false
//!
//! [git]
//! timeout_secs = 30
//! ```
//!
//! # Example
//!
//! ```ignore
//! use forksync_core::config::ConfigResolver;
//!
//! let config = ConfigResolver::new("/path/to/fork").resolve()?;
//! println!("Syncing from {}", config.upstream_ref());
//! ```

mod manifest;
mod resolver;

pub use manifest::{GitSection, Manifest, PolicySection, UpstreamSection};
pub use resolver::{
    ConfigResolver, DEFAULT_BRANCH, DEFAULT_REMOTE, DEFAULT_TIMEOUT_SECS, ResolvedConfig,
};
