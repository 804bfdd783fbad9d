//! Filesystem primitives for forksync
//!
//! Provides repository-relative path normalization and safe I/O operations
//! used when materializing upstream content into a working tree.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use constants::{EXCLUDED_DIRS, RepoPath, is_excluded_dir};
pub use error::{Error, Result};
pub use path::{NormalizedPath, normalize_repo_path};
