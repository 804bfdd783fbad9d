//! Git pre-commit hook installation
//!
//! The hook runs `forksync check` so protected paths are rejected before a
//! commit is recorded. forksync's own commits set the escape hatch and pass.

use std::fs;
use std::path::PathBuf;

use forksync_fs::NormalizedPath;
use forksync_fs::io::write_atomic;
use forksync_git::GitRunner;
use forksync_git::helpers::hooks_dir;

use crate::{Error, Result};

/// Marker line identifying a hook written by forksync.
pub const HOOK_MARKER: &str = "# forksync-managed";

const PRE_COMMIT_SCRIPT: &str = "#!/bin/sh
# forksync-managed
# Rejects commits that change upstream-owned paths.
exec forksync check
";

/// What [`install_pre_commit_hook`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookStatus {
    /// No hook existed
    Installed(PathBuf),
    /// A previous forksync hook was rewritten
    Updated(PathBuf),
    /// A foreign hook was overwritten because `force` was set
    Replaced(PathBuf),
}

impl HookStatus {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Installed(p) | Self::Updated(p) | Self::Replaced(p) => p,
        }
    }
}

/// Write the pre-commit hook into the repository's hooks directory.
///
/// # Errors
///
/// Returns [`Error::HookExists`] when a hook not written by forksync is
/// present and `force` is false.
pub fn install_pre_commit_hook(runner: &GitRunner, force: bool) -> Result<HookStatus> {
    let path = hooks_dir(runner)?.join("pre-commit");

    let status = match fs::read_to_string(&path) {
        Ok(existing) if existing.contains(HOOK_MARKER) => HookStatus::Updated(path.clone()),
        Ok(_) if !force => return Err(Error::HookExists { path }),
        Ok(_) => HookStatus::Replaced(path.clone()),
        Err(_) if path.exists() && !force => return Err(Error::HookExists { path }),
        Err(_) => HookStatus::Installed(path.clone()),
    };

    write_atomic(&NormalizedPath::new(&path), PRE_COMMIT_SCRIPT.as_bytes())?;
    make_executable(&path)?;

    tracing::info!(path = %path.display(), ?status, "Installed pre-commit hook");
    Ok(status)
}

#[cfg(unix)]
fn make_executable(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &std::path::Path) -> Result<()> {
    Ok(())
}
