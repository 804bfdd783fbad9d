//! Hooks command implementation

use std::path::Path;

use colored::Colorize;
use forksync_core::install_pre_commit_hook;

use super::init::print_hook_status;
use crate::context::RepoContext;
use crate::error::Result;

/// Install the pre-commit hook in the repository containing `path`.
pub fn run_hooks_install(path: &Path, force: bool) -> Result<()> {
    let ctx = RepoContext::discover(path)?;
    let status = install_pre_commit_hook(&ctx.runner, force)?;
    print_hook_status(&status);
    println!(
        "{} Commits touching upstream-owned paths will now be rejected",
        "OK".green().bold()
    );
    Ok(())
}
