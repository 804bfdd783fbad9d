//! Cherry-pick command implementation
//!
//! Replays commits from another repository whose message matches a pattern.

use std::path::Path;

use colored::Colorize;
use forksync_core::CommitReplay;
use forksync_git::helpers::{is_repository, toplevel};
use forksync_git::{GitRunner, MessagePattern};

use crate::context::RepoContext;
use crate::error::{CliError, Result};

/// Run the cherry-pick command
pub fn run_cherry_pick(path: &Path, source: &Path, pattern: &str, regex: bool) -> Result<()> {
    let ctx = RepoContext::discover(path)?;

    let lookup = GitRunner::new(source);
    if !is_repository(&lookup) {
        return Err(CliError::user(format!(
            "source {} is not a git repository",
            source.display()
        )));
    }
    let source_runner =
        GitRunner::new(toplevel(&lookup)?).with_timeout(ctx.config.git_timeout());

    let pattern = if regex {
        MessagePattern::regex(pattern)?
    } else {
        MessagePattern::substring(pattern)
    };

    println!(
        "{} Replaying commits matching {} from {}",
        "=>".blue().bold(),
        pattern.as_str().cyan(),
        source.display()
    );

    let report = CommitReplay::new(&source_runner, &ctx.runner).run(&pattern)?;

    for hash in &report.skipped_existing {
        println!("  {} {} already present", "skip".dimmed(), short(hash));
    }
    for hash in &report.skipped_empty {
        println!("  {} {} changes no files", "skip".yellow(), short(hash));
    }
    for hash in &report.replayed {
        println!("  {} {}", "pick".green(), short(hash));
    }

    println!(
        "{} Replayed {} commit(s), {} already present",
        "OK".green().bold(),
        report.replayed_count(),
        report.skipped_existing.len()
    );
    Ok(())
}

fn short(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
