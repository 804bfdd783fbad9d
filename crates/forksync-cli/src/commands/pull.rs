//! Pull command implementation
//!
//! Fetches the upstream branch, shows the policy-filtered change list and
//! writes it into the working tree once confirmed.

use std::path::Path;

use colored::Colorize;
use forksync_core::{SYNC_OPERATION_ENV, SyncApplier, SyncOptions, SyncOutcome, SyncPlan};
use forksync_git::ChangeEntry;
use forksync_git::helpers::{fetch, ref_exists};

use crate::context::RepoContext;
use crate::error::{CliError, Result};
use crate::interactive;

/// Options for [`run_pull`]
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    pub yes: bool,
    pub dry_run: bool,
    pub fetch: bool,
}

/// Run the pull command
pub fn run_pull(path: &Path, options: &PullOptions) -> Result<()> {
    let ctx = RepoContext::discover(path)?;
    let upstream_ref = ctx.config.upstream_ref();

    if options.fetch {
        println!("{} Fetching {}...", "=>".blue().bold(), ctx.config.remote.cyan());
        fetch(&ctx.runner, &ctx.config.remote)?;
    }
    if !ref_exists(&ctx.runner, &upstream_ref) {
        return Err(CliError::user(format!(
            "upstream reference {upstream_ref} not found; check [upstream] in {} or fetch the remote",
            forksync_fs::RepoPath::ConfigFile
        )));
    }

    let policy = ctx.load_policy()?;
    let applier = SyncApplier::new(&ctx.runner, &policy, &upstream_ref)
        .with_options(SyncOptions {
            dry_run: options.dry_run,
        });
    let plan = applier.plan()?;
    print_plan(&plan);

    let mut prompt_error = None;
    let report = applier.apply(plan, |plan| {
        if options.yes {
            return true;
        }
        match interactive::confirm_apply(plan.kept.len()) {
            Ok(answer) => answer,
            Err(e) => {
                prompt_error = Some(e);
                false
            }
        }
    })?;
    if let Some(e) = prompt_error {
        return Err(e);
    }

    match report.outcome {
        SyncOutcome::Applied => {
            println!(
                "{} Applied {} change(s) from {}",
                "OK".green().bold(),
                report.applied.len(),
                upstream_ref
            );
            println!(
                "\n{} Review the working tree, then commit with {}",
                "hint:".cyan().bold(),
                format!("{SYNC_OPERATION_ENV}=1 git commit").cyan()
            );
            Ok(())
        }
        SyncOutcome::NothingToApply => {
            println!("{} Already up to date with {}", "OK".green().bold(), upstream_ref);
            Ok(())
        }
        SyncOutcome::DryRun => {
            println!("{} Dry run, nothing written", "note:".yellow().bold());
            Ok(())
        }
        SyncOutcome::Cancelled => Err(CliError::Cancelled),
    }
}

fn print_plan(plan: &SyncPlan) {
    if plan.is_empty() {
        return;
    }

    println!(
        "{} {} change(s) from {} into {}:\n",
        "=>".blue().bold(),
        plan.kept.len(),
        plan.upstream_ref.cyan(),
        plan.local_branch.cyan()
    );
    let mut actions: Vec<_> = plan.actions().collect();
    actions.sort_by_key(|(entry, _)| entry.kind.marker());
    for (entry, action) in actions {
        println!("  {:<10} {}", action.to_string().yellow(), describe(entry));
    }
    if !plan.skipped.is_empty() {
        println!(
            "\n  {} path(s) skipped by the allow-list",
            plan.skipped.len().to_string().dimmed()
        );
    }
    println!();
}

/// Renames name the path they land on and the local path they replace.
fn describe(entry: &ChangeEntry) -> String {
    match &entry.previous_path {
        Some(previous) => format!("{} (from {})", entry.path, previous),
        None => entry.path.clone(),
    }
}
