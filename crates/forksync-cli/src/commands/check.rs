//! Check command implementation
//!
//! Runs the protection gate. Outside CI the staged changes are checked
//! against the upstream tree; in CI the upstream and fork checkouts are
//! compared.

use std::path::Path;

use colored::Colorize;
use forksync_core::{
    CheckContext, ConfigResolver, ExecutionContext, GateReport, Policy, ProtectionGate,
    SYNC_OPERATION_ENV,
};
use forksync_git::helpers::ref_exists;

use crate::context::RepoContext;
use crate::error::{CliError, Result};

/// Run the check command
pub fn run_check(path: &Path, json: bool) -> Result<()> {
    let exec = ExecutionContext::from_env();

    let report = if exec.sync_operation {
        GateReport::bypassed()
    } else {
        match exec.dual_checkout_paths()? {
            Some((upstream_root, fork_root)) => check_checkouts(&exec, upstream_root, fork_root)?,
            None => check_staged(path, &exec)?,
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.passed() {
        Ok(())
    } else {
        Err(CliError::Violations {
            count: report.violations.len(),
        })
    }
}

fn check_staged(path: &Path, exec: &ExecutionContext) -> Result<GateReport> {
    let ctx = RepoContext::discover(path)?;
    let upstream_ref = ctx.config.upstream_ref();
    if !ref_exists(&ctx.runner, &upstream_ref) {
        return Err(CliError::user(format!(
            "upstream reference {upstream_ref} not found; run `forksync pull` or `git fetch {}` first",
            ctx.config.remote
        )));
    }

    let policy = ctx.load_policy()?;
    let context = CheckContext::local(&ctx.runner, &upstream_ref)?;
    Ok(ProtectionGate::new(&policy).check(&context, exec)?)
}

fn check_checkouts(
    exec: &ExecutionContext,
    upstream_root: std::path::PathBuf,
    fork_root: std::path::PathBuf,
) -> Result<GateReport> {
    tracing::info!(
        vendor = ?exec.ci_vendor,
        upstream = %upstream_root.display(),
        fork = %fork_root.display(),
        "Comparing checkouts"
    );
    let config = ConfigResolver::new(fork_root.as_path()).resolve()?;
    let policy = Policy::load(&config.policy_path(&fork_root), config.allow_empty_policy)?;
    let context = CheckContext::dual_checkout(upstream_root, fork_root);
    Ok(ProtectionGate::new(&policy).check(&context, exec)?)
}

fn print_report(report: &GateReport) {
    if report.bypassed {
        println!(
            "{} {} is set, protection check skipped",
            "note:".yellow().bold(),
            SYNC_OPERATION_ENV
        );
        return;
    }
    if report.passed() {
        println!("{} No protected paths changed", "OK".green().bold());
        return;
    }

    println!(
        "{} {} protected path(s) changed:\n",
        "DENIED".red().bold(),
        report.violations.len()
    );
    for violation in &report.violations {
        let marker = violation.change_kind.marker().to_string();
        match &violation.upstream_path {
            Some(upstream) => println!(
                "  {} {}  {}",
                marker.red().bold(),
                violation.path,
                format!("(differs from {})", upstream.display()).dimmed()
            ),
            None => println!("  {} {}", marker.red().bold(), violation.path),
        }
    }
    println!(
        "\n{} Upstream owns these paths. Revert them, or add them to the allow-list.",
        "hint:".cyan().bold()
    );
}
