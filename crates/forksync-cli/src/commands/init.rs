//! Init command implementation
//!
//! Sets up upstream tracking: the remote, `.forksync/config.toml`, a
//! starter allow-list and the `.gitignore` entry for local overrides.

use std::path::Path;

use colored::Colorize;
use forksync_core::config::{Manifest, PolicySection, UpstreamSection};
use forksync_core::{ConfigResolver, HookStatus, install_pre_commit_hook};
use forksync_fs::io::{read_text, write_text};
use forksync_fs::{NormalizedPath, RepoPath};
use forksync_git::GitRunner;
use forksync_git::helpers::{add_remote, fetch, is_repository, remote_url, toplevel};

use crate::error::{CliError, Result};

const STARTER_POLICY: &str = "\
# forksync allow-list
#
# Paths matched here belong to this fork: `forksync pull` leaves them alone
# and `forksync check` lets you change them even when upstream has them.
#
#   docs/                 a directory and everything under it
#   app/components/*      files directly inside a directory
#   config/*.yml          a glob
#   !docs/upstream/**     a negation, handed back to upstream
#
.forksync/
";

/// Options for [`run_init`]
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub url: Option<String>,
    pub remote: String,
    pub branch: String,
    pub install_hook: bool,
    pub fetch: bool,
}

/// Run the init command
pub fn run_init(path: &Path, options: &InitOptions) -> Result<()> {
    let lookup = GitRunner::new(path);
    if !is_repository(&lookup) {
        return Err(CliError::user(format!(
            "{} is not a git repository; run `git init` first",
            path.display()
        )));
    }
    let root = toplevel(&lookup)?;
    let runner = GitRunner::new(&root);

    println!(
        "{} Tracking {} from remote {}",
        "=>".blue().bold(),
        options.branch.cyan(),
        options.remote.cyan()
    );

    ensure_remote(&runner, &options.remote, options.url.as_deref())?;

    if options.fetch {
        fetch(&runner, &options.remote)?;
        println!("   Fetched {}", options.remote);
    }

    let resolver = ConfigResolver::new(root.as_path());
    if resolver.has_config() {
        println!(
            "   {} exists, leaving it unchanged",
            RepoPath::ConfigFile.as_str().yellow()
        );
    } else {
        write_config(resolver.root(), options)?;
        println!("   Wrote {}", RepoPath::ConfigFile.as_str().cyan());
    }

    let config = resolver.resolve()?;
    let policy_path = NormalizedPath::new(config.policy_path(&root));
    if policy_path.exists() {
        println!("   {} exists, leaving it unchanged", config.policy_file.yellow());
    } else {
        write_text(&policy_path, STARTER_POLICY)?;
        println!("   Wrote starter allow-list {}", config.policy_file.cyan());
    }

    if ignore_local_config(resolver.root())? {
        println!("   Added {} to .gitignore", RepoPath::LocalConfigFile.as_str().cyan());
    }

    if options.install_hook {
        let status = install_pre_commit_hook(&runner, false)?;
        print_hook_status(&status);
    }

    println!("{} forksync initialized", "OK".green().bold());
    Ok(())
}

/// Add the remote, or check that an existing one points at `url`.
fn ensure_remote(runner: &GitRunner, remote: &str, url: Option<&str>) -> Result<()> {
    match (remote_url(runner, remote), url) {
        (Some(existing), Some(url)) if existing != url => Err(CliError::user(format!(
            "remote '{remote}' already points at {existing}, not {url}"
        ))),
        (Some(existing), _) => {
            println!("   Remote {} -> {}", remote, existing.dimmed());
            Ok(())
        }
        (None, Some(url)) => {
            add_remote(runner, remote, url)?;
            println!("   Added remote {} -> {}", remote, url.dimmed());
            Ok(())
        }
        (None, None) => Err(CliError::user(format!(
            "remote '{remote}' does not exist; pass --url to add it"
        ))),
    }
}

fn write_config(root: &NormalizedPath, options: &InitOptions) -> Result<()> {
    let manifest = Manifest {
        upstream: UpstreamSection {
            remote: Some(options.remote.clone()),
            url: options.url.clone(),
            branch: Some(options.branch.clone()),
        },
        policy: PolicySection {
            file: Some(RepoPath::PolicyFile.as_str().to_string()),
            allow_empty: None,
        },
        ..Manifest::empty()
    };
    write_text(&root.join(RepoPath::ConfigFile.as_str()), &manifest.to_toml()?)?;
    Ok(())
}

/// Append the local config overlay to `.gitignore`. Returns `true` when
/// the file changed.
fn ignore_local_config(root: &NormalizedPath) -> Result<bool> {
    let gitignore = root.join(".gitignore");
    let entry = RepoPath::LocalConfigFile.as_str();

    let mut content = if gitignore.exists() {
        read_text(&gitignore)?
    } else {
        String::new()
    };
    if content.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(entry);
    content.push('\n');
    write_text(&gitignore, &content)?;
    Ok(true)
}

pub(crate) fn print_hook_status(status: &HookStatus) {
    let verb = match status {
        HookStatus::Installed(_) => "Installed",
        HookStatus::Updated(_) => "Updated",
        HookStatus::Replaced(_) => "Replaced",
    };
    println!(
        "   {} pre-commit hook at {}",
        verb,
        status.path().display().to_string().cyan()
    );
}
