//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// forksync - Keep a fork in step with its upstream without losing local work
#[derive(Parser, Debug)]
#[command(name = "forksync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "dir", global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Set up upstream tracking in this repository
    ///
    /// Adds the upstream remote, writes .forksync/config.toml and a starter
    /// allow-list.
    ///
    /// Examples:
    ///   forksync init --url https://github.com/org/project.git
    ///   forksync init --branch develop --install-hook
    Init {
        /// Upstream repository URL (required unless the remote exists)
        #[arg(long)]
        url: Option<String>,

        /// Name of the upstream remote
        #[arg(long, default_value = "upstream")]
        remote: String,

        /// Upstream branch to follow
        #[arg(long, default_value = "main")]
        branch: String,

        /// Also install the pre-commit hook
        #[arg(long)]
        install_hook: bool,

        /// Do not fetch the remote
        #[arg(long)]
        no_fetch: bool,
    },

    /// Bring upstream changes into the working tree
    ///
    /// Paths on the allow-list are left untouched. The result is not
    /// committed.
    Pull {
        /// Apply without asking for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Use the already fetched upstream reference
        #[arg(long)]
        no_fetch: bool,
    },

    /// Reject changes to upstream-owned paths
    ///
    /// Checks staged changes locally, or compares the upstream and fork
    /// checkouts named by FORKSYNC_UPSTREAM_DIR and FORKSYNC_FORK_DIR in CI.
    Check {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Replay commits from another repository by message
    #[command(name = "cherry-pick")]
    CherryPick {
        /// Repository to read commits from
        source: PathBuf,

        /// Text the commit message must contain
        pattern: String,

        /// Treat the pattern as a regular expression
        #[arg(long)]
        regex: bool,
    },

    /// Manage the git pre-commit hook
    Hooks {
        #[command(subcommand)]
        action: HooksAction,
    },
}

/// Hook actions
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HooksAction {
    /// Write .git/hooks/pre-commit running `forksync check`
    Install {
        /// Overwrite a hook not written by forksync
        #[arg(long)]
        force: bool,
    },
}
