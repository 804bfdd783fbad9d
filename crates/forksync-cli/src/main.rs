//! forksync CLI
//!
//! Keeps a fork in step with its upstream repository: pulls upstream changes
//! the fork does not own, and rejects commits to paths upstream owns.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use std::path::Path;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands, HooksAction};
use commands::init::InitOptions;
use commands::pull::PullOptions;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        match &e {
            CliError::Cancelled => eprintln!("{}: {}", "aborted".yellow().bold(), e),
            // The report was already printed
            CliError::Violations { .. } => {}
            _ => eprintln!("{}: {}", "error".red().bold(), e),
        }
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(cmd) => execute_command(&dir, cmd),
        None => {
            println!("{} keep a fork in step with its upstream", "forksync".green().bold());
            println!();
            println!("Run {} for available commands.", "forksync --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        return;
    };

    if let Err(e) = result {
        eprintln!("{}: could not install logger: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(dir: &Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            url,
            remote,
            branch,
            install_hook,
            no_fetch,
        } => commands::run_init(
            dir,
            &InitOptions {
                url,
                remote,
                branch,
                install_hook,
                fetch: !no_fetch,
            },
        ),
        Commands::Pull {
            yes,
            dry_run,
            no_fetch,
        } => commands::run_pull(
            dir,
            &PullOptions {
                yes,
                dry_run,
                fetch: !no_fetch,
            },
        ),
        Commands::Check { json } => commands::run_check(dir, json),
        Commands::CherryPick {
            source,
            pattern,
            regex,
        } => commands::run_cherry_pick(dir, &source, &pattern, regex),
        Commands::Hooks { action } => match action {
            HooksAction::Install { force } => commands::run_hooks_install(dir, force),
        },
    }
}
