//! Thin wrappers over individual git subcommands
//!
//! Each function maps one git invocation to a typed result. Queries that may
//! legitimately fail (does this ref exist? is there a remote?) go through
//! the lenient runner path and return `bool`/`Option`; everything else is
//! strict.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::{Error, GitRunner, Result};

/// Name of the branch checked out in the runner's directory.
///
/// # Errors
///
/// Returns [`Error::DetachedHead`] when `HEAD` does not point at a branch.
pub fn current_branch(runner: &GitRunner) -> Result<String> {
    let name = runner.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
    if name == "HEAD" {
        return Err(Error::DetachedHead {
            path: runner.dir().to_path_buf(),
        });
    }
    Ok(name)
}

pub fn switch_branch(runner: &GitRunner, branch: &str) -> Result<()> {
    runner.run(&["switch", "--quiet", branch])?;
    Ok(())
}

/// Whether `rev` resolves to a commit.
pub fn ref_exists(runner: &GitRunner, rev: &str) -> bool {
    let peeled = format!("{rev}^{{commit}}");
    runner
        .try_run(&["rev-parse", "--verify", "--quiet", &peeled])
        .is_some()
}

/// Resolve `rev` to a full commit hash.
pub fn resolve_commit(runner: &GitRunner, rev: &str) -> Result<String> {
    let peeled = format!("{rev}^{{commit}}");
    runner
        .try_run(&["rev-parse", "--verify", "--quiet", &peeled])
        .ok_or_else(|| Error::RefNotFound {
            name: rev.to_string(),
        })
}

pub fn fetch(runner: &GitRunner, remote: &str) -> Result<()> {
    tracing::info!(remote, "Fetching");
    runner.run(&["fetch", "--quiet", remote])?;
    Ok(())
}

/// URL configured for `remote`, or `None` when the remote does not exist.
pub fn remote_url(runner: &GitRunner, remote: &str) -> Option<String> {
    runner
        .try_run(&["remote", "get-url", remote])
        .filter(|url| !url.is_empty())
}

pub fn add_remote(runner: &GitRunner, name: &str, url: &str) -> Result<()> {
    runner.run(&["remote", "add", name, url])?;
    Ok(())
}

/// All file paths in the tree of `rev`.
pub fn list_tree(runner: &GitRunner, rev: &str) -> Result<BTreeSet<String>> {
    let output = runner.run(&[
        "-c",
        "core.quotePath=false",
        "ls-tree",
        "-r",
        "--name-only",
        rev,
    ])?;
    Ok(output
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Raw content of `path` as recorded in `rev`.
pub fn read_blob(runner: &GitRunner, rev: &str, path: &str) -> Result<Vec<u8>> {
    let object = format!("{rev}:{path}");
    runner.run_raw(&["cat-file", "blob", &object])
}

pub fn stage(runner: &GitRunner, path: &str) -> Result<()> {
    runner.run(&["add", "--", path])?;
    Ok(())
}

/// Stage the removal of `path`. A path unknown to the index is not an error.
pub fn stage_removal(runner: &GitRunner, path: &str) -> Result<()> {
    runner.run(&["rm", "--cached", "--quiet", "--ignore-unmatch", "--", path])?;
    Ok(())
}

/// Record a commit with `message` exactly as given.
///
/// Hooks are skipped and empty commits are allowed; `envs` are set on the
/// git process only.
pub fn commit(runner: &GitRunner, message: &str, envs: &[(&str, &str)]) -> Result<()> {
    runner.run_with_env(
        &[
            "commit",
            "--no-verify",
            "--allow-empty",
            "--cleanup=verbatim",
            "--quiet",
            "-m",
            message,
        ],
        envs,
    )?;
    Ok(())
}

pub fn is_repository(runner: &GitRunner) -> bool {
    runner
        .try_run(&["rev-parse", "--is-inside-work-tree"])
        .is_some_and(|out| out == "true")
}

/// Root of the working tree containing the runner's directory.
pub fn toplevel(runner: &GitRunner) -> Result<PathBuf> {
    runner
        .try_run(&["rev-parse", "--show-toplevel"])
        .map(PathBuf::from)
        .ok_or_else(|| Error::NotARepository {
            path: runner.dir().to_path_buf(),
        })
}

/// Directory git reads hooks from, made absolute.
pub fn hooks_dir(runner: &GitRunner) -> Result<PathBuf> {
    let raw = runner.run(&["rev-parse", "--git-path", "hooks"])?;
    let path = Path::new(&raw);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(runner.dir().join(path))
    }
}

/// Path of the worktree that has `branch` checked out, if any.
pub fn worktree_for_branch(runner: &GitRunner, branch: &str) -> Result<Option<PathBuf>> {
    let output = runner.run(&["worktree", "list", "--porcelain"])?;
    Ok(parse_worktree_list(&output, branch))
}

fn parse_worktree_list(output: &str, branch: &str) -> Option<PathBuf> {
    let wanted = format!("refs/heads/{branch}");
    let mut current: Option<&str> = None;

    for line in output.lines() {
        if let Some(path) = line.strip_prefix("worktree ") {
            current = Some(path);
        } else if let Some(head) = line.strip_prefix("branch ") {
            if head == wanted {
                return current.map(PathBuf::from);
            }
        } else if line.is_empty() {
            current = None;
        }
    }
    None
}

pub fn remove_worktree(runner: &GitRunner, path: &Path) -> Result<()> {
    let path = path.to_string_lossy();
    runner.run(&["worktree", "remove", "--force", &path])?;
    Ok(())
}

/// Create `name` pointing at `start`, without checking it out.
pub fn create_branch(runner: &GitRunner, name: &str, start: &str) -> Result<()> {
    runner.run(&["branch", "--no-track", name, start])?;
    Ok(())
}

pub fn delete_branch(runner: &GitRunner, name: &str) -> Result<()> {
    runner.run(&["branch", "-D", name])?;
    Ok(())
}
