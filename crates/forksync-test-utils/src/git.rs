//! Git fixtures built with the `git` CLI.
//!
//! Every repository created here has `main` as its default branch, a fixed
//! committer identity, and commit signing disabled, so tests behave the same
//! regardless of the host's global git configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Run `git` in `path` and return trimmed stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits non-zero.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed in {}:\n{}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(path: &Path) {
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

/// Initialise an empty repository on `main` with no commits.
pub fn init_repo(path: &Path) {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("init_repo: failed to create {}: {e}", path.display()));
    git(path, &["init", "--quiet"]);
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_identity(path);
}

/// Initialise a repository on `main` with a single `README.md` commit.
pub fn init_repo_with_commit(path: &Path) {
    init_repo(path);
    commit_file(path, "README.md", "# Test\n", "Initial commit");
}

/// Write `rel` (creating parent directories) without staging it.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let full = root.join(rel);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("write_file: failed to create {}: {e}", parent.display()));
    }
    fs::write(&full, content)
        .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", full.display()));
}

/// Write `rel` and commit it alone with `message`.
pub fn commit_file(root: &Path, rel: &str, content: &str, message: &str) {
    write_file(root, rel, content);
    git(root, &["add", "--", rel]);
    git(root, &["commit", "--quiet", "-m", message]);
}

/// Stage everything in the working tree and commit it.
pub fn commit_all(root: &Path, message: &str) {
    git(root, &["add", "-A"]);
    git(root, &["commit", "--quiet", "--allow-empty", "-m", message]);
}

/// Remove `rel` from the working tree and index, then commit.
pub fn remove_and_commit(root: &Path, rel: &str, message: &str) {
    git(root, &["rm", "--quiet", "--", rel]);
    git(root, &["commit", "--quiet", "-m", message]);
}

/// Number of commits reachable from `HEAD`.
pub fn commit_count(root: &Path) -> usize {
    git(root, &["rev-list", "--count", "HEAD"])
        .parse()
        .unwrap_or_else(|e| panic!("commit_count: unexpected rev-list output: {e}"))
}

/// Local branch names in `root`.
pub fn branches(root: &Path) -> Vec<String> {
    git(root, &["branch", "--format=%(refname:short)"])
        .lines()
        .map(str::to_string)
        .collect()
}

/// An upstream repository and a fork cloned from it.
///
/// The fork's remote for the upstream is named `upstream`, so
/// `upstream/main` is the reference forksync synchronizes from.
pub struct UpstreamFork {
    _temp: TempDir,
    pub upstream: PathBuf,
    pub fork: PathBuf,
}

impl UpstreamFork {
    /// Create an upstream with one commit and clone it as the fork.
    pub fn new() -> Self {
        Self::with_files(&[("README.md", "# Upstream\n")])
    }

    /// Create an upstream whose first commit contains `files`, then clone it.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let temp = TempDir::new().unwrap_or_else(|e| panic!("UpstreamFork: tempdir: {e}"));
        let upstream = temp.path().join("upstream");
        let fork = temp.path().join("fork");

        init_repo(&upstream);
        for (rel, content) in files {
            write_file(&upstream, rel, content);
        }
        commit_all(&upstream, "Initial upstream commit");

        let upstream_str = upstream.to_string_lossy().to_string();
        let fork_str = fork.to_string_lossy().to_string();
        git(
            temp.path(),
            &["clone", "--quiet", "-o", "upstream", &upstream_str, &fork_str],
        );
        configure_identity(&fork);

        Self {
            _temp: temp,
            upstream,
            fork,
        }
    }

    /// Commit `rel` in the upstream and fetch it into the fork.
    pub fn upstream_commit(&self, rel: &str, content: &str, message: &str) {
        commit_file(&self.upstream, rel, content, message);
        self.fetch();
    }

    /// Refresh `upstream/*` refs in the fork.
    pub fn fetch(&self) {
        git(&self.fork, &["fetch", "--quiet", "upstream"]);
    }
}

impl Default for UpstreamFork {
    fn default() -> Self {
        Self::new()
    }
}
