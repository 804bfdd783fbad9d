//! Integration tests for the forksync CLI binary.
//!
//! These tests exercise the compiled binary against real upstream/fork
//! repository pairs using assert_cmd.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use forksync_test_utils::UpstreamFork;
use forksync_test_utils::git::{commit_all, commit_count, commit_file, git, write_file};
use predicates::prelude::*;
use tempfile::tempdir;

/// Variables that would switch `check` into CI mode or bypass it.
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BITBUCKET_BUILD_NUMBER",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
    "FORKSYNC_SYNC_OPERATION",
    "FORKSYNC_UPSTREAM_DIR",
    "FORKSYNC_FORK_DIR",
];

/// Get a Command for the forksync binary running in `dir`, outside CI.
fn forksync(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("forksync"));
    cmd.current_dir(dir).env("NO_COLOR", "1");
    for var in CI_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// A fork with an allow-list owning `.forksync/` and `local/`.
fn tracked_pair() -> UpstreamFork {
    let pair = UpstreamFork::with_files(&[("README.md", "upstream v1\n"), ("src/lib.rs", "v1\n")]);
    write_file(&pair.fork, ".forksync/allowlist", ".forksync/\nlocal/\n");
    write_file(&pair.fork, "local/notes.md", "fork notes\n");
    commit_all(&pair.fork, "Fork setup");
    pair
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

// ============================================================================
// Help and Version
// ============================================================================

#[test]
fn test_help_output() {
    forksync(Path::new("."))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("cherry-pick"));
}

#[test]
fn test_version_output() {
    forksync(Path::new("."))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("forksync"));
}

#[test]
fn test_no_command_prints_hint() {
    forksync(Path::new("."))
        .assert()
        .success()
        .stdout(predicate::str::contains("forksync --help"));
}

// ============================================================================
// init
// ============================================================================

#[test]
fn test_init_in_fork() {
    let pair = UpstreamFork::new();

    forksync(&pair.fork)
        .args(["init", "--branch", "main"])
        .assert()
        .success()
        .stdout(predicate::str::contains("forksync initialized"));

    assert!(read(&pair.fork, ".forksync/config.toml").contains("remote = \"upstream\""));
    assert!(read(&pair.fork, ".forksync/allowlist").contains(".forksync/"));
    assert!(read(&pair.fork, ".gitignore").contains(".forksync/config.local.toml"));
}

#[test]
fn test_init_with_hook() {
    let pair = UpstreamFork::new();

    forksync(&pair.fork)
        .args(["init", "--no-fetch", "--install-hook"])
        .assert()
        .success();

    assert!(read(&pair.fork, ".git/hooks/pre-commit").contains("forksync check"));
}

#[test]
fn test_init_outside_repository() {
    let dir = tempdir().unwrap();

    forksync(dir.path())
        .arg("init")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a git repository"));
}

// ============================================================================
// pull
// ============================================================================

#[test]
fn test_pull_applies_upstream_changes() {
    let pair = tracked_pair();
    write_file(&pair.upstream, "README.md", "upstream v2\n");
    write_file(&pair.upstream, "src/new.rs", "new\n");
    write_file(&pair.upstream, "local/notes.md", "upstream notes\n");
    commit_all(&pair.upstream, "Upstream work");

    forksync(&pair.fork)
        .args(["pull", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 2 change(s)"))
        .stdout(predicate::str::contains("skipped by the allow-list"));

    assert_eq!(read(&pair.fork, "README.md"), "upstream v2\n");
    assert_eq!(read(&pair.fork, "src/new.rs"), "new\n");
    assert_eq!(read(&pair.fork, "local/notes.md"), "fork notes\n");
    assert!(!git(&pair.fork, &["branch", "--list", "forksync/*"]).contains("forksync/"));
}

#[test]
fn test_pull_up_to_date() {
    let pair = tracked_pair();

    forksync(&pair.fork)
        .args(["pull", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up to date"));
}

#[test]
fn test_pull_dry_run_writes_nothing() {
    let pair = tracked_pair();
    pair.upstream_commit("README.md", "upstream v2\n", "Update readme");

    forksync(&pair.fork)
        .args(["pull", "--dry-run", "--no-fetch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("overwrite"))
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(read(&pair.fork, "README.md"), "upstream v1\n");
}

#[test]
fn test_pull_without_terminal_requires_yes() {
    let pair = tracked_pair();
    pair.upstream_commit("README.md", "upstream v2\n", "Update readme");

    forksync(&pair.fork)
        .args(["pull", "--no-fetch"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--yes"));

    assert_eq!(read(&pair.fork, "README.md"), "upstream v1\n");
}

#[test]
fn test_pull_without_policy_fails() {
    let pair = UpstreamFork::new();

    forksync(&pair.fork)
        .args(["pull", "--yes"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(".forksync/allowlist"));
}

#[test]
fn test_pull_unknown_upstream_branch() {
    let pair = tracked_pair();
    write_file(&pair.fork, ".forksync/config.toml", "[upstream]\nbranch = \"nope\"\n");

    forksync(&pair.fork)
        .args(["pull", "--yes", "--no-fetch"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("upstream/nope"));
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_rejects_staged_upstream_path() {
    let pair = tracked_pair();
    write_file(&pair.fork, "README.md", "fork edit\n");
    git(&pair.fork, &["add", "README.md"]);

    forksync(&pair.fork)
        .arg("check")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("M README.md"));
}

#[test]
fn test_check_allows_owned_and_new_paths() {
    let pair = tracked_pair();
    write_file(&pair.fork, "local/notes.md", "edited\n");
    write_file(&pair.fork, "fork-only.txt", "mine\n");
    git(&pair.fork, &["add", "-A"]);

    forksync(&pair.fork)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No protected paths changed"));
}

#[test]
fn test_check_escape_hatch() {
    let pair = tracked_pair();
    write_file(&pair.fork, "README.md", "sync result\n");
    git(&pair.fork, &["add", "README.md"]);

    forksync(&pair.fork)
        .arg("check")
        .env("FORKSYNC_SYNC_OPERATION", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("protection check skipped"));
}

#[test]
fn test_check_json_output() {
    let pair = tracked_pair();
    git(&pair.fork, &["rm", "--quiet", "src/lib.rs"]);

    let output = forksync(&pair.fork)
        .args(["check", "--json"])
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["bypassed"], false);
    assert_eq!(report["violations"][0]["path"], "src/lib.rs");
    assert_eq!(report["violations"][0]["change_kind"], "deleted");
}

#[test]
fn test_check_dual_checkout_in_ci() {
    let pair = tracked_pair();
    write_file(&pair.fork, "src/lib.rs", "fork rewrite\n");
    write_file(&pair.fork, "local/notes.md", "edited\n");

    forksync(&pair.fork)
        .arg("check")
        .env("GITHUB_ACTIONS", "true")
        .env("FORKSYNC_UPSTREAM_DIR", &pair.upstream)
        .env("FORKSYNC_FORK_DIR", &pair.fork)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("M src/lib.rs"))
        .stdout(predicate::str::contains("local/notes.md").not());
}

#[test]
fn test_check_ci_without_paths() {
    let pair = tracked_pair();

    forksync(&pair.fork)
        .arg("check")
        .env("GITHUB_ACTIONS", "true")
        .env("FORKSYNC_UPSTREAM_DIR", &pair.upstream)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FORKSYNC_FORK_DIR"));
}

// ============================================================================
// cherry-pick
// ============================================================================

#[test]
fn test_cherry_pick_by_substring() {
    let pair = tracked_pair();
    commit_file(&pair.upstream, "a.txt", "a\n", "fix: first");
    commit_file(&pair.upstream, "b.txt", "b\n", "feat: unrelated");
    commit_file(&pair.upstream, "c.txt", "c\n", "fix: second");
    let before = commit_count(&pair.fork);

    forksync(&pair.fork)
        .arg("cherry-pick")
        .arg(&pair.upstream)
        .arg("fix:")
        .assert()
        .success()
        .stdout(predicate::str::contains("Replayed 2 commit(s)"));

    assert_eq!(commit_count(&pair.fork), before + 2);
    assert_eq!(read(&pair.fork, "c.txt"), "c\n");
    assert!(!pair.fork.join("b.txt").exists());

    // Running again finds both commits already present
    forksync(&pair.fork)
        .arg("cherry-pick")
        .arg(&pair.upstream)
        .arg("fix:")
        .assert()
        .success()
        .stdout(predicate::str::contains("Replayed 0 commit(s), 2 already present"));
}

#[test]
fn test_cherry_pick_invalid_regex() {
    let pair = tracked_pair();

    forksync(&pair.fork)
        .arg("cherry-pick")
        .arg(&pair.upstream)
        .arg("fix(")
        .arg("--regex")
        .assert()
        .code(1);
}

#[test]
fn test_cherry_pick_source_not_a_repository() {
    let pair = tracked_pair();
    let dir = tempdir().unwrap();

    forksync(&pair.fork)
        .arg("cherry-pick")
        .arg(dir.path())
        .arg("fix:")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a git repository"));
}

// ============================================================================
// hooks
// ============================================================================

#[test]
fn test_hooks_install_refuses_foreign_hook() {
    let pair = tracked_pair();
    write_file(&pair.fork, ".git/hooks/pre-commit", "#!/bin/sh\nmake lint\n");

    forksync(&pair.fork)
        .args(["hooks", "install"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--force"));

    forksync(&pair.fork)
        .args(["hooks", "install", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Replaced"));
}

#[cfg(unix)]
#[test]
fn test_hook_blocks_commit_until_escape_hatch() {
    let pair = tracked_pair();
    forksync(&pair.fork).args(["hooks", "install"]).assert().success();

    let bin = std::path::PathBuf::from(env!("CARGO_BIN_EXE_forksync"));
    let bin_dir = bin.parent().unwrap().to_path_buf();
    let path = std::env::join_paths(
        std::iter::once(bin_dir).chain(std::env::split_paths(
            &std::env::var_os("PATH").unwrap_or_default(),
        )),
    )
    .unwrap();

    write_file(&pair.fork, "README.md", "fork edit\n");
    git(&pair.fork, &["add", "README.md"]);

    let mut commit = std::process::Command::new("git");
    commit
        .args(["commit", "-q", "-m", "Edit readme"])
        .current_dir(&pair.fork)
        .env("PATH", &path);
    for var in CI_VARS {
        commit.env_remove(var);
    }
    assert!(!commit.status().unwrap().success());

    commit.env("FORKSYNC_SYNC_OPERATION", "1");
    assert!(commit.status().unwrap().success());
}
