//! Tests for the sync applier against real upstream/fork pairs

use std::fs;

use forksync_core::sync::{LocalAction, SyncApplier, SyncOptions, SyncOutcome, SyncState};
use forksync_core::{Error, Policy};
use forksync_git::{ChangeEntry, ChangeKind, CleanupState, GitRunner};
use forksync_test_utils::UpstreamFork;
use forksync_test_utils::git::{branches, commit_all, git, remove_and_commit, write_file};
use pretty_assertions::assert_eq;

/// Upstream modifies `a.txt`, adds `new.txt`, deletes `old.txt` and touches
/// the fork-owned `owned/x.txt`.
fn diverged_pair() -> UpstreamFork {
    let pair = UpstreamFork::with_files(&[
        ("a.txt", "a v1\n"),
        ("old.txt", "old\n"),
        ("owned/x.txt", "upstream x v1\n"),
    ]);
    write_file(&pair.upstream, "a.txt", "a v2\n");
    write_file(&pair.upstream, "new.txt", "new\n");
    write_file(&pair.upstream, "owned/x.txt", "upstream x v2\n");
    commit_all(&pair.upstream, "Upstream changes");
    remove_and_commit(&pair.upstream, "old.txt", "Drop old.txt");
    pair.fetch();
    pair
}

fn read(pair: &UpstreamFork, rel: &str) -> String {
    fs::read_to_string(pair.fork.join(rel)).unwrap()
}

#[test]
fn test_plan_filters_owned_paths() {
    let pair = diverged_pair();
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::from_rules(["owned/"]);

    let plan = SyncApplier::new(&runner, &policy, "upstream/main")
        .plan()
        .unwrap();

    assert_eq!(plan.local_branch, "main");
    assert_eq!(
        plan.kept,
        vec![
            ChangeEntry::new(ChangeKind::Modified, "a.txt"),
            ChangeEntry::new(ChangeKind::Deleted, "new.txt"),
            ChangeEntry::new(ChangeKind::Added, "old.txt"),
        ]
    );
    assert_eq!(
        plan.skipped,
        vec![ChangeEntry::new(ChangeKind::Modified, "owned/x.txt")]
    );
}

#[test]
fn test_apply_materializes_upstream_state() {
    let pair = diverged_pair();
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::from_rules(["owned/"]);
    let applier = SyncApplier::new(&runner, &policy, "upstream/main");

    let plan = applier.plan().unwrap();
    let report = applier.apply(plan, |_| true).unwrap();

    assert_eq!(report.outcome, SyncOutcome::Applied);
    assert_eq!(
        report.state_trace,
        vec![
            SyncState::Idle,
            SyncState::AwaitingConfirmation,
            SyncState::Applying,
            SyncState::Cleanup,
            SyncState::Done,
        ]
    );
    assert_eq!(report.cleanup, Some(CleanupState::Done));
    let actions: Vec<LocalAction> = report.applied.iter().map(|c| c.action).collect();
    assert_eq!(
        actions,
        vec![LocalAction::Overwritten, LocalAction::Revived, LocalAction::Removed]
    );

    assert_eq!(read(&pair, "a.txt"), "a v2\n");
    assert_eq!(read(&pair, "new.txt"), "new\n");
    assert!(!pair.fork.join("old.txt").exists());
    assert_eq!(read(&pair, "owned/x.txt"), "upstream x v1\n");
    assert_eq!(branches(&pair.fork), vec!["main".to_string()]);
}

#[test]
fn test_apply_handles_upstream_rename() {
    let pair = UpstreamFork::with_files(&[("docs/a.md", "line one\nline two\nline three\n")]);
    git(&pair.upstream, &["mv", "docs/a.md", "docs/b.md"]);
    commit_all(&pair.upstream, "Rename a to b");
    pair.fetch();
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::empty();
    let applier = SyncApplier::new(&runner, &policy, "upstream/main");

    let plan = applier.plan().unwrap();
    assert_eq!(plan.kept, vec![ChangeEntry::renamed("docs/b.md", "docs/a.md")]);

    let report = applier.apply(plan, |_| true).unwrap();

    assert_eq!(report.applied[0].action, LocalAction::Moved);
    assert!(!pair.fork.join("docs/a.md").exists());
    assert_eq!(read(&pair, "docs/b.md"), "line one\nline two\nline three\n");
}

#[test]
fn test_rename_onto_owned_path_is_skipped() {
    let body = "export function widget() {\n  return 1;\n}\n\nexport const size = 2;\n";
    let pair = UpstreamFork::with_files(&[("lib/widget.ts", body)]);
    fs::create_dir_all(pair.fork.join("custom")).unwrap();
    git(&pair.fork, &["mv", "lib/widget.ts", "custom/widget.ts"]);
    write_file(&pair.fork, "custom/widget.ts", &format!("{body}// fork tweak\n"));
    commit_all(&pair.fork, "Move widget into custom/");
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::from_rules(["custom/"]);
    let applier = SyncApplier::new(&runner, &policy, "upstream/main");

    let plan = applier.plan().unwrap();

    assert!(plan.kept.is_empty());
    assert_eq!(
        plan.skipped,
        vec![ChangeEntry::renamed("lib/widget.ts", "custom/widget.ts")]
    );

    let report = applier.apply(plan, |_| true).unwrap();
    assert_eq!(report.outcome, SyncOutcome::NothingToApply);
    assert!(read(&pair, "custom/widget.ts").ends_with("// fork tweak\n"));
    assert!(!pair.fork.join("lib/widget.ts").exists());
}

#[test]
fn test_declined_confirmation_writes_nothing() {
    let pair = diverged_pair();
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::empty();
    let applier = SyncApplier::new(&runner, &policy, "upstream/main");
    let status_before = git(&pair.fork, &["status", "--porcelain"]);

    let plan = applier.plan().unwrap();
    let mut seen = 0;
    let report = applier
        .apply(plan, |plan| {
            seen = plan.kept.len();
            false
        })
        .unwrap();

    assert_eq!(seen, 4);
    assert_eq!(report.outcome, SyncOutcome::Cancelled);
    assert_eq!(report.final_state(), SyncState::Failed);
    assert!(report.applied.is_empty());
    assert_eq!(git(&pair.fork, &["status", "--porcelain"]), status_before);
    assert_eq!(read(&pair, "a.txt"), "a v1\n");
    assert_eq!(branches(&pair.fork), vec!["main".to_string()]);
}

#[test]
fn test_empty_plan_skips_confirmation() {
    let pair = UpstreamFork::new();
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::empty();
    let applier = SyncApplier::new(&runner, &policy, "upstream/main");

    let plan = applier.plan().unwrap();
    let report = applier
        .apply(plan, |_| panic!("confirm must not be called for an empty plan"))
        .unwrap();

    assert_eq!(report.outcome, SyncOutcome::NothingToApply);
    assert_eq!(report.state_trace, vec![SyncState::Idle, SyncState::Failed]);
}

#[test]
fn test_dry_run_leaves_tree_untouched() {
    let pair = diverged_pair();
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::empty();
    let applier = SyncApplier::new(&runner, &policy, "upstream/main")
        .with_options(SyncOptions { dry_run: true });

    let plan = applier.plan().unwrap();
    let report = applier.apply(plan, |_| true).unwrap();

    assert_eq!(report.outcome, SyncOutcome::DryRun);
    assert_eq!(read(&pair, "a.txt"), "a v1\n");
}

#[test]
fn test_entry_failure_still_cleans_up() {
    let pair = UpstreamFork::with_files(&[("a.txt", "a\n")]);
    pair.upstream_commit("blocked.txt", "upstream\n", "Add blocked.txt");
    // An untracked directory where the upstream file must be written.
    write_file(&pair.fork, "blocked.txt/inner", "local\n");
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::empty();
    let applier = SyncApplier::new(&runner, &policy, "upstream/main");

    let plan = applier.plan().unwrap();
    let err = applier.apply(plan, |_| true).unwrap_err();

    match err {
        Error::ApplyFailed { path, .. } => assert_eq!(path, "blocked.txt"),
        other => panic!("expected ApplyFailed, got {other:?}"),
    }
    assert_eq!(branches(&pair.fork), vec!["main".to_string()]);
}

#[test]
fn test_filter_drops_explicit_skip() {
    let pair = UpstreamFork::new();
    let runner = GitRunner::new(&pair.fork);
    let policy = Policy::from_rules(["b.txt"]);
    let applier = SyncApplier::new(&runner, &policy, "upstream/main");

    let plan = applier.filter(
        "main".to_string(),
        vec![
            ChangeEntry::new(ChangeKind::Modified, "a.txt"),
            ChangeEntry::new(ChangeKind::Added, "b.txt"),
        ],
    );

    assert_eq!(plan.kept, vec![ChangeEntry::new(ChangeKind::Modified, "a.txt")]);
    assert_eq!(plan.skipped, vec![ChangeEntry::new(ChangeKind::Added, "b.txt")]);
}
