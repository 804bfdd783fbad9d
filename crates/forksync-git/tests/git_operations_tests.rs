use forksync_git::commits::{commit_count, commit_messages, find_matching_commits, list_commits};
use forksync_git::helpers::{
    add_remote, commit, current_branch, hooks_dir, is_repository, list_tree, read_blob,
    remote_url, resolve_commit, stage, stage_removal, toplevel,
};
use forksync_git::{Error, GitRunner, MessagePattern};
use forksync_test_utils::git::{commit_file, git, init_repo, write_file};
use forksync_test_utils::{TestRepo, UpstreamFork};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_list_commits_oldest_first() {
    let repo = TestRepo::with_commit();
    commit_file(repo.root(), "a.txt", "a", "feat: add a");
    commit_file(repo.root(), "b.txt", "b", "fix: add b");
    let runner = GitRunner::new(repo.root());

    let summaries: Vec<String> = list_commits(&runner, "HEAD")
        .unwrap()
        .into_iter()
        .map(|c| c.summary)
        .collect();

    assert_eq!(summaries, vec!["Initial commit", "feat: add a", "fix: add b"]);
}

#[test]
fn test_find_matching_commits_substring_and_regex() {
    let repo = TestRepo::with_commit();
    commit_file(repo.root(), "a.txt", "a", "feat(ui): button");
    commit_file(repo.root(), "b.txt", "b", "chore: deps");
    commit_file(repo.root(), "c.txt", "c", "feat(ui): input");
    let runner = GitRunner::new(repo.root());

    let by_substring =
        find_matching_commits(&runner, "HEAD", &MessagePattern::substring("(ui)")).unwrap();
    assert_eq!(by_substring.len(), 2);
    assert_eq!(by_substring[0].summary, "feat(ui): button");

    let by_regex =
        find_matching_commits(&runner, "HEAD", &MessagePattern::regex(r"^chore:").unwrap())
            .unwrap();
    assert_eq!(by_regex.len(), 1);
}

#[test]
fn test_commit_messages_on_unborn_head_is_empty() {
    let repo = TestRepo::new();
    let runner = GitRunner::new(repo.root());
    assert!(commit_messages(&runner).unwrap().is_empty());
    assert_eq!(commit_count(&runner), 0);
}

#[test]
fn test_commit_messages_outside_repository_fails() {
    let temp = TempDir::new().unwrap();
    let runner = GitRunner::new(temp.path());
    assert!(matches!(
        commit_messages(&runner).unwrap_err(),
        Error::NotARepository { .. }
    ));
}

#[test]
fn test_commit_preserves_message_and_env() {
    let repo = TestRepo::with_commit();
    let runner = GitRunner::new(repo.root());
    repo.write_file("x.txt", "x");
    stage(&runner, "x.txt").unwrap();

    commit(&runner, "feat: exact\n\nwith body", &[("FORKSYNC_SYNC_OPERATION", "1")]).unwrap();

    let messages = commit_messages(&runner).unwrap();
    assert_eq!(messages[0], "feat: exact\n\nwith body");
    assert_eq!(commit_count(&runner), 2);
}

#[test]
fn test_stage_removal_ignores_unknown_path() {
    let repo = TestRepo::with_commit();
    let runner = GitRunner::new(repo.root());
    stage_removal(&runner, "never-tracked.txt").unwrap();
}

#[test]
fn test_list_tree_and_read_blob() {
    let pair = UpstreamFork::with_files(&[("src/a.rs", "fn a() {}\n"), ("README.md", "hi\n")]);
    let runner = GitRunner::new(&pair.fork);

    let tree = list_tree(&runner, "upstream/main").unwrap();
    assert_eq!(
        tree.into_iter().collect::<Vec<_>>(),
        vec!["README.md".to_string(), "src/a.rs".to_string()]
    );
    assert_eq!(
        read_blob(&runner, "upstream/main", "src/a.rs").unwrap(),
        b"fn a() {}\n"
    );
}

#[test]
fn test_read_blob_missing_path_fails() {
    let pair = UpstreamFork::new();
    let runner = GitRunner::new(&pair.fork);
    let err = read_blob(&runner, "upstream/main", "missing.txt").unwrap_err();
    assert!(matches!(err, Error::CommandFailed { .. }));
}

#[test]
fn test_remote_helpers() {
    let repo = TestRepo::with_commit();
    let runner = GitRunner::new(repo.root());
    assert_eq!(remote_url(&runner, "upstream"), None);

    add_remote(&runner, "upstream", "https://example.com/up.git").unwrap();
    assert_eq!(
        remote_url(&runner, "upstream").as_deref(),
        Some("https://example.com/up.git")
    );
}

#[test]
fn test_repository_detection() {
    let temp = TempDir::new().unwrap();
    let runner = GitRunner::new(temp.path());
    assert!(!is_repository(&runner));
    assert!(matches!(
        toplevel(&runner).unwrap_err(),
        Error::NotARepository { .. }
    ));

    init_repo(temp.path());
    write_file(temp.path(), "nested/dir/file.txt", "x");
    let nested = GitRunner::new(temp.path().join("nested/dir"));
    assert!(is_repository(&nested));
    assert_eq!(
        toplevel(&nested).unwrap().canonicalize().unwrap(),
        temp.path().canonicalize().unwrap()
    );
    assert!(hooks_dir(&runner).unwrap().ends_with("hooks"));
}

#[test]
fn test_detached_head_is_reported() {
    let repo = TestRepo::with_commit();
    let runner = GitRunner::new(repo.root());
    let head = resolve_commit(&runner, "HEAD").unwrap();
    git(repo.root(), &["checkout", "--quiet", "--detach", &head]);

    assert!(matches!(
        current_branch(&runner).unwrap_err(),
        Error::DetachedHead { .. }
    ));
}

#[test]
fn test_resolve_unknown_ref() {
    let repo = TestRepo::with_commit();
    let runner = GitRunner::new(repo.root());
    assert!(matches!(
        resolve_commit(&runner, "nope").unwrap_err(),
        Error::RefNotFound { .. }
    ));
}
