//! [`TestRepo`] for single-checkout forksync scenarios.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::git;

/// A temporary git repository on `main` with helper methods for setup and
/// assertion.
///
/// # Example
///
/// ```rust,no_run
/// use forksync_test_utils::repo::TestRepo;
///
/// let repo = TestRepo::with_commit();
/// repo.write_policy(&["docs/", "!docs/upstream/**"]);
/// repo.assert_file_exists(".forksync/allowlist");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl TestRepo {
    /// Create an empty git repository.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap_or_else(|e| panic!("TestRepo: tempdir: {e}"));
        git::init_repo(temp_dir.path());
        Self { temp_dir }
    }

    /// Create a git repository with an initial `README.md` commit.
    pub fn with_commit() -> Self {
        let repo = Self::new();
        git::commit_file(repo.root(), "README.md", "# Test\n", "Initial commit");
        repo
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write_file(&self, rel: &str, content: &str) {
        git::write_file(self.root(), rel, content);
    }

    pub fn read_file(&self, rel: &str) -> String {
        let full = self.root().join(rel);
        fs::read_to_string(&full)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full.display()))
    }

    /// Write `.forksync/allowlist` with one rule per line.
    pub fn write_policy(&self, rules: &[&str]) {
        let mut content = rules.join("\n");
        content.push('\n');
        self.write_file(".forksync/allowlist", &content);
    }

    /// Write `.forksync/config.toml` verbatim.
    pub fn write_config(&self, toml: &str) {
        self.write_file(".forksync/config.toml", toml);
    }

    pub fn commit_all(&self, message: &str) {
        git::commit_all(self.root(), message);
    }

    /// Assert that `path` (relative to the repo root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the repo root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
