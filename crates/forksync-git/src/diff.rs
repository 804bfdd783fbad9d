//! Name-status diffs between revisions
//!
//! All three diff flavours used by forksync (revision to revision, single
//! commit, and the staging area) are read through `--name-status` output
//! and parsed by [`parse_name_status`].

use std::fmt;

use serde::Serialize;

use crate::{Error, GitRunner, Result};

/// How a path differs between the two sides of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl ChangeKind {
    /// Single-letter marker as printed by `git diff --name-status`.
    pub fn marker(&self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        };
        f.write_str(name)
    }
}

/// One line of a name-status diff.
///
/// For renames, `path` is the first path git prints and `previous_path` the
/// second; for every other kind `previous_path` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeEntry {
    pub kind: ChangeKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

impl ChangeEntry {
    pub fn new(kind: ChangeKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            previous_path: None,
        }
    }

    pub fn renamed(path: impl Into<String>, previous_path: impl Into<String>) -> Self {
        Self {
            kind: ChangeKind::Renamed,
            path: path.into(),
            previous_path: Some(previous_path.into()),
        }
    }

    /// Every path this entry touches.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.path.as_str()).chain(self.previous_path.as_deref())
    }
}

impl fmt::Display for ChangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.previous_path {
            Some(previous) => write!(f, "{} {} -> {}", self.kind.marker(), self.path, previous),
            None => write!(f, "{} {}", self.kind.marker(), self.path),
        }
    }
}

/// A path touched by a single commit, as reported by `git diff-tree`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChange {
    pub path: String,
    pub status: String,
}

impl TreeChange {
    pub fn is_deletion(&self) -> bool {
        self.status.starts_with('D')
    }
}

/// Parse `git diff --name-status` output.
///
/// Blank lines are ignored. Type changes (`T`) count as modifications.
///
/// # Errors
///
/// Returns [`Error::MalformedDiffLine`] for any line that is not a
/// recognised status followed by the expected number of paths.
pub fn parse_name_status(output: &str) -> Result<Vec<ChangeEntry>> {
    let mut entries = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let malformed = || Error::MalformedDiffLine {
            line: line.to_string(),
        };

        let entry = match fields.as_slice() {
            ["A", path] => ChangeEntry::new(ChangeKind::Added, *path),
            ["M" | "T", path] => ChangeEntry::new(ChangeKind::Modified, *path),
            ["D", path] => ChangeEntry::new(ChangeKind::Deleted, *path),
            [status, first, second] if is_rename_status(status) => {
                ChangeEntry::renamed(*first, *second)
            }
            _ => return Err(malformed()),
        };
        entries.push(entry);
    }

    Ok(entries)
}

fn is_rename_status(status: &str) -> bool {
    status
        .strip_prefix('R')
        .is_some_and(|score| !score.is_empty() && score.bytes().all(|b| b.is_ascii_digit()))
}

/// Diff two revisions with rename detection.
///
/// Paths are reported relative to the repository root. For a rename, `path`
/// is where the file lives in `from` and `previous_path` where it lives in
/// `to`.
pub fn diff(runner: &GitRunner, from: &str, to: &str) -> Result<Vec<ChangeEntry>> {
    let output = runner.run(&[
        "-c",
        "core.quotePath=false",
        "diff",
        "--name-status",
        "-M",
        from,
        to,
        "--",
    ])?;
    let entries = parse_name_status(&output)?;
    tracing::debug!(from, to, count = entries.len(), "Computed change set");
    Ok(entries)
}

/// Changes currently staged in the index, relative to `HEAD`.
pub fn staged_changes(runner: &GitRunner) -> Result<Vec<ChangeEntry>> {
    let output = runner.run(&[
        "-c",
        "core.quotePath=false",
        "diff",
        "--cached",
        "--name-status",
        "-M",
    ])?;
    parse_name_status(&output)
}

/// Paths touched by a single commit, without rename detection.
///
/// Root commits are diffed against the empty tree.
pub fn diff_tree(runner: &GitRunner, commit: &str) -> Result<Vec<TreeChange>> {
    let output = runner.run(&[
        "-c",
        "core.quotePath=false",
        "diff-tree",
        "--root",
        "--no-commit-id",
        "--no-renames",
        "-r",
        "--name-status",
        commit,
    ])?;

    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_once('\t')
                .map(|(status, path)| TreeChange {
                    path: path.to_string(),
                    status: status.to_string(),
                })
                .ok_or_else(|| Error::MalformedDiffLine {
                    line: line.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("A\tnew.txt", ChangeKind::Added, "new.txt")]
    #[case("M\tsrc/lib.rs", ChangeKind::Modified, "src/lib.rs")]
    #[case("D\told.txt", ChangeKind::Deleted, "old.txt")]
    #[case("T\tlink", ChangeKind::Modified, "link")]
    fn test_parse_single_path_status(
        #[case] line: &str,
        #[case] kind: ChangeKind,
        #[case] path: &str,
    ) {
        let entries = parse_name_status(line).unwrap();
        assert_eq!(entries, vec![ChangeEntry::new(kind, path)]);
    }

    #[test]
    fn test_parse_keeps_line_order() {
        let out = "A\tnew.txt\nM\tsrc/lib.rs\nD\told.txt\n";
        let paths: Vec<String> = parse_name_status(out)
            .unwrap()
            .into_iter()
            .map(|entry| entry.path)
            .collect();
        assert_eq!(paths, vec!["new.txt", "src/lib.rs", "old.txt"]);
    }

    #[test]
    fn test_parse_rename_keeps_field_order() {
        let entries = parse_name_status("R087\tdocs/a.md\tdocs/b.md").unwrap();
        assert_eq!(entries, vec![ChangeEntry::renamed("docs/a.md", "docs/b.md")]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        assert!(parse_name_status("\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let err = parse_name_status("X\tpath").unwrap_err();
        assert!(matches!(err, Error::MalformedDiffLine { .. }));
    }

    #[test]
    fn test_parse_rejects_rename_without_second_path() {
        assert!(parse_name_status("R100\tonly-one").is_err());
        assert!(parse_name_status("R\ta\tb").is_err());
    }

    #[test]
    fn test_paths_includes_previous() {
        let entry = ChangeEntry::renamed("a", "b");
        assert_eq!(entry.paths().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(entry.to_string(), "R a -> b");
    }
}
