//! Commit history extraction and message matching

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;

use crate::helpers::{is_repository, ref_exists};
use crate::{Error, GitRunner, Result};

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';
const LOG_FORMAT: &str = "--format=%H%x1f%an%x1f%at%x1f%B%x1e";

/// Information about a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full commit hash
    pub hash: String,

    /// Abbreviated hash (7 characters)
    pub short_hash: String,

    /// First line of the commit message
    pub summary: String,

    /// Full commit message, surrounding whitespace trimmed
    pub message: String,

    /// Commit author name
    pub author: String,

    /// Author timestamp
    pub timestamp: DateTime<Utc>,
}

/// How a commit message is matched during replay.
#[derive(Debug, Clone)]
pub enum MessagePattern {
    /// Case-sensitive substring match.
    Substring(String),
    /// Regular expression searched anywhere in the message.
    Regex(Regex),
}

impl MessagePattern {
    pub fn substring(pattern: impl Into<String>) -> Self {
        Self::Substring(pattern.into())
    }

    /// Compile `pattern` as a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when the expression does not compile.
    pub fn regex(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Regex)
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
    }

    pub fn matches(&self, message: &str) -> bool {
        match self {
            Self::Substring(needle) => message.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(message),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Substring(needle) => needle,
            Self::Regex(re) => re.as_str(),
        }
    }
}

/// All commits reachable from `rev`, oldest first.
pub fn list_commits(runner: &GitRunner, rev: &str) -> Result<Vec<CommitInfo>> {
    let output = runner.run(&["log", "--reverse", LOG_FORMAT, rev, "--"])?;
    parse_log(&output)
}

/// Commits reachable from `rev` whose message matches `pattern`, oldest first.
pub fn find_matching_commits(
    runner: &GitRunner,
    rev: &str,
    pattern: &MessagePattern,
) -> Result<Vec<CommitInfo>> {
    let commits = list_commits(runner, rev)?;
    let total = commits.len();
    let matching: Vec<CommitInfo> = commits
        .into_iter()
        .filter(|c| pattern.matches(&c.message))
        .collect();
    tracing::debug!(
        rev,
        pattern = pattern.as_str(),
        total,
        matching = matching.len(),
        "Filtered commit history"
    );
    Ok(matching)
}

/// Trimmed messages of every commit on the current branch.
///
/// A repository without commits yields an empty list; any other git failure
/// is returned.
pub fn commit_messages(runner: &GitRunner) -> Result<Vec<String>> {
    if !ref_exists(runner, "HEAD") {
        if !is_repository(runner) {
            return Err(Error::NotARepository {
                path: runner.dir().to_path_buf(),
            });
        }
        return Ok(Vec::new());
    }
    let output = runner.run(&["log", LOG_FORMAT, "HEAD", "--"])?;
    Ok(parse_log(&output)?
        .into_iter()
        .map(|c| c.message)
        .collect())
}

/// Number of commits on the current branch, zero when `HEAD` is unborn.
pub fn commit_count(runner: &GitRunner) -> usize {
    runner
        .try_run(&["rev-list", "--count", "HEAD"])
        .and_then(|out| out.trim().parse().ok())
        .unwrap_or(0)
}

fn parse_log(output: &str) -> Result<Vec<CommitInfo>> {
    output
        .split(RECORD_SEP)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .map(parse_record)
        .collect()
}

fn parse_record(record: &str) -> Result<CommitInfo> {
    let mut fields = record.splitn(4, FIELD_SEP);
    let (Some(hash), Some(author), Some(time), Some(body)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(Error::MalformedLog {
            record: record.to_string(),
        });
    };

    let timestamp = time
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_default();
    let message = body.trim().to_string();
    let summary = message.lines().next().unwrap_or_default().to_string();

    Ok(CommitInfo {
        short_hash: hash.chars().take(7).collect(),
        hash: hash.to_string(),
        summary,
        message,
        author: author.to_string(),
        timestamp,
    })
}
