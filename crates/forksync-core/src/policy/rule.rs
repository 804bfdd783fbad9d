//! A single allow-list rule
//!
//! Rules use a small gitignore-flavoured syntax:
//!
//! - `dir/` matches the directory and everything beneath it (plain prefix
//!   match, no wildcards)
//! - `**` matches any number of path segments, `*` any run of characters
//!   within one segment, `?` a single character within one segment
//! - a leading `!` marks a negation rule
//!
//! A glob rule that matches a directory also matches everything under it.

use regex::Regex;

/// How a rule's pattern is tested against a path.
#[derive(Debug, Clone)]
enum Matcher {
    /// `dir/` rules: the directory itself or anything below it
    Directory(String),
    /// Translated glob
    Glob(Regex),
    /// Pattern that could not be compiled, compared verbatim
    Literal(String),
}

/// One parsed line of a policy file.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: String,
    negated: bool,
    dir_only: bool,
    matcher: Matcher,
}

impl Rule {
    /// Parse a rule line. Never fails: a pattern that cannot be compiled is
    /// matched literally.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (negated, body) = match trimmed.strip_prefix('!') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };

        let body = strip_root_prefix(body);
        let dir_only = body.ends_with('/');

        let matcher = if dir_only {
            Matcher::Directory(body.trim_end_matches('/').to_string())
        } else {
            match Regex::new(&glob_to_regex(body)) {
                Ok(re) => Matcher::Glob(re),
                Err(e) => {
                    tracing::debug!(pattern = body, error = %e, "Treating rule as literal");
                    Matcher::Literal(body.to_string())
                }
            }
        };

        Self {
            pattern: trimmed.to_string(),
            negated,
            dir_only,
            matcher,
        }
    }

    /// Whether the rule's pattern matches `path`, ignoring negation.
    ///
    /// `path` must already be in normalized repository form.
    pub fn matches(&self, path: &str) -> bool {
        match &self.matcher {
            Matcher::Directory(dir) => {
                path == dir
                    || path
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            Matcher::Glob(re) => re.is_match(path),
            Matcher::Literal(literal) => {
                path == literal
                    || path
                        .strip_prefix(literal.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    /// The rule as written, including any `!`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

fn strip_root_prefix(pattern: &str) -> &str {
    let mut body = pattern;
    loop {
        if let Some(rest) = body.strip_prefix("./") {
            body = rest;
        } else if let Some(rest) = body.strip_prefix('/') {
            body = rest;
        } else {
            return body;
        }
    }
}

/// Translate a glob into an anchored regular expression.
///
/// The result matches the path itself or anything beneath it.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 16);
    out.push('^');

    let chars: Vec<char> = glob.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }

    out.push_str("(?:/.*)?$");
    out
}
