//! Bounded git command execution
//!
//! [`GitRunner`] is the only place forksync spawns `git`. It offers two call
//! shapes: strict calls ([`GitRunner::run`], [`GitRunner::run_raw`]) that
//! turn a non-zero exit into an [`Error`], and a lenient call
//! ([`GitRunner::try_run`]) for queries where failure simply means "no".

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Default timeout applied to every git invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between child status polls while waiting for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Runs git subcommands inside one working directory.
#[derive(Debug, Clone)]
pub struct GitRunner {
    dir: PathBuf,
    timeout: Duration,
}

impl GitRunner {
    /// Create a runner rooted at `dir` with the default timeout.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the per-command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Working directory every command runs in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Per-command timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a git command and return its stdout as text, without the
    /// trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandFailed`] on a non-zero exit,
    /// [`Error::Timeout`] when the command outlives the timeout, and
    /// [`Error::Spawn`] when git cannot be started.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        let stdout = self.execute(args, &[])?;
        Ok(into_text(stdout))
    }

    /// Run a git command and return its raw stdout bytes.
    ///
    /// Used for blob content, which may not be valid UTF-8.
    pub fn run_raw(&self, args: &[&str]) -> Result<Vec<u8>> {
        self.execute(args, &[])
    }

    /// Run a git command with extra environment variables set on the child
    /// process only.
    pub fn run_with_env(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
        let stdout = self.execute(args, envs)?;
        Ok(into_text(stdout))
    }

    /// Run a git command, returning `None` instead of an error on failure.
    ///
    /// Failures are logged at debug level and otherwise discarded; use this
    /// only for queries whose failure is an expected answer.
    pub fn try_run(&self, args: &[&str]) -> Option<String> {
        match self.execute(args, &[]) {
            Ok(stdout) => Some(into_text(stdout)),
            Err(e) => {
                tracing::debug!(error = %e, "Lenient git command failed");
                None
            }
        }
    }

    fn execute(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<Vec<u8>> {
        let command = describe(args);
        tracing::debug!(command = %command, dir = %self.dir.display(), "Running git");

        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;

        // Drain both pipes on their own threads so a chatty command cannot
        // block on a full pipe while we wait for it to exit.
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = match wait_with_timeout(&mut child, self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Timeout {
                    command,
                    seconds: self.timeout.as_secs(),
                });
            }
            Err(source) => return Err(Error::Spawn { command, source }),
        };

        let stdout = join(stdout_reader);
        let stderr = join(stderr_reader);

        if status.success() {
            Ok(stdout)
        } else {
            Err(Error::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
                exit_code: status.code(),
            })
        }
    }
}

fn describe(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn into_text(stdout: Vec<u8>) -> String {
    let text = String::from_utf8_lossy(&stdout);
    text.trim_end_matches(['\n', '\r']).to_string()
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

/// Poll the child until it exits or the timeout elapses.
///
/// Returns `Ok(None)` on timeout; the caller is responsible for killing
/// the child.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= timeout {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_returns_trimmed_stdout() {
        let temp = TempDir::new().unwrap();
        let runner = GitRunner::new(temp.path());
        let version = runner.run(&["--version"]).unwrap();
        assert!(version.starts_with("git version"));
        assert!(!version.ends_with('\n'));
    }

    #[test]
    fn test_strict_failure_names_command() {
        let temp = TempDir::new().unwrap();
        let runner = GitRunner::new(temp.path());
        let err = runner
            .run(&["rev-parse", "--verify", "definitely-not-a-ref"])
            .unwrap_err();
        let msg = err.to_string();
        assert!(
            msg.contains("git rev-parse --verify definitely-not-a-ref"),
            "error should name the command, got: {msg}"
        );
    }

    #[test]
    fn test_lenient_failure_is_none() {
        let temp = TempDir::new().unwrap();
        let runner = GitRunner::new(temp.path());
        assert!(runner.try_run(&["rev-parse", "--verify", "nope"]).is_none());
    }

    #[test]
    fn test_missing_directory_is_spawn_error() {
        let runner = GitRunner::new("/nonexistent/forksync/dir");
        let err = runner.run(&["status"]).unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }), "got: {err:?}");
    }

    #[test]
    fn test_timeout_setting() {
        let runner = GitRunner::new(".").with_timeout(Duration::from_secs(5));
        assert_eq!(runner.timeout(), Duration::from_secs(5));
        assert_eq!(GitRunner::new(".").timeout(), DEFAULT_TIMEOUT);
    }
}
