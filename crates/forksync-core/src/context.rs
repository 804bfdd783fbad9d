//! Execution environment detection
//!
//! Environment variables are read once, at the boundary, into an
//! [`ExecutionContext`]. Nothing else in the engine consults the process
//! environment.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::{Error, Result};

/// Escape hatch set by forksync's own commits. Truthy values are `1`,
/// `true` and `yes`.
pub const SYNC_OPERATION_ENV: &str = "FORKSYNC_SYNC_OPERATION";

/// Upstream checkout directory in dual-checkout CI mode.
pub const UPSTREAM_DIR_ENV: &str = "FORKSYNC_UPSTREAM_DIR";

/// Fork checkout directory in dual-checkout CI mode.
pub const FORK_DIR_ENV: &str = "FORKSYNC_FORK_DIR";

/// CI providers forksync recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CiVendor {
    Github,
    Gitlab,
    Bitbucket,
    Circleci,
    Buildkite,
    Jenkins,
    Azure,
    Generic,
}

/// Detection variable, vendor and token variable, checked in order.
const VENDORS: &[(&str, CiVendor, Option<&str>)] = &[
    ("GITHUB_ACTIONS", CiVendor::Github, Some("GITHUB_TOKEN")),
    ("GITLAB_CI", CiVendor::Gitlab, Some("CI_JOB_TOKEN")),
    ("BITBUCKET_BUILD_NUMBER", CiVendor::Bitbucket, Some("BITBUCKET_TOKEN")),
    ("CIRCLECI", CiVendor::Circleci, Some("CIRCLE_TOKEN")),
    ("BUILDKITE", CiVendor::Buildkite, Some("BUILDKITE_AGENT_ACCESS_TOKEN")),
    ("JENKINS_URL", CiVendor::Jenkins, None),
    ("TF_BUILD", CiVendor::Azure, Some("SYSTEM_ACCESSTOKEN")),
];

impl CiVendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::Circleci => "circleci",
            Self::Buildkite => "buildkite",
            Self::Jenkins => "jenkins",
            Self::Azure => "azure",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for CiVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream and fork checkout directories, each optional until validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SideBySidePaths {
    pub upstream: Option<PathBuf>,
    pub fork: Option<PathBuf>,
}

/// Everything the engine needs to know about where it is running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionContext {
    pub is_ci: bool,
    pub ci_vendor: Option<CiVendor>,
    #[serde(skip)]
    pub ci_token: Option<String>,
    pub side_by_side_paths: SideBySidePaths,
    pub sync_operation: bool,
}

impl ExecutionContext {
    /// Read the current process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a context from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());

        let detected = VENDORS.iter().find(|(var, _, _)| is_set(var));
        let (ci_vendor, ci_token) = match detected {
            Some((_, vendor, token_var)) => (Some(*vendor), token_var.and_then(&lookup)),
            None if lookup("CI").is_some_and(|v| is_truthy(&v)) => (Some(CiVendor::Generic), None),
            None => (None, None),
        };

        let path = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
        };

        let context = Self {
            is_ci: ci_vendor.is_some(),
            ci_vendor,
            ci_token,
            side_by_side_paths: SideBySidePaths {
                upstream: path(UPSTREAM_DIR_ENV),
                fork: path(FORK_DIR_ENV),
            },
            sync_operation: lookup(SYNC_OPERATION_ENV).is_some_and(|v| is_truthy(&v)),
        };
        tracing::debug!(
            is_ci = context.is_ci,
            vendor = ?context.ci_vendor,
            sync_operation = context.sync_operation,
            "Detected execution context"
        );
        context
    }

    /// Upstream and fork directories for a dual-checkout check.
    ///
    /// Outside CI this is `None` and the local staged check applies.
    ///
    /// # Errors
    ///
    /// In CI, returns [`Error::MissingCiPath`] naming the first unset
    /// variable.
    pub fn dual_checkout_paths(&self) -> Result<Option<(PathBuf, PathBuf)>> {
        let Some(vendor) = self.ci_vendor else {
            return Ok(None);
        };
        let missing = |variable| Error::MissingCiPath {
            variable,
            vendor: vendor.to_string(),
        };

        let upstream = self
            .side_by_side_paths
            .upstream
            .clone()
            .ok_or_else(|| missing(UPSTREAM_DIR_ENV))?;
        let fork = self
            .side_by_side_paths
            .fork
            .clone()
            .ok_or_else(|| missing(FORK_DIR_ENV))?;
        Ok(Some((upstream, fork)))
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
