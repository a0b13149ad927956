//! Core type definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Kind of item an event concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ItemKind {
    /// Pull request
    PullRequest,
    /// Issue
    Issue,
}

impl ItemKind {
    /// Get string representation
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PullRequest => "pull_request",
            Self::Issue => "issue",
        }
    }
}

/// A pull request or issue affected by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AffectedItem {
    /// Item kind
    pub kind: ItemKind,
    /// Number within the repository (always positive)
    pub number: u64,
}

impl AffectedItem {
    /// Pull request item
    #[inline]
    pub const fn pull_request(number: u64) -> Self {
        Self {
            kind: ItemKind::PullRequest,
            number,
        }
    }

    /// Issue item
    #[inline]
    pub const fn issue(number: u64) -> Self {
        Self {
            kind: ItemKind::Issue,
            number,
        }
    }
}

impl fmt::Display for AffectedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind.as_str(), self.number)
    }
}

/// Minimal projection of an open pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    /// Pull request number
    pub number: u64,
    /// Commit SHA at the tip of the source branch
    pub head_sha: String,
}

impl PullRequestSummary {
    /// Create a summary
    pub fn new(number: u64, head_sha: impl Into<String>) -> Self {
        Self {
            number,
            head_sha: head_sha.into(),
        }
    }
}

/// Repository coordinates (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Owner login (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    /// Create from owner and name
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse `owner/name`
    ///
    /// Exactly one separator, both halves non-empty.
    pub fn parse(full_name: &str) -> Result<Self> {
        match full_name.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::MalformedPayload(format!(
                "Invalid repository name: {:?} (expected owner/name)",
                full_name
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Bearer token used for hosting API calls
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the raw token for an Authorization header
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Credential)
    }
}

/// Default overall deadline for one resolution
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// REST API base URL; `None` defers to the event's `api_url`
    pub api_url: Option<String>,
    /// Pull requests requested per page (1..=100)
    pub per_page: u32,
    /// Deadline covering every API call of one resolution
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            per_page: 100,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ResolverConfig {
    /// Defaults overlaid with `GITHUB_API_URL`
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("GITHUB_API_URL")
                .ok()
                .filter(|u| !u.is_empty()),
            ..Default::default()
        }
    }
}
