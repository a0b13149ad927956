//! GitHub REST API client for listing open pull requests

use crate::error::{Error, Result};
use crate::pagination::{Page, PageLinks};
use crate::traits::PullRequestLister;
use crate::types::{Credential, PullRequestSummary, RepoRef};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Deserialize;

/// Default GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Largest page size GitHub accepts
pub const MAX_PER_PAGE: u32 = 100;

/// GitHub API pull request object (only the fields we read)
#[derive(Debug, Deserialize)]
struct GitHubPull {
    number: u64,
    head: GitHubBranch,
}

/// GitHub API branch reference
#[derive(Debug, Deserialize)]
struct GitHubBranch {
    sha: String,
}

/// GitHub API client for listing pull requests
pub struct GitHubApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<Credential>,
    per_page: u32,
}

impl std::fmt::Debug for GitHubApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

impl GitHubApiClient {
    /// Create a new GitHub API client
    pub fn new(base_url: String, token: Option<Credential>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("hostevent/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            per_page: MAX_PER_PAGE,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .map(Credential::new);

        Ok(Self::new(base_url, token))
    }

    /// Set the page size (clamped to 1..=100)
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Endpoint listing the pull requests of `repo`
    fn pulls_url(&self, repo: &RepoRef) -> String {
        format!("{}/repos/{}/{}/pulls", self.base_url, repo.owner, repo.name)
    }

    /// Fetch one page of open pull requests
    ///
    /// Endpoint: GET /repos/{owner}/{repo}/pulls
    /// Query params: state=open, per_page, page
    pub async fn list_pull_requests(
        &self,
        repo: &RepoRef,
        page: u32,
    ) -> Result<Page<PullRequestSummary>> {
        let url = self.pulls_url(repo);

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(&[
                ("state", "open"),
                ("per_page", self.per_page.to_string().as_str()),
                ("page", page.to_string().as_str()),
            ]);

        if let Some(ref token) = self.token {
            request = request.bearer_auth(token.expose());
        }

        let response = request.send().await.map_err(|e| {
            Error::UpstreamFetch(format!(
                "Failed to list pull requests of {} (page {}): {}",
                repo, page, e
            ))
        })?;

        let status = response.status();

        // Rate limiting
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok());

            if remaining == Some("0") || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let reset = response
                    .headers()
                    .get("x-ratelimit-reset")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                return Err(Error::UpstreamFetch(format!(
                    "GitHub API rate limit exceeded listing pull requests of {} (reset at {})",
                    repo, reset
                )));
            }
        }

        if !status.is_success() {
            return Err(Error::UpstreamFetch(format!(
                "GitHub API returned {} listing pull requests of {} (page {})",
                status, repo, page
            )));
        }

        let links = PageLinks::from_headers(response.headers());

        let pulls: Vec<GitHubPull> = response.json().await.map_err(|e| {
            Error::UpstreamFetch(format!("Failed to parse pull request list: {}", e))
        })?;

        tracing::trace!(repo = %repo, page, count = pulls.len(), ?links, "listed pull requests");

        Ok(Page::new(
            pulls.into_iter().map(convert_pull).collect(),
            links,
        ))
    }
}

/// Convert GitHub API pull request to our type
fn convert_pull(pull: GitHubPull) -> PullRequestSummary {
    PullRequestSummary {
        number: pull.number,
        head_sha: pull.head.sha,
    }
}

impl PullRequestLister for GitHubApiClient {
    type ListFuture<'a>
        = BoxFuture<'a, Result<Page<PullRequestSummary>>>
    where
        Self: 'a;

    fn list_open_pulls<'a>(&'a self, repo: &'a RepoRef, page: u32) -> Self::ListFuture<'a> {
        self.list_pull_requests(repo, page).boxed()
    }
}
