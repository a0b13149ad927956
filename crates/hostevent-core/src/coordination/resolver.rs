//! Event resolution: event kind → affected pull requests and issues

use crate::error::{Error, Result};
use crate::event::{decode_payload, ParsedEvent, WebhookPayload};
use crate::pagination::fetch_all;
use crate::traits::{OpenPullRequests, PullRequestLister};
use crate::types::{AffectedItem, Credential, PullRequestSummary, RepoRef, DEFAULT_TIMEOUT};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Turns an event credential into an authenticated pull request lister
pub trait Connector {
    /// Lister bound to one credential
    type Lister: PullRequestLister;

    /// Authenticate with `credential`; `api_url` is the event's API endpoint
    fn connect(&self, credential: &Credential, api_url: Option<&str>) -> Result<Self::Lister>;
}

/// First open pull request whose head commit is `sha`
///
/// Pull requests are scanned in fetch order; if several share the head
/// commit only the first is returned.
pub fn find_by_head_sha<'p>(
    pulls: &'p [PullRequestSummary],
    sha: &str,
) -> Option<&'p PullRequestSummary> {
    let mut matches = pulls.iter().filter(|pr| pr.head_sha == sha);
    let first = matches.next()?;
    if let Some(other) = matches.next() {
        warn!(
            sha,
            chosen = first.number,
            also = other.number,
            "several open pull requests share the head sha, using the first"
        );
    }
    Some(first)
}

/// Resolves one event to the items it affects
///
/// Stateless between calls: each [`resolve`](Self::resolve) connects,
/// fetches, and discards everything it fetched.
pub struct EventResolver<C> {
    connector: C,
    timeout: Duration,
}

impl<C: Connector> EventResolver<C> {
    /// Create a resolver with the default ten minute deadline
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-resolution deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve `event` to the pull requests / issues it concerns
    ///
    /// | kind | result |
    /// |---|---|
    /// | `schedule` | every open pull request of the repository |
    /// | `pull_request`, `pull_request_target`, `pull_request_review`, `pull_request_review_comment` | the pull request in the payload |
    /// | `issues`, `issue_comment` | the issue in the payload |
    /// | `workflow_run`, `status` | the open pull request whose head is the reported commit, if any |
    ///
    /// # Errors
    ///
    /// * `MalformedPayload` - missing payload fields, repository, or token
    /// * `UnsupportedPayloadType` - kind is not a webhook event name
    /// * `UnknownEventKind` - webhook kind without a resolution strategy
    /// * `UpstreamFetch` - listing pull requests failed
    /// * `Timeout` - the deadline elapsed
    #[tracing::instrument(skip_all, fields(kind = %event.event_kind))]
    pub async fn resolve(&self, event: &ParsedEvent) -> Result<Vec<AffectedItem>> {
        match tokio::time::timeout(self.timeout, self.resolve_by_kind(event)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "{} event not resolved within {}s",
                event.event_kind,
                self.timeout.as_secs_f64()
            ))),
        }
    }

    async fn resolve_by_kind(&self, event: &ParsedEvent) -> Result<Vec<AffectedItem>> {
        // `schedule` has no webhook counterpart and no payload
        if event.is_schedule() {
            return self.resolve_schedule(event).await;
        }

        let payload = decode_payload(&event.event_kind, event.raw_payload.as_deref())?;

        match payload {
            WebhookPayload::PullRequest(pr)
            | WebhookPayload::PullRequestTarget(pr)
            | WebhookPayload::PullRequestReview(pr)
            | WebhookPayload::PullRequestReviewComment(pr) => {
                info!(number = pr.number, "found pull request");
                Ok(vec![AffectedItem::pull_request(pr.number)])
            }
            WebhookPayload::Issues(issue) | WebhookPayload::IssueComment(issue) => {
                info!(number = issue.number, "found issue");
                Ok(vec![AffectedItem::issue(issue.number)])
            }
            WebhookPayload::WorkflowRun(run) => {
                self.resolve_head_sha(event, run.repository, &run.head_sha)
                    .await
            }
            WebhookPayload::Status(status) => {
                self.resolve_head_sha(event, status.repository, &status.sha)
                    .await
            }
            WebhookPayload::Other(kind) => Err(Error::UnknownEventKind(kind.as_str().to_string())),
        }
    }

    async fn resolve_schedule(&self, event: &ParsedEvent) -> Result<Vec<AffectedItem>> {
        let repo = event.repository()?.ok_or_else(|| {
            Error::MalformedPayload("schedule event is missing repository".to_string())
        })?;

        let pulls = self.open_pulls(event, &repo).await?;
        let items: Vec<AffectedItem> = pulls
            .iter()
            .map(|pr| AffectedItem::pull_request(pr.number))
            .collect();

        info!(repo = %repo, count = items.len(), "schedule affects every open pull request");

        Ok(items)
    }

    async fn resolve_head_sha(
        &self,
        event: &ParsedEvent,
        repository: Option<RepoRef>,
        sha: &str,
    ) -> Result<Vec<AffectedItem>> {
        let repo = match repository {
            Some(repo) => repo,
            None => event.repository()?.ok_or_else(|| {
                Error::MalformedPayload(format!(
                    "{} event names no repository",
                    event.event_kind
                ))
            })?,
        };

        let pulls = self.open_pulls(event, &repo).await?;

        match find_by_head_sha(&pulls, sha) {
            Some(pr) => {
                info!(number = pr.number, sha, "found pull request by head sha");
                Ok(vec![AffectedItem::pull_request(pr.number)])
            }
            None => {
                info!(sha, "no open pull request has this head sha");
                Ok(Vec::new())
            }
        }
    }

    async fn open_pulls(
        &self,
        event: &ParsedEvent,
        repo: &RepoRef,
    ) -> Result<Vec<PullRequestSummary>> {
        let credential = event.credential.as_ref().ok_or_else(|| {
            Error::MalformedPayload(format!(
                "{} event carries no token for the API",
                event.event_kind
            ))
        })?;

        let lister = self
            .connector
            .connect(credential, event.api_url.as_deref())?;
        let pulls = fetch_all(&OpenPullRequests::new(&lister, repo)).await?;

        debug!(repo = %repo, count = pulls.len(), "fetched open pull requests");

        Ok(pulls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_head_sha_first_match_wins() {
        let pulls = vec![
            PullRequestSummary::new(3, "aaa"),
            PullRequestSummary::new(5, "bbb"),
            PullRequestSummary::new(8, "bbb"),
        ];
        assert_eq!(find_by_head_sha(&pulls, "bbb").map(|p| p.number), Some(5));
        assert_eq!(find_by_head_sha(&pulls, "aaa").map(|p| p.number), Some(3));
        assert!(find_by_head_sha(&pulls, "ccc").is_none());
        assert!(find_by_head_sha(&[], "aaa").is_none());
    }

    #[test]
    fn test_find_by_head_sha_is_exact() {
        let pulls = vec![PullRequestSummary::new(1, "abcdef")];
        assert!(find_by_head_sha(&pulls, "abc").is_none());
        assert!(find_by_head_sha(&pulls, "ABCDEF").is_none());
    }
}
