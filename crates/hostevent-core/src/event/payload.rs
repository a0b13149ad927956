//! Typed webhook payloads
//!
//! [`WebhookKind`] is the closed set of webhook event names GitHub delivers.
//! Kinds the resolver acts on decode into their own payload variant; every
//! other recognized kind decodes to [`WebhookPayload::Other`].

use crate::error::{Error, Result};
use crate::types::RepoRef;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::value::RawValue;

macro_rules! webhook_kinds {
    ($($variant:ident => $name:literal,)+) => {
        /// Webhook event names known to GitHub
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        pub enum WebhookKind {
            $($variant,)+
        }

        impl WebhookKind {
            /// Every known kind
            pub const ALL: &'static [WebhookKind] = &[$(WebhookKind::$variant,)+];

            /// Look up a kind by its event name
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(WebhookKind::$variant),)+
                    _ => None,
                }
            }

            /// Event name as sent in `X-GitHub-Event` / `event_name`
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(WebhookKind::$variant => $name,)+
                }
            }
        }
    };
}

webhook_kinds! {
    BranchProtectionRule => "branch_protection_rule",
    CheckRun => "check_run",
    CheckSuite => "check_suite",
    CodeScanningAlert => "code_scanning_alert",
    CommitComment => "commit_comment",
    ContentReference => "content_reference",
    Create => "create",
    Delete => "delete",
    DependabotAlert => "dependabot_alert",
    DeployKey => "deploy_key",
    Deployment => "deployment",
    DeploymentProtectionRule => "deployment_protection_rule",
    DeploymentReview => "deployment_review",
    DeploymentStatus => "deployment_status",
    Discussion => "discussion",
    DiscussionComment => "discussion_comment",
    Fork => "fork",
    GithubAppAuthorization => "github_app_authorization",
    Gollum => "gollum",
    Installation => "installation",
    InstallationRepositories => "installation_repositories",
    InstallationTarget => "installation_target",
    IntegrationInstallation => "integration_installation",
    IntegrationInstallationRepositories => "integration_installation_repositories",
    IssueComment => "issue_comment",
    Issues => "issues",
    Label => "label",
    MarketplacePurchase => "marketplace_purchase",
    Member => "member",
    Membership => "membership",
    MergeGroup => "merge_group",
    Meta => "meta",
    Milestone => "milestone",
    OrgBlock => "org_block",
    Organization => "organization",
    Package => "package",
    PageBuild => "page_build",
    PersonalAccessTokenRequest => "personal_access_token_request",
    Ping => "ping",
    Project => "project",
    ProjectCard => "project_card",
    ProjectColumn => "project_column",
    ProjectsV2 => "projects_v2",
    ProjectsV2Item => "projects_v2_item",
    Public => "public",
    PullRequest => "pull_request",
    PullRequestReview => "pull_request_review",
    PullRequestReviewComment => "pull_request_review_comment",
    PullRequestReviewThread => "pull_request_review_thread",
    PullRequestTarget => "pull_request_target",
    Push => "push",
    RegistryPackage => "registry_package",
    Release => "release",
    Repository => "repository",
    RepositoryDispatch => "repository_dispatch",
    RepositoryImport => "repository_import",
    RepositoryRuleset => "repository_ruleset",
    RepositoryVulnerabilityAlert => "repository_vulnerability_alert",
    SecretScanningAlert => "secret_scanning_alert",
    SecretScanningAlertLocation => "secret_scanning_alert_location",
    SecurityAdvisory => "security_advisory",
    SecurityAndAnalysis => "security_and_analysis",
    Sponsorship => "sponsorship",
    Star => "star",
    Status => "status",
    Team => "team",
    TeamAdd => "team_add",
    User => "user",
    Watch => "watch",
    WorkflowDispatch => "workflow_dispatch",
    WorkflowJob => "workflow_job",
    WorkflowRun => "workflow_run",
}

/// Payload of the pull request event family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestPayload {
    /// Pull request number
    pub number: u64,
}

/// Payload of `issues` and `issue_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePayload {
    /// Issue number
    pub number: u64,
}

/// Payload of `workflow_run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRunPayload {
    /// Head commit of the run
    pub head_sha: String,
    /// Repository the run belongs to, when the payload names it
    pub repository: Option<RepoRef>,
}

/// Payload of `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPayload {
    /// Commit the status was reported for
    pub sha: String,
    /// Repository of the commit, when the payload names it
    pub repository: Option<RepoRef>,
}

/// A decoded webhook body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookPayload {
    /// `pull_request`
    PullRequest(PullRequestPayload),
    /// `pull_request_target`
    PullRequestTarget(PullRequestPayload),
    /// `pull_request_review`
    PullRequestReview(PullRequestPayload),
    /// `pull_request_review_comment`
    PullRequestReviewComment(PullRequestPayload),
    /// `issues`
    Issues(IssuePayload),
    /// `issue_comment`
    IssueComment(IssuePayload),
    /// `workflow_run`
    WorkflowRun(WorkflowRunPayload),
    /// `status`
    Status(StatusPayload),
    /// Any other recognized kind; the body is not inspected further
    Other(WebhookKind),
}

impl WebhookPayload {
    /// Kind this payload was decoded as
    pub fn kind(&self) -> WebhookKind {
        match self {
            WebhookPayload::PullRequest(_) => WebhookKind::PullRequest,
            WebhookPayload::PullRequestTarget(_) => WebhookKind::PullRequestTarget,
            WebhookPayload::PullRequestReview(_) => WebhookKind::PullRequestReview,
            WebhookPayload::PullRequestReviewComment(_) => WebhookKind::PullRequestReviewComment,
            WebhookPayload::Issues(_) => WebhookKind::Issues,
            WebhookPayload::IssueComment(_) => WebhookKind::IssueComment,
            WebhookPayload::WorkflowRun(_) => WebhookKind::WorkflowRun,
            WebhookPayload::Status(_) => WebhookKind::Status,
            WebhookPayload::Other(kind) => *kind,
        }
    }
}

// ============================================================================
// Raw payload structures
//
// Optional everywhere; required fields are checked after deserialization so
// the error names the missing field for the declared kind.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    #[serde(default)]
    owner: Option<RawOwner>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    #[serde(default)]
    login: Option<String>,
}

impl RawRepository {
    fn into_repo_ref(self) -> Result<Option<RepoRef>> {
        let login = self.owner.and_then(|o| o.login).filter(|l| !l.is_empty());
        match (login, self.name.filter(|n| !n.is_empty())) {
            (Some(owner), Some(name)) => Ok(Some(RepoRef::new(owner, name))),
            _ => self
                .full_name
                .filter(|f| !f.is_empty())
                .map(|f| RepoRef::parse(&f))
                .transpose(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNumbered {
    #[serde(default)]
    number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    pull_request: Option<RawNumbered>,
}

#[derive(Debug, Deserialize)]
struct RawIssuePayload {
    #[serde(default)]
    issue: Option<RawNumbered>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflowRun {
    #[serde(default)]
    head_sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWorkflowRunPayload {
    #[serde(default)]
    workflow_run: Option<RawWorkflowRun>,
    #[serde(default)]
    repository: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawStatusPayload {
    #[serde(default)]
    sha: Option<String>,
    #[serde(default)]
    repository: Option<RawRepository>,
}

/// Decode a webhook body for the declared kind
///
/// # Errors
///
/// * `UnsupportedPayloadType` - `kind` is not a known webhook event name
/// * `MalformedPayload` - body missing, not a JSON object, or lacking a
///   field the kind requires
pub fn decode_payload(kind: &str, raw: Option<&RawValue>) -> Result<WebhookPayload> {
    let webhook = WebhookKind::from_name(kind)
        .ok_or_else(|| Error::UnsupportedPayloadType(kind.to_string()))?;

    let raw = raw.ok_or_else(|| {
        Error::MalformedPayload(format!("{} event carries no payload", kind))
    })?;

    if !raw.get().trim_start().starts_with('{') {
        return Err(Error::MalformedPayload(format!(
            "{} payload is not a JSON object",
            kind
        )));
    }

    let payload = match webhook {
        WebhookKind::PullRequest => WebhookPayload::PullRequest(decode_pull_request(kind, raw)?),
        WebhookKind::PullRequestTarget => {
            WebhookPayload::PullRequestTarget(decode_pull_request(kind, raw)?)
        }
        WebhookKind::PullRequestReview => {
            WebhookPayload::PullRequestReview(decode_pull_request(kind, raw)?)
        }
        WebhookKind::PullRequestReviewComment => {
            WebhookPayload::PullRequestReviewComment(decode_pull_request(kind, raw)?)
        }
        WebhookKind::Issues => WebhookPayload::Issues(decode_issue(kind, raw)?),
        WebhookKind::IssueComment => WebhookPayload::IssueComment(decode_issue(kind, raw)?),
        WebhookKind::WorkflowRun => WebhookPayload::WorkflowRun(decode_workflow_run(raw)?),
        WebhookKind::Status => WebhookPayload::Status(decode_status(raw)?),
        other => WebhookPayload::Other(other),
    };

    Ok(payload)
}

fn from_raw<T: DeserializeOwned>(kind: &str, raw: &RawValue) -> Result<T> {
    serde_json::from_str(raw.get())
        .map_err(|e| Error::MalformedPayload(format!("Invalid {} payload: {}", kind, e)))
}

fn positive(kind: &str, field: &str, number: Option<u64>) -> Result<u64> {
    match number {
        Some(n) if n > 0 => Ok(n),
        Some(_) => Err(Error::MalformedPayload(format!(
            "{} payload has non-positive {}",
            kind, field
        ))),
        None => Err(Error::MalformedPayload(format!(
            "{} payload is missing {}",
            kind, field
        ))),
    }
}

fn decode_pull_request(kind: &str, raw: &RawValue) -> Result<PullRequestPayload> {
    let payload: RawPullRequestPayload = from_raw(kind, raw)?;
    let number = payload
        .pull_request
        .and_then(|pr| pr.number)
        .or(payload.number);
    Ok(PullRequestPayload {
        number: positive(kind, "pull_request.number", number)?,
    })
}

fn decode_issue(kind: &str, raw: &RawValue) -> Result<IssuePayload> {
    let payload: RawIssuePayload = from_raw(kind, raw)?;
    let number = payload.issue.and_then(|i| i.number);
    Ok(IssuePayload {
        number: positive(kind, "issue.number", number)?,
    })
}

fn non_empty(kind: &str, field: &str, value: Option<String>) -> Result<String> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        Error::MalformedPayload(format!("{} payload is missing {}", kind, field))
    })
}

fn decode_workflow_run(raw: &RawValue) -> Result<WorkflowRunPayload> {
    let kind = WebhookKind::WorkflowRun.as_str();
    let payload: RawWorkflowRunPayload = from_raw(kind, raw)?;
    let head_sha = non_empty(
        kind,
        "workflow_run.head_sha",
        payload.workflow_run.and_then(|run| run.head_sha),
    )?;
    let repository = payload
        .repository
        .map(RawRepository::into_repo_ref)
        .transpose()?
        .flatten();
    Ok(WorkflowRunPayload {
        head_sha,
        repository,
    })
}

fn decode_status(raw: &RawValue) -> Result<StatusPayload> {
    let kind = WebhookKind::Status.as_str();
    let payload: RawStatusPayload = from_raw(kind, raw)?;
    let sha = non_empty(kind, "sha", payload.sha)?;
    let repository = payload
        .repository
        .map(RawRepository::into_repo_ref)
        .transpose()?
        .flatten();
    Ok(StatusPayload { sha, repository })
}
