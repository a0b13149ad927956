//! Parsing of the GitHub Actions `github` context

use crate::error::{Error, Result};
use crate::types::{Credential, RepoRef};
use serde::Deserialize;
use serde_json::value::RawValue;

/// Event name of cron-triggered runs; has no webhook counterpart
pub const SCHEDULE_EVENT: &str = "schedule";

/// One automation event, as delivered to an Actions step
///
/// Only `event_name` is required. The webhook body stays unparsed until the
/// resolver knows which shape to expect.
#[derive(Debug, Deserialize)]
pub struct ParsedEvent {
    /// Declared event kind (`pull_request`, `schedule`, ...)
    #[serde(rename = "event_name")]
    pub event_kind: String,

    /// Webhook body for the declared kind
    #[serde(rename = "event", default)]
    pub raw_payload: Option<Box<RawValue>>,

    /// Token used for hosting API calls
    #[serde(rename = "token", default)]
    pub credential: Option<Credential>,

    /// `owner/name` of the repository the run belongs to
    #[serde(rename = "repository", default)]
    pub repository_full_name: Option<String>,

    /// Commit SHA that triggered the run
    #[serde(default)]
    pub sha: Option<String>,

    /// Login of the user that triggered the run
    #[serde(default)]
    pub actor: Option<String>,

    /// Unique run identifier
    #[serde(default)]
    pub run_id: Option<String>,

    /// Web URL of the GitHub server
    #[serde(default)]
    pub server_url: Option<String>,

    /// REST API URL of the GitHub server
    #[serde(default)]
    pub api_url: Option<String>,
}

impl ParsedEvent {
    /// Parse raw event text
    pub fn parse(raw: &str) -> Result<Self> {
        let mut event: ParsedEvent = serde_json::from_str(raw)
            .map_err(|e| Error::MalformedPayload(format!("Invalid event JSON: {}", e)))?;

        if event.event_kind.trim().is_empty() {
            return Err(Error::MalformedPayload("event_name is empty".to_string()));
        }

        // Actions renders unset context values as empty strings
        if event.credential.as_ref().is_some_and(|c| c.expose().is_empty()) {
            event.credential = None;
        }
        if event
            .repository_full_name
            .as_deref()
            .is_some_and(|r| r.is_empty())
        {
            event.repository_full_name = None;
        }

        tracing::debug!(
            kind = %event.event_kind,
            has_payload = event.raw_payload.is_some(),
            has_token = event.credential.is_some(),
            "parsed event"
        );

        Ok(event)
    }

    /// Event with only a kind; fill the rest with the `with_*` builders
    pub fn new(event_kind: impl Into<String>) -> Self {
        Self {
            event_kind: event_kind.into(),
            raw_payload: None,
            credential: None,
            repository_full_name: None,
            sha: None,
            actor: None,
            run_id: None,
            server_url: None,
            api_url: None,
        }
    }

    /// Attach a webhook body (must be valid JSON)
    pub fn with_payload(mut self, payload: &str) -> Result<Self> {
        let raw = RawValue::from_string(payload.to_string())
            .map_err(|e| Error::MalformedPayload(format!("Invalid payload JSON: {}", e)))?;
        self.raw_payload = Some(raw);
        Ok(self)
    }

    /// Attach an API token
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Attach the `owner/name` repository
    pub fn with_repository(mut self, full_name: impl Into<String>) -> Self {
        self.repository_full_name = Some(full_name.into());
        self
    }

    /// Whether this is a cron-triggered run
    #[inline]
    pub fn is_schedule(&self) -> bool {
        self.event_kind == SCHEDULE_EVENT
    }

    /// Repository declared at the context level, parsed
    pub fn repository(&self) -> Result<Option<RepoRef>> {
        self.repository_full_name
            .as_deref()
            .map(RepoRef::parse)
            .transpose()
    }
}
