//! GitHub Actions event model
//!
//! An Actions run exposes its `github` context as JSON. That context names
//! the triggering event (`event_name`), carries the webhook body (`event`)
//! and the job token (`token`). [`ParsedEvent`] is that context;
//! [`decode_payload`] turns the body into a typed [`WebhookPayload`].

pub mod parse;
pub mod payload;
pub mod source;

pub use parse::{ParsedEvent, SCHEDULE_EVENT};
pub use payload::{
    decode_payload, IssuePayload, PullRequestPayload, StatusPayload, WebhookKind, WebhookPayload,
    WorkflowRunPayload,
};
pub use source::{load_event_file, load_event_str, substitute_token, MASKED_TOKEN};
