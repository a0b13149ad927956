//! # Hostevent Core
//!
//! Resolve a GitHub Actions event to the pull requests and issues it concerns.
//!
//! Events that name their pull request or issue (`pull_request`,
//! `issue_comment`, ...) are answered from the payload alone. Events that
//! only know a commit (`workflow_run`, `status`) or nothing at all
//! (`schedule`) page through the repository's open pull requests:
//! - **GATs (Generic Associated Types)** for the page-fetch seams
//! - **Link-header pagination** fetched sequentially, in page order
//! - **Tokio** for async I/O with an overall deadline
//!
//! ## Example
//!
//! ```no_run
//! use hostevent_core::{resolve_event, ParsedEvent, ResolverConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = std::env::var("INPUT_EVENT")?;
//! let event = ParsedEvent::parse(&raw)?;
//!
//! let items = resolve_event(&event, &ResolverConfig::from_env()).await?;
//! for item in items {
//!     println!("{}", item);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod coordination;
pub mod error;
pub mod event;
pub mod http;
pub mod pagination;
pub mod traits;
pub mod types;

pub use coordination::{Connector, EventResolver};
pub use error::{Error, ErrorKind, Result};
pub use event::{ParsedEvent, WebhookKind, WebhookPayload};
pub use pagination::{fetch_all, Page, PageLinks};
pub use types::{AffectedItem, Credential, ItemKind, PullRequestSummary, RepoRef, ResolverConfig};

/// Resolve an event against the GitHub REST API
///
/// This is the main entry point for the library. It handles:
/// - Event kind classification
/// - Payload decoding
/// - Open pull request pagination
/// - Head SHA correlation
///
/// The whole resolution runs under `config.timeout`.
pub async fn resolve_event(event: &ParsedEvent, config: &ResolverConfig) -> Result<Vec<AffectedItem>> {
    let connector = http::GitHubConnector::from_config(config);
    EventResolver::new(connector)
        .with_timeout(config.timeout)
        .resolve(event)
        .await
}

/// Synchronous variant of `resolve_event`
///
/// This creates a single-threaded Tokio runtime and blocks on the async
/// version. Prefer the async version if you're already in an async context.
pub fn resolve_event_sync(event: &ParsedEvent, config: &ResolverConfig) -> Result<Vec<AffectedItem>> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(resolve_event(event, config))
}
