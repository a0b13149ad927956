//! HTTP client for GitHub API

pub mod client;
pub mod connector;

pub use client::{GitHubApiClient, DEFAULT_API_URL, MAX_PER_PAGE};
pub use connector::GitHubConnector;
