//! Builds authenticated GitHub clients from event credentials

use crate::coordination::Connector;
use crate::error::{Error, Result};
use crate::http::client::{GitHubApiClient, DEFAULT_API_URL, MAX_PER_PAGE};
use crate::types::{Credential, ResolverConfig};

/// [`Connector`] producing [`GitHubApiClient`]s
///
/// The API URL is taken from the configuration when set, else from the
/// event's `api_url`, else the public GitHub endpoint.
#[derive(Debug, Clone)]
pub struct GitHubConnector {
    api_url: Option<String>,
    per_page: u32,
}

impl GitHubConnector {
    /// Create a connector
    pub fn new(api_url: Option<String>, per_page: u32) -> Self {
        Self { api_url, per_page }
    }

    /// Create from resolver configuration
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.api_url.clone(), config.per_page)
    }

    fn base_url<'a>(&'a self, event_api_url: Option<&'a str>) -> &'a str {
        self.api_url
            .as_deref()
            .or(event_api_url)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }
}

impl Default for GitHubConnector {
    fn default() -> Self {
        Self::new(None, MAX_PER_PAGE)
    }
}

impl Connector for GitHubConnector {
    type Lister = GitHubApiClient;

    fn connect(&self, credential: &Credential, api_url: Option<&str>) -> Result<GitHubApiClient> {
        let base_url = self.base_url(api_url);
        if !base_url.starts_with("https://") && !base_url.starts_with("http://") {
            return Err(Error::Config(format!(
                "API URL must be http(s): {}",
                base_url
            )));
        }

        tracing::debug!(base_url, "connecting to GitHub API");

        Ok(GitHubApiClient::new(base_url.to_string(), Some(credential.clone()))
            .with_per_page(self.per_page))
    }
}
