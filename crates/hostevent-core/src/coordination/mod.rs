//! Main coordination logic

pub mod resolver;

pub use resolver::{find_by_head_sha, Connector, EventResolver};

use crate::error::{Error, Result};
use crate::types::RepoRef;

/// Read the repository from the GITHUB_REPOSITORY environment variable.
///
/// Returns `Ok(None)` when unset or empty.
pub fn repository_from_env() -> Result<Option<RepoRef>> {
    match std::env::var("GITHUB_REPOSITORY") {
        Ok(repository) if !repository.is_empty() => RepoRef::parse(&repository)
            .map(Some)
            .map_err(|_| {
                Error::Config(format!(
                    "Invalid GITHUB_REPOSITORY format: {}",
                    repository
                ))
            }),
        _ => Ok(None),
    }
}
