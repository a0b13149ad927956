//! GATs trait definitions for the paged-fetch seams

use crate::error::Result;
use crate::pagination::Page;
use crate::types::{PullRequestSummary, RepoRef};
use std::future::Future;

/// One paged collection, fetched a page at a time
///
/// Pages are numbered from 1. Implementors return the page items together
/// with the pagination links the server attached to that page.
pub trait PageSource {
    /// Element type of the collection
    type Item;

    /// GAT for a single page request
    type PageFuture<'a>: Future<Output = Result<Page<Self::Item>>> + Send + 'a
    where
        Self: 'a;

    /// Request page `page` (1-based)
    fn fetch_page(&self, page: u32) -> Self::PageFuture<'_>;
}

/// Authenticated "list open pull requests" operation
pub trait PullRequestLister {
    /// GAT for a single listing request
    type ListFuture<'a>: Future<Output = Result<Page<PullRequestSummary>>> + Send + 'a
    where
        Self: 'a;

    /// List page `page` of the open pull requests of `repo`
    fn list_open_pulls<'a>(&'a self, repo: &'a RepoRef, page: u32) -> Self::ListFuture<'a>;
}

/// The open pull requests of one repository, as a [`PageSource`]
pub struct OpenPullRequests<'r, L> {
    lister: &'r L,
    repo: &'r RepoRef,
}

impl<'r, L> OpenPullRequests<'r, L> {
    /// Bind a lister to a repository
    pub fn new(lister: &'r L, repo: &'r RepoRef) -> Self {
        Self { lister, repo }
    }
}

impl<'r, L: PullRequestLister> PageSource for OpenPullRequests<'r, L> {
    type Item = PullRequestSummary;

    type PageFuture<'a>
        = L::ListFuture<'a>
    where
        Self: 'a;

    fn fetch_page(&self, page: u32) -> Self::PageFuture<'_> {
        self.lister.list_open_pulls(self.repo, page)
    }
}
