//! In-memory GitHub stand-in shared by the integration tests

#![allow(dead_code)]

use futures::future::BoxFuture;
use futures::FutureExt;
use hostevent_core::traits::PullRequestLister;
use hostevent_core::{
    Connector, Credential, Error, Page, PageLinks, PullRequestSummary, RepoRef, Result,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Serves a fixed list of open pull requests, GitHub-style paginated
#[derive(Clone, Default)]
pub struct FakeGitHub {
    pages: Arc<Vec<Vec<PullRequestSummary>>>,
    fail_on_page: Option<u32>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<(String, u32)>>>,
    tokens: Arc<Mutex<Vec<String>>>,
}

impl FakeGitHub {
    /// One page holding `pulls`
    pub fn with_pulls(pulls: Vec<PullRequestSummary>) -> Self {
        Self::with_pages(vec![pulls])
    }

    /// Explicit pages; an empty vector behaves like one empty page
    pub fn with_pages(pages: Vec<Vec<PullRequestSummary>>) -> Self {
        Self {
            pages: Arc::new(pages),
            ..Default::default()
        }
    }

    /// Fail when `page` is requested
    pub fn failing_on(mut self, page: u32) -> Self {
        self.fail_on_page = Some(page);
        self
    }

    /// Sleep before answering every request
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `(repo, page)` pairs requested so far
    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }

    /// Tokens the resolver connected with
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    fn page(&self, page: u32) -> Page<PullRequestSummary> {
        let total = self.pages.len().max(1) as u32;
        let items = self
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        let links = if page < total {
            PageLinks {
                next: Some(page + 1),
                last: Some(total),
            }
        } else {
            PageLinks::default()
        };
        Page::new(items, links)
    }
}

impl PullRequestLister for FakeGitHub {
    type ListFuture<'a>
        = BoxFuture<'a, Result<Page<PullRequestSummary>>>
    where
        Self: 'a;

    fn list_open_pulls<'a>(&'a self, repo: &'a RepoRef, page: u32) -> Self::ListFuture<'a> {
        async move {
            self.requests.lock().unwrap().push((repo.to_string(), page));

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if self.fail_on_page == Some(page) {
                return Err(Error::UpstreamFetch(format!("502 Bad Gateway on page {}", page)));
            }

            Ok(self.page(page))
        }
        .boxed()
    }
}

impl Connector for FakeGitHub {
    type Lister = FakeGitHub;

    fn connect(&self, credential: &Credential, _api_url: Option<&str>) -> Result<FakeGitHub> {
        self.tokens
            .lock()
            .unwrap()
            .push(credential.expose().to_string());
        Ok(self.clone())
    }
}

/// `{7,"sha1"}, {9,"sha2"}`
pub fn two_pulls() -> Vec<PullRequestSummary> {
    vec![
        PullRequestSummary::new(7, "sha1"),
        PullRequestSummary::new(9, "sha2"),
    ]
}
