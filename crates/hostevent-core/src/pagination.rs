//! Link-header pagination and the multi-page fetch loop
//!
//! GitHub paginates list endpoints with an RFC 8288 `Link` header:
//!
//! ```text
//! <https://api.github.com/repositories/1/pulls?page=2>; rel="next",
//! <https://api.github.com/repositories/1/pulls?page=5>; rel="last"
//! ```
//!
//! The `last` link on the first page tells us how many pages exist; the
//! `next` link on each page tells us whether the server still has more.

use crate::error::Result;
use crate::traits::PageSource;
use reqwest::header::{HeaderMap, LINK};
use reqwest::Url;

/// Pagination hints attached to one response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageLinks {
    /// Page number of the `rel="next"` link
    pub next: Option<u32>,
    /// Page number of the `rel="last"` link
    pub last: Option<u32>,
}

impl PageLinks {
    /// Parse a `Link` header value
    ///
    /// Never fails: entries without a usable `page` query parameter are
    /// treated as absent.
    pub fn parse(header: &str) -> Self {
        let mut links = PageLinks::default();
        let mut rest = header;

        while let Some(start) = rest.find('<') {
            let after = &rest[start + 1..];
            let Some(end) = after.find('>') else {
                break;
            };
            let target = &after[..end];
            let tail = &after[end + 1..];

            // Commas may appear in the target URI or inside quoted parameters
            let params_end = find_unquoted(tail, b',').unwrap_or(tail.len());
            let params = &tail[..params_end];
            rest = &tail[params_end..];

            let page = page_param(target);
            for rel in rel_values(params) {
                if rel.eq_ignore_ascii_case("next") {
                    links.next = links.next.or(page);
                } else if rel.eq_ignore_ascii_case("last") {
                    links.last = links.last.or(page);
                }
            }
        }

        links
    }

    /// Extract links from response headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// Total page count announced by the server, if any
    #[inline]
    pub fn total_pages(&self) -> Option<u32> {
        self.last
    }
}

/// `rel` values of one link entry (`rel="next last"` yields two)
fn rel_values(params: &str) -> impl Iterator<Item = &str> {
    split_unquoted(params, b';')
        .filter_map(|p| p.split_once('='))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
        .flat_map(|(_, value)| value.trim().trim_matches('"').split_ascii_whitespace())
}

/// Byte offset of the first `needle` outside a double-quoted string
fn find_unquoted(s: &str, needle: u8) -> Option<usize> {
    let mut quoted = false;
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' if quoted => escaped = true,
            b'"' => quoted = !quoted,
            _ if b == needle && !quoted => return Some(i),
            _ => {}
        }
    }
    None
}

fn split_unquoted(s: &str, sep: u8) -> impl Iterator<Item = &str> {
    let mut rest = Some(s);
    std::iter::from_fn(move || {
        let current = rest?;
        match find_unquoted(current, sep) {
            Some(i) => {
                rest = Some(&current[i + 1..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Positive `page` query parameter of a link target
fn page_param(target: &str) -> Option<u32> {
    // Relative targets are legal in RFC 8288; resolve them against a dummy base
    let base = Url::parse("https://api.github.com/").ok()?;
    let url = base.join(target.trim()).ok()?;
    let page = url
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse::<u32>().ok())?;
    (page > 0).then_some(page)
}

/// One page of a collection plus its pagination hints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page, in server order
    pub items: Vec<T>,
    /// Links the server attached to this page
    pub links: PageLinks,
}

impl<T> Page<T> {
    /// Create a page
    pub fn new(items: Vec<T>, links: PageLinks) -> Self {
        Self { items, links }
    }

    /// A page with no pagination links (the whole collection)
    pub fn single(items: Vec<T>) -> Self {
        Self::new(items, PageLinks::default())
    }
}

/// Fetch every page of `source` and concatenate the items in page order
///
/// Page 1 is always requested. Its `last` link caps the page count; a missing
/// or unusable hint means only page 1 exists. Later pages are requested one
/// at a time while the most recent response still links to a next page
/// beyond the one just fetched. Any failed request aborts the whole fetch.
pub async fn fetch_all<S>(source: &S) -> Result<Vec<S::Item>>
where
    S: PageSource + ?Sized,
{
    let first = source.fetch_page(1).await?;
    let total = first.links.total_pages().unwrap_or(1);

    tracing::debug!(page = 1, items = first.items.len(), total, "fetched page");

    let mut items = first.items;
    let mut next = first.links.next;
    let mut fetched = 1u32;

    while fetched < total && next.is_some_and(|n| n > fetched) {
        let page_no = fetched + 1;
        let page = source.fetch_page(page_no).await?;

        tracing::debug!(page = page_no, items = page.items.len(), "fetched page");

        items.extend(page.items);
        next = page.links.next;
        fetched = page_no;
    }

    tracing::debug!(pages = fetched, items = items.len(), "pagination complete");

    Ok(items)
}
