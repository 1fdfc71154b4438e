//! Page crawling: collect resource links from a single web page.
//!
//! Crawling sits behind the [`LinkSource`] trait so the page-to-links step can
//! be swapped out (a browser-backed source, a fixture in tests) without
//! touching the fetch path. [`HtmlLinkSource`] is the built-in implementation:
//! it GETs the page and pulls attribute values out of the markup.

mod error;
mod selector;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument};
use url::Url;

pub use error::CrawlError;
pub use selector::Selector;

/// Turns a page into the resource URLs it references.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Returns the links selected by `selector` on `page_url`, in document order.
    async fn fetch_links(&self, page_url: &Url, selector: &Selector)
    -> Result<Vec<Url>, CrawlError>;
}

/// Link source that downloads the page over HTTP and scans its HTML.
#[derive(Debug, Clone)]
pub struct HtmlLinkSource {
    client: Client,
}

impl HtmlLinkSource {
    /// Creates a link source that uses `client` for page requests.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LinkSource for HtmlLinkSource {
    #[instrument(skip(self), fields(page = %page_url, selector = %selector))]
    async fn fetch_links(
        &self,
        page_url: &Url,
        selector: &Selector,
    ) -> Result<Vec<Url>, CrawlError> {
        let response = self
            .client
            .get(page_url.clone())
            .send()
            .await
            .map_err(|e| CrawlError::network(page_url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CrawlError::http_status(page_url.as_str(), status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| CrawlError::network(page_url.as_str(), e))?;
        debug!(page_bytes = html.len(), "page downloaded");

        let links = selector.extract_links(&html, page_url);
        info!(links = links.len(), "links extracted");
        Ok(links)
    }
}

/// Keeps links whose text contains a substring.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pattern: String,
}

impl LinkFilter {
    /// Filter that keeps links containing `pattern`. An empty pattern keeps everything.
    #[must_use]
    pub fn contains(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Filter that keeps every link.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// True when `url` passes the filter.
    #[must_use]
    pub fn matches(&self, url: &Url) -> bool {
        url.as_str().contains(&self.pattern)
    }

    /// Returns the links that pass, preserving order.
    #[must_use]
    pub fn apply(&self, links: Vec<Url>) -> Vec<Url> {
        links.into_iter().filter(|url| self.matches(url)).collect()
    }
}

/// Crawls `page_url` and returns the links that pass `filter`.
///
/// # Errors
///
/// Returns [`CrawlError::InvalidUrl`] if `page_url` does not parse, or
/// whatever the link source reports.
pub async fn collect_links(
    source: &dyn LinkSource,
    page_url: &str,
    selector: &Selector,
    filter: &LinkFilter,
) -> Result<Vec<Url>, CrawlError> {
    let page = Url::parse(page_url).map_err(|_| CrawlError::invalid_url(page_url))?;
    let links = source.fetch_links(&page, selector).await?;
    let total = links.len();
    let kept = filter.apply(links);
    debug!(total, kept = kept.len(), "links filtered");
    Ok(kept)
}
