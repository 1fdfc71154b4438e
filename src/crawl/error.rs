//! Error types for page crawling.

use thiserror::Error;

/// Errors that can occur while collecting links from a page.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The page URL is not a valid absolute URL.
    #[error("invalid page URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The selector is not of the form `tag[attr]`.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector as given.
        selector: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The page could not be fetched.
    #[error("network error crawling {url}: {source}")]
    Network {
        /// The page URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The page request returned a non-success status.
    #[error("HTTP {status} crawling {url}")]
    HttpStatus {
        /// The page URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl CrawlError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an invalid selector error.
    pub fn invalid_selector(selector: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            reason,
        }
    }

    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}
