//! Error types for the fetch module.
//!
//! Every way a Transfer can fail maps to one variant here, so callers can
//! tell a bad URL from a broken connection from a full disk.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a resource to disk.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source is not a syntactically valid absolute URL.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The URL path has no final segment to name the file after.
    #[error("cannot derive a file name from {url}: path has no final segment")]
    EmptyFileName {
        /// The URL whose path ends in `/` or is empty.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, interrupted body, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Staging file could not be created or written.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Staging file could not be renamed to its final name.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        /// Staging path.
        from: PathBuf,
        /// Final path.
        to: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates an empty file name error.
    pub fn empty_file_name(url: impl Into<String>) -> Self {
        Self::EmptyFileName { url: url.into() }
    }

    /// Creates a network error, promoting client timeouts to [`FetchError::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
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

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a rename error.
    pub fn rename(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Rename {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Returns true when the failure happened on the wire rather than locally.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}

// No `From<reqwest::Error>` or `From<std::io::Error>`: every variant needs the
// url or path the source error lacks, so callers go through the constructors.
