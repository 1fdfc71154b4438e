//! The Transfer entity: one request-to-local-file download.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use super::error::FetchError;
use super::filename::{final_name_from_url, staging_path};

/// Lifecycle state of a [`Transfer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Bytes are still streaming into the staging file.
    InProgress,
    /// The staging file was renamed to its final name.
    Committed,
    /// The transfer aborted; nothing was published.
    Failed,
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InProgress => "in-progress",
            Self::Committed => "committed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One in-progress (or finished) download.
///
/// Created when a fetch is requested and mutated only by the byte-counting
/// write path; ends either committed or failed.
#[derive(Debug, Clone)]
pub struct Transfer {
    source: Url,
    destination_dir: PathBuf,
    final_name: String,
    bytes_transferred: u64,
    state: TransferState,
}

impl Transfer {
    /// Starts a transfer of `source` into `destination_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for an unparseable source and
    /// [`FetchError::EmptyFileName`] when no final name can be derived.
    pub fn new(source: &str, destination_dir: &Path) -> Result<Self, FetchError> {
        let url = Url::parse(source).map_err(|_| FetchError::invalid_url(source))?;
        let final_name = final_name_from_url(&url)?;
        Ok(Self {
            source: url,
            destination_dir: destination_dir.to_path_buf(),
            final_name,
            bytes_transferred: 0,
            state: TransferState::InProgress,
        })
    }

    /// The resource being fetched.
    #[must_use]
    pub fn source(&self) -> &Url {
        &self.source
    }

    /// Directory the file is written into.
    #[must_use]
    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Name the file is published under.
    #[must_use]
    pub fn final_name(&self) -> &str {
        &self.final_name
    }

    /// Bytes written to the staging file so far.
    #[must_use]
    pub fn bytes_transferred(&self) -> u64 {
        self.bytes_transferred
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// `destination_dir/final_name.tmp`
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        staging_path(&self.destination_dir, &self.final_name)
    }

    /// `destination_dir/final_name`
    #[must_use]
    pub fn final_path(&self) -> PathBuf {
        self.destination_dir.join(&self.final_name)
    }

    pub(crate) fn record(&mut self, n: u64) {
        self.bytes_transferred = self.bytes_transferred.saturating_add(n);
    }

    pub(crate) fn commit(&mut self) {
        self.state = TransferState::Committed;
    }

    pub(crate) fn fail(&mut self) {
        self.state = TransferState::Failed;
    }
}
