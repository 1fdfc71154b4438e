//! Sequential batch of transfers with per-transfer failure isolation.

use std::path::Path;

use tracing::{info, warn};

use super::error::FetchError;
use super::fetcher::Fetcher;
use super::progress::ProgressObserver;

/// A transfer that did not complete.
#[derive(Debug)]
pub struct BatchFailure {
    /// Source URL of the failed transfer.
    pub url: String,
    /// Why it failed.
    pub error: FetchError,
}

/// Outcome of [`run_batch`].
#[derive(Debug, Default)]
pub struct BatchSummary {
    completed: usize,
    bytes: u64,
    failures: Vec<BatchFailure>,
}

impl BatchSummary {
    /// Number of committed transfers.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Number of failed transfers.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Total bytes across committed transfers.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Every failed transfer, in run order.
    #[must_use]
    pub fn failures(&self) -> &[BatchFailure] {
        &self.failures
    }

    /// True when no transfer failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetches each URL in turn into `destination_dir`.
///
/// Each transfer gets a fresh observer from `make_observer`. A failed transfer
/// is logged and recorded; the next one still runs.
pub async fn run_batch<F, O>(
    fetcher: &Fetcher,
    urls: &[String],
    destination_dir: &Path,
    mut make_observer: F,
) -> BatchSummary
where
    F: FnMut() -> O,
    O: ProgressObserver,
{
    let mut summary = BatchSummary::default();

    for (index, url) in urls.iter().enumerate() {
        info!(index = index + 1, total = urls.len(), url = %url, "fetching");
        let mut observer = make_observer();
        match fetcher
            .fetch_with_observer(url, destination_dir, &mut observer)
            .await
        {
            Ok(transfer) => {
                summary.completed += 1;
                summary.bytes = summary.bytes.saturating_add(transfer.bytes_transferred());
            }
            Err(error) => {
                warn!(url = %url, error = %error, "skipping failed transfer");
                summary.failures.push(BatchFailure {
                    url: url.clone(),
                    error,
                });
            }
        }
    }

    summary
}
