//! Streaming fetch with progress reporting and atomic commit.
//!
//! Bytes are written to `<name>.tmp` as they arrive and the file is renamed
//! to `<name>` only after the body has been fully consumed and flushed, so a
//! file under the final name is always complete.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use super::progress::{ConsoleProgress, ProgressObserver};
use super::transfer::Transfer;
use crate::user_agent;

/// Downloads resources into a directory, one transfer at a time.
///
/// Create once and reuse; the inner client pools connections.
///
/// # Example
///
/// ```no_run
/// use grabber_core::fetch::Fetcher;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new();
/// let transfer = fetcher.fetch("https://example.com/pic.jpg", Path::new("./out")).await?;
/// println!("{} bytes", transfer.bytes_transferred());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Creates a fetcher with default timeouts (30s connect, 5min read).
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the HTTP client cannot be constructed
    /// (for example, no TLS backend is available).
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = build_client(connect_timeout_secs, read_timeout_secs)?;
        Ok(Self { client })
    }

    /// Wraps an existing client, e.g. one shared with a link source.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `source` into `destination_dir`, drawing progress on the console.
    ///
    /// # Errors
    ///
    /// See [`fetch_with_observer`](Self::fetch_with_observer).
    pub async fn fetch(
        &self,
        source: &str,
        destination_dir: &Path,
    ) -> Result<Transfer, FetchError> {
        let mut progress = ConsoleProgress::new();
        self.fetch_with_observer(source, destination_dir, &mut progress)
            .await
    }

    /// Fetches `source` into `destination_dir`, reporting every chunk to `observer`.
    ///
    /// The destination directory must already exist. On success the returned
    /// transfer is committed and its file is in place under the final name.
    /// On failure nothing is published and the staging file is removed.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`] / [`FetchError::EmptyFileName`] before any file is touched
    /// - [`FetchError::Io`] if the staging file cannot be created or written
    /// - [`FetchError::Network`], [`FetchError::Timeout`], [`FetchError::HttpStatus`]
    ///   if the request or body stream fails
    /// - [`FetchError::Rename`] if the final rename fails
    #[instrument(skip(self, observer), fields(source = %source))]
    pub async fn fetch_with_observer(
        &self,
        source: &str,
        destination_dir: &Path,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Transfer, FetchError> {
        let mut transfer = Transfer::new(source, destination_dir)?;
        let staging = transfer.staging_path();
        debug!(staging = %staging.display(), "opening staging file");

        let file = File::create(&staging)
            .await
            .map_err(|e| FetchError::io(&staging, e))?;

        let streamed = self.stream_to_staging(&mut transfer, file, observer).await;
        observer.finish();

        if let Err(error) = streamed {
            transfer.fail();
            discard_staging(&staging).await;
            warn!(
                error = %error,
                bytes = transfer.bytes_transferred(),
                "transfer failed"
            );
            return Err(error);
        }

        let final_path = transfer.final_path();
        if let Err(e) = tokio::fs::rename(&staging, &final_path).await {
            transfer.fail();
            discard_staging(&staging).await;
            return Err(FetchError::rename(staging, final_path, e));
        }
        transfer.commit();

        info!(
            path = %final_path.display(),
            bytes = transfer.bytes_transferred(),
            "transfer committed"
        );
        Ok(transfer)
    }

    /// Streams the response body into the staging file, returning once flushed.
    async fn stream_to_staging(
        &self,
        transfer: &mut Transfer,
        file: File,
        observer: &mut dyn ProgressObserver,
    ) -> Result<(), FetchError> {
        let url = transfer.source().as_str().to_string();
        let staging = transfer.staging_path();

        let response = self
            .client
            .get(transfer.source().clone())
            .send()
            .await
            .map_err(|e| FetchError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(&url, status.as_u16()));
        }
        debug!(status = status.as_u16(), content_length = ?response.content_length(), "response received");

        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| FetchError::network(&url, e))?;

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(&staging, e))?;

            let n = chunk.len() as u64;
            transfer.record(n);
            observer.on_bytes(n);
        }

        writer
            .flush()
            .await
            .map_err(|e| FetchError::io(&staging, e))?;

        Ok(())
    }
}

/// Builds the shared HTTP client used for both pages and resources.
///
/// # Errors
///
/// Returns the reqwest builder error.
pub fn build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(read_timeout_secs))
        .gzip(true)
        .user_agent(user_agent::default_user_agent())
        .build()
}

async fn discard_staging(staging: &Path) {
    match tokio::fs::remove_file(staging).await {
        Ok(()) => debug!(path = %staging.display(), "removed staging file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %staging.display(), error = %e, "could not remove staging file"),
    }
}
