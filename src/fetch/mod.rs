//! Streaming download with progress and atomic commit.
//!
//! A [`Fetcher`] moves one resource from an HTTP(S) URL into a directory:
//!
//! - bytes stream into `<name>.tmp` through a bounded buffer
//! - every chunk is reported to a [`ProgressObserver`]
//! - the staging file is renamed to `<name>` only once the body is complete
//! - on failure the staging file is removed and nothing is published
//!
//! # Example
//!
//! ```no_run
//! use grabber_core::fetch::{ConsoleProgress, Fetcher};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new();
//! let mut progress = ConsoleProgress::new();
//! fetcher
//!     .fetch_with_observer("https://example.com/img/42.png", Path::new("/tmp/out"), &mut progress)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod batch;
pub mod constants;
mod error;
mod fetcher;
mod filename;
mod progress;
mod transfer;

pub use batch::{BatchFailure, BatchSummary, run_batch};
pub use error::FetchError;
pub use fetcher::{Fetcher, build_client};
pub use filename::{derive_final_name, final_name_from_url, staging_path};
pub use progress::{ConsoleProgress, ProgressCounter, ProgressObserver, humanize_bytes};
pub use transfer::{Transfer, TransferState};
