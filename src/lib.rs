//! Grabber Core Library
//!
//! Downloads resources into a local directory, either a single URL or every
//! matching link found on one web page.
//!
//! # Architecture
//!
//! - [`fetch`] - streaming download with byte progress and atomic commit
//! - [`crawl`] - pluggable page-to-links extraction

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crawl;
pub mod fetch;
mod user_agent;

// Re-export commonly used types
pub use crawl::{CrawlError, HtmlLinkSource, LinkFilter, LinkSource, Selector, collect_links};
pub use fetch::{
    BatchSummary, ConsoleProgress, FetchError, Fetcher, ProgressObserver, Transfer, TransferState,
    derive_final_name, run_batch,
};
