//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use grabber_core::crawl::Selector;
use grabber_core::fetch::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Grab resources from a web page into a local directory.
///
/// With just a URL, the resource at that URL is downloaded. With --select,
/// the URL is treated as a page: matching links are collected and each one
/// is downloaded in turn.
#[derive(Parser, Debug)]
#[command(name = "grabber")]
#[command(author, version, about)]
pub struct Args {
    /// Resource URL, or page URL when --select is given
    pub url: String,

    /// Directory to save into (created if missing)
    pub directory: PathBuf,

    /// Crawl the page and collect links with a tag[attr] selector (e.g. a[href], img[src])
    #[arg(short = 's', long)]
    pub select: Option<Selector>,

    /// Only keep crawled links containing this text (e.g. /photo/)
    #[arg(short = 'm', long = "match", requires = "select")]
    pub pattern: Option<String>,

    /// HTTP connect timeout in seconds
    #[arg(long, default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// HTTP read timeout in seconds
    #[arg(long, default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=86400))]
    pub read_timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
