//! CLI entry point for the grabber tool.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use grabber_core::fetch::build_client;
use grabber_core::{
    ConsoleProgress, Fetcher, HtmlLinkSource, LinkFilter, collect_links, run_batch,
};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");
    run(args).await
}

async fn run(args: Args) -> Result<ExitCode> {
    if !args.quiet {
        let _ = writeln!(io::stdout(), "Download Started");
    }

    tokio::fs::create_dir_all(&args.directory)
        .await
        .with_context(|| format!("failed to create directory {}", args.directory.display()))?;

    let client = build_client(args.connect_timeout, args.read_timeout)
        .context("failed to build HTTP client")?;
    let fetcher = Fetcher::from_client(client.clone());

    let urls = if let Some(selector) = &args.select {
        let source = HtmlLinkSource::new(client);
        let filter = match args.pattern.as_deref() {
            Some(pattern) => LinkFilter::contains(pattern),
            None => LinkFilter::any(),
        };
        let links = collect_links(&source, &args.url, selector, &filter)
            .await
            .with_context(|| format!("failed to crawl {}", args.url))?;
        info!(links = links.len(), "links selected for download");
        links.into_iter().map(String::from).collect()
    } else {
        vec![args.url.clone()]
    };

    let quiet = args.quiet;
    let summary = run_batch(&fetcher, &urls, &args.directory, || {
        if quiet {
            ConsoleProgress::hidden()
        } else {
            ConsoleProgress::new()
        }
    })
    .await;

    for failure in summary.failures() {
        error!(url = %failure.url, error = %failure.error, "download failed");
    }

    info!(
        completed = summary.completed(),
        failed = summary.failed(),
        bytes = summary.bytes(),
        "run finished"
    );

    if args.select.is_some() && !args.quiet {
        let _ = writeln!(io::stdout(), "Grabbing completed!");
    }

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
