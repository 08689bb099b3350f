//! # Kame News
//!
//! A small local-news pipeline in two halves that share one JSON file.
//!
//! ## Features
//!
//! - **collect**: fetches each article, extracts the page text, asks a
//!   Gemini model for a neutral three-line summary, and writes `data.json`
//! - **present**: loads `data.json` (from disk or a URL), orders it newest
//!   first, and reveals it in batches as the viewer scrolls, with a
//!   collapsible summary per entry
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... kame_news collect -o ./public/data.json
//! kame_news present --data-url ./public/data.json --html feed.html
//! ```
//!
//! ## Architecture
//!
//! The collector follows a linear pipeline:
//! 1. **Candidates**: Read the article list from an [`sources::ArticleFeed`]
//! 2. **Fetching**: Download each page and extract its text (one at a time)
//! 3. **Summarizing**: One model request per article with enough text
//! 4. **Output**: Overwrite the JSON artifact

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod collector;
mod config;
mod extract;
mod models;
mod outputs;
mod presenter;
mod sources;
mod utils;

use api::GeminiClient;
use cli::{Cli, CollectArgs, Command};
use collector::Collector;
use config::CollectorConfig;
use extract::HttpFetcher;
use sources::{FileFeed, StaticFeed};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    debug!(?args.command, "Parsed CLI arguments");

    match args.command {
        Command::Collect(collect_args) => collect(collect_args).await,
        Command::Present(present_args) => presenter::run(&present_args).await,
    }
}

async fn collect(args: CollectArgs) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("news data generation starting up");

    let config = match CollectorConfig::from_args(&args).await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Cannot start collector");
            return Err(e.into());
        }
    };
    debug!(?config, "Resolved configuration");

    let client = Client::builder()
        .user_agent(concat!("kame_news/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let summarizer = GeminiClient::new(client.clone(), &config.api_base, &config.api_key, &config.model);
    let collector = Collector::new(HttpFetcher::new(client), summarizer, &config);

    let report = match config.articles.as_deref() {
        Some(path) => collector::run(&FileFeed::new(path), &collector, &config.output).await?,
        None => collector::run(&StaticFeed, &collector, &config.output).await?,
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = report.total,
        summarized = report.summarized,
        path = %config.output,
        "Execution complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_collect_without_credential_fails_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("data.json");

        for api_key in [None, Some("   ".to_string())] {
            let args = CollectArgs {
                api_key,
                output: Some(output.to_string_lossy().into_owned()),
                ..Default::default()
            };

            assert!(collect(args).await.is_err());
            assert!(!output.exists());
        }
    }
}
