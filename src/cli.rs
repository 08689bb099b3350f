//! Command-line interface definitions for Kame News.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Credentials and endpoints can also be provided via environment variables.

use crate::presenter::feed::DEFAULT_BATCH_SIZE;
use clap::{Args, Parser, Subcommand};

/// Command-line arguments for the Kame News application.
///
/// # Examples
///
/// ```sh
/// # Scrape and summarize the article list into ./data.json
/// GEMINI_API_KEY=... kame_news collect
///
/// # Page through a published artifact
/// kame_news present --data-url https://example.com/data.json --html feed.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch each article, summarize it, and write the JSON artifact
    Collect(CollectArgs),
    /// Load the JSON artifact and page through it as a scrolling feed
    Present(PresentArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CollectArgs {
    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Generative model identifier
    #[arg(long, env = "GEMINI_MODEL")]
    pub model: Option<String>,

    /// Base URL of the generative language API
    #[arg(long, env = "GEMINI_API_BASE")]
    pub api_base: Option<String>,

    /// Path of the JSON artifact to (over)write
    #[arg(short, long)]
    pub output: Option<String>,

    /// Optional YAML/JSON list of articles to process instead of the built-in list
    #[arg(short, long)]
    pub articles: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct PresentArgs {
    /// URL or file path of the JSON artifact
    #[arg(short, long, env = "KAME_DATA_URL", default_value = "data.json")]
    pub data_url: String,

    /// Height of the simulated viewport, in pixels
    #[arg(long, default_value_t = 800)]
    pub viewport_height: u32,

    /// Layout height of one rendered article, in pixels
    #[arg(long, default_value_t = 120)]
    pub item_height: u32,

    /// Number of articles revealed per load
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Simulated latency of each load, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub latency_ms: u64,

    /// Write an HTML snapshot of the page here on exit
    #[arg(long)]
    pub html: Option<String>,
}
