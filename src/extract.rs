//! Article body fetching and plain-text extraction.
//!
//! The extractor has no knowledge of any particular site: it takes the text
//! of the whole `<body>`, so navigation and footer text come along with the
//! article itself. The result is whitespace-collapsed and capped so that it
//! fits comfortably in a single prompt.

use crate::utils::truncate_chars;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// A fetched page: HTTP status plus the decoded body text.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

/// Anything that can GET a URL.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, Box<dyn Error>>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, Box<dyn Error>> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }
}

/// Extract the text of `<body>`, collapse whitespace, trim, and cap at `max_chars`.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let raw = document
        .select(&BODY)
        .flat_map(|body| body.text())
        .collect::<String>();
    let collapsed = WHITESPACE.replace_all(&raw, " ");
    truncate_chars(collapsed.trim(), max_chars).trim_end().to_string()
}

/// Fetch an article and return its extracted text.
///
/// Returns `None` when the request fails or the server answers with an
/// error status. Each failure is logged; nothing is retried.
#[instrument(level = "info", skip(fetcher))]
pub async fn fetch_article_body<F: PageFetcher>(
    fetcher: &F,
    url: &str,
    max_chars: usize,
) -> Option<String> {
    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            error!(error = %e, "Article fetch raised an error");
            return None;
        }
    };

    if !page.is_success() {
        warn!(status = page.status, "Article fetch returned an error status");
        return None;
    }

    let text = extract_text(&page.body, max_chars);
    info!(chars = text.chars().count(), "Extracted article text");
    debug!(preview = %crate::utils::truncate_for_log(&text, 120), "Article text preview");
    Some(text)
}
