//! The collector pipeline: fetch, extract, summarize, persist.
//!
//! Articles are processed strictly one after another. Each article's body is
//! fetched and extracted before its summary is requested, and the next
//! article does not start until the current one is done. A failure in any
//! step only affects that article's record; the batch always produces one
//! record per candidate, in order.

use crate::api::Summarize;
use crate::config::CollectorConfig;
use crate::extract::{fetch_article_body, PageFetcher};
use crate::models::{ArticleRecord, ArticleSource, Summary, SummaryStatus};
use crate::outputs::json;
use crate::sources::ArticleFeed;
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{error, info, instrument, warn};

/// Tally of one collector run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectReport {
    pub total: usize,
    pub summarized: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CollectReport {
    fn tally(records: &[ArticleRecord]) -> Self {
        let mut report = CollectReport {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            match record.status() {
                SummaryStatus::Ok => report.summarized += 1,
                SummaryStatus::Skipped => report.skipped += 1,
                SummaryStatus::Error => report.failed += 1,
            }
        }
        report
    }
}

/// Drives the per-article pipeline.
#[derive(Debug)]
pub struct Collector<F, S> {
    fetcher: F,
    summarizer: S,
    min_body_chars: usize,
    max_body_chars: usize,
}

impl<F, S> Collector<F, S>
where
    F: PageFetcher,
    S: Summarize,
{
    pub fn new(fetcher: F, summarizer: S, config: &CollectorConfig) -> Self {
        Self {
            fetcher,
            summarizer,
            min_body_chars: config.min_body_chars,
            max_body_chars: config.max_body_chars,
        }
    }

    /// Produce the record for one article.
    #[instrument(level = "info", skip_all, fields(link = %article.link))]
    pub async fn process(&self, article: &ArticleSource) -> ArticleRecord {
        info!(title = %article.title, "Processing article");

        let body = fetch_article_body(&self.fetcher, &article.link, self.max_body_chars).await;

        let summary = match body {
            Some(body) if body.chars().count() > self.min_body_chars => {
                match self.summarizer.summarize(&article.title, &body).await {
                    Ok(text) => Summary::Ok(text),
                    Err(e) => Summary::Failed(e.to_string()),
                }
            }
            Some(body) => {
                info!(chars = body.chars().count(), "Article text too short; skipping summary");
                Summary::Skipped
            }
            None => {
                info!("No article text; skipping summary");
                Summary::Skipped
            }
        };

        if let Summary::Failed(reason) = &summary {
            warn!(%reason, "Summarization failed; using fallback text");
        }

        let record = ArticleRecord::new(article, summary);
        info!(status = ?record.status(), "Finished article");
        record
    }

    /// Process every article in order, one at a time.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn collect(&self, articles: &[ArticleSource]) -> Vec<ArticleRecord> {
        stream::iter(articles)
            .then(|article| self.process(article))
            .collect()
            .await
    }
}

/// Run the collector end to end: load candidates, build records, write the artifact.
///
/// Only a failure to obtain the candidate list or to write the artifact is
/// returned as an error; per-article failures are folded into the records.
pub async fn run<A, F, S>(
    feed: &A,
    collector: &Collector<F, S>,
    output: &str,
) -> Result<CollectReport, Box<dyn Error>>
where
    A: ArticleFeed,
    F: PageFetcher,
    S: Summarize,
{
    let articles = feed.fetch_candidate_articles().await?;
    info!(count = articles.len(), "Loaded candidate articles");

    let records = collector.collect(&articles).await;
    let report = CollectReport::tally(&records);
    info!(
        total = report.total,
        summarized = report.summarized,
        skipped = report.skipped,
        failed = report.failed,
        "Completed article processing"
    );

    if let Err(e) = json::write_artifact(&records, output).await {
        error!(path = %output, error = %e, "Failed to write data.json");
        return Err(e);
    }
    info!(path = %output, count = records.len(), "Wrote all articles");

    Ok(report)
}
