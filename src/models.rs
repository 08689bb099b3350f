//! Data models shared by the collector and the presenter.
//!
//! - [`ArticleSource`]: a candidate article handed to the collector
//! - [`ArticleRecord`]: one entry of the `data.json` artifact
//! - [`SummaryStatus`]: whether a record carries a real summary
//!
//! The artifact uses camelCase field names (`pubDate`, `summaryStatus`) so
//! that files written by older generators keep loading.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Text stored in `summary` whenever no model output is available.
pub const FAILED_SUMMARY: &str = "AI要約生成に失敗しました。";

/// Phrase older artifacts used for articles that were never summarized.
pub const NOT_SUMMARIZED_MARKER: &str = "まだ要約されていません";

const FAILED_MARKER: &str = "要約生成に失敗";

/// A candidate article handed to the collector.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSource {
    /// Headline shown to readers.
    pub title: String,
    /// Absolute URL, unique per article.
    pub link: String,
    /// Publisher label.
    pub source: String,
    /// Publication instant.
    pub pub_date: DateTime<Utc>,
}

/// Outcome of the summarization step for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    /// `summary` holds model output.
    Ok,
    /// The body was missing or too short, so no request was made.
    Skipped,
    /// The request was made and failed.
    Error,
}

impl SummaryStatus {
    /// Infer a status from summary text written without an explicit tag.
    pub fn infer_from_text(summary: &str) -> Self {
        let trimmed = summary.trim();
        if trimmed.is_empty() || trimmed.contains(NOT_SUMMARIZED_MARKER) {
            SummaryStatus::Skipped
        } else if trimmed.contains(FAILED_MARKER) {
            SummaryStatus::Error
        } else {
            SummaryStatus::Ok
        }
    }
}

/// The result of summarizing one article, before it is flattened into a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    Ok(String),
    Skipped,
    Failed(String),
}

/// One entry of the `data.json` artifact.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Opaque, markup-safe identifier derived from `link`.
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub link: String,
    /// Publication date in `YYYY/MM/DD` form, no time component.
    pub pub_date: String,
    pub source: String,
    /// Model output, or [`FAILED_SUMMARY`] when there is none.
    pub summary: String,
    #[serde(default)]
    pub summary_status: Option<SummaryStatus>,
}

impl ArticleRecord {
    /// Build a record from its source article and the summarization outcome.
    pub fn new(source: &ArticleSource, summary: Summary) -> Self {
        let (text, status) = match summary {
            Summary::Ok(text) if !text.trim().is_empty() => {
                (text.trim().to_string(), SummaryStatus::Ok)
            }
            Summary::Ok(_) | Summary::Failed(_) => (FAILED_SUMMARY.to_string(), SummaryStatus::Error),
            Summary::Skipped => (FAILED_SUMMARY.to_string(), SummaryStatus::Skipped),
        };

        Self {
            id: record_id(&source.link),
            title: source.title.clone(),
            link: source.link.clone(),
            pub_date: format_pub_date(&source.pub_date),
            source: source.source.clone(),
            summary: text,
            summary_status: Some(status),
        }
    }

    /// The explicit status, falling back to the summary text for untagged records.
    pub fn status(&self) -> SummaryStatus {
        self.summary_status
            .unwrap_or_else(|| SummaryStatus::infer_from_text(&self.summary))
    }

    /// Fill in fields that artifacts from older generators leave out.
    pub fn normalize(&mut self) {
        if self.id.is_empty() {
            self.id = record_id(&self.link);
        }
        if self.summary_status.is_none() {
            self.summary_status = Some(SummaryStatus::infer_from_text(&self.summary));
        }
    }
}

/// Stable identifier for a record: `a-` followed by 12 hex chars of SHA-256(link).
pub fn record_id(link: &str) -> String {
    let digest = Sha256::digest(link.as_bytes());
    format!("a-{}", &hex::encode(digest)[..12])
}

/// Format an instant as the local calendar date `YYYY/MM/DD`.
pub fn format_pub_date(instant: &DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y/%m/%d")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn source() -> ArticleSource {
        ArticleSource {
            title: "嘉手納基地の訓練予定".to_string(),
            link: "https://www.example.com/kadena-article-1".to_string(),
            source: "防衛局発表".to_string(),
            pub_date: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_copies_source_fields() {
        let record = ArticleRecord::new(&source(), Summary::Ok("  要約です。\n".to_string()));
        assert_eq!(record.title, "嘉手納基地の訓練予定");
        assert_eq!(record.link, "https://www.example.com/kadena-article-1");
        assert_eq!(record.source, "防衛局発表");
        assert_eq!(record.summary, "要約です。");
        assert_eq!(record.status(), SummaryStatus::Ok);
    }

    #[test]
    fn test_record_uses_sentinel_when_skipped_or_failed() {
        let skipped = ArticleRecord::new(&source(), Summary::Skipped);
        assert_eq!(skipped.summary, FAILED_SUMMARY);
        assert_eq!(skipped.status(), SummaryStatus::Skipped);

        let failed = ArticleRecord::new(&source(), Summary::Failed("timeout".to_string()));
        assert_eq!(failed.summary, FAILED_SUMMARY);
        assert_eq!(failed.status(), SummaryStatus::Error);
    }

    #[test]
    fn test_blank_model_output_is_an_error() {
        let record = ArticleRecord::new(&source(), Summary::Ok("   ".to_string()));
        assert_eq!(record.summary, FAILED_SUMMARY);
        assert_eq!(record.status(), SummaryStatus::Error);
    }

    #[test]
    fn test_pub_date_is_date_only() {
        let record = ArticleRecord::new(&source(), Summary::Skipped);
        assert_eq!(record.pub_date.len(), 10);
        assert!(record.pub_date.starts_with("2024/0"));
        assert!(!record.pub_date.contains(':'));
    }

    #[test]
    fn test_record_id_is_stable_and_markup_safe() {
        let a = record_id("https://x/1");
        let b = record_id("https://x/1");
        let c = record_id("https://x/2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 14);
        assert!(a.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-'));
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = ArticleRecord::new(&source(), Summary::Skipped);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"pubDate\""));
        assert!(json.contains("\"summaryStatus\":\"skipped\""));
    }

    #[test]
    fn test_legacy_record_is_normalized() {
        let json = r#"{
            "title": "B",
            "link": "https://x/2",
            "pubDate": "2024-06-01",
            "source": "S",
            "summary": "まだ要約されていません"
        }"#;
        let mut record: ArticleRecord = serde_json::from_str(json).unwrap();
        assert!(record.id.is_empty());
        record.normalize();
        assert_eq!(record.id, record_id("https://x/2"));
        assert_eq!(record.status(), SummaryStatus::Skipped);
    }

    #[test]
    fn test_infer_status_from_text() {
        assert_eq!(SummaryStatus::infer_from_text(""), SummaryStatus::Skipped);
        assert_eq!(SummaryStatus::infer_from_text(FAILED_SUMMARY), SummaryStatus::Error);
        assert_eq!(SummaryStatus::infer_from_text("ok."), SummaryStatus::Ok);
    }
}
