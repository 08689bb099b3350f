//! Where the collector gets its candidate articles from.
//!
//! [`ArticleFeed`] is the seam a real feed integration plugs into. Two
//! implementations ship today:
//!
//! | Feed | Origin |
//! |------|--------|
//! | [`StaticFeed`] | Built-in three-article list, dated relative to now |
//! | [`FileFeed`] | YAML or JSON list of articles on disk |

use crate::models::ArticleSource;
use chrono::{Duration, Utc};
use std::error::Error;
use tracing::{info, instrument};
use url::Url;

/// A provider of candidate articles.
pub trait ArticleFeed {
    async fn fetch_candidate_articles(&self) -> Result<Vec<ArticleSource>, Box<dyn Error>>;
}

/// The built-in list of local news articles.
#[derive(Debug, Default)]
pub struct StaticFeed;

impl ArticleFeed for StaticFeed {
    async fn fetch_candidate_articles(&self) -> Result<Vec<ArticleSource>, Box<dyn Error>> {
        let now = Utc::now();
        Ok(vec![
            ArticleSource {
                title: "嘉手納基地、F-15退役後の新たな動向と訓練予定".to_string(),
                link: "https://www.example.com/kadena-article-1".to_string(),
                source: "防衛局発表".to_string(),
                pub_date: now - Duration::hours(1),
            },
            ArticleSource {
                title: "沖縄市周辺自治体、騒音問題への対応強化を表明".to_string(),
                link: "https://www.example.com/okinawa-city-noise".to_string(),
                source: "地元メディア".to_string(),
                pub_date: now - Duration::days(1),
            },
            ArticleSource {
                title: "米軍普天間基地、新型輸送機の試験飛行を実施".to_string(),
                link: "https://www.example.com/futenma-test-flight".to_string(),
                source: "速報ニュース".to_string(),
                pub_date: now - Duration::days(2),
            },
        ])
    }
}

/// Articles listed in a YAML or JSON file.
///
/// ```yaml
/// - title: 嘉手納基地の訓練予定
///   link: https://www.example.com/kadena-article-1
///   source: 防衛局発表
///   pubDate: 2025-05-06T09:00:00Z
/// ```
#[derive(Debug)]
pub struct FileFeed {
    path: String,
}

impl FileFeed {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl ArticleFeed for FileFeed {
    #[instrument(level = "info", skip_all, fields(path = %self.path))]
    async fn fetch_candidate_articles(&self) -> Result<Vec<ArticleSource>, Box<dyn Error>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let articles = parse_article_list(&raw)?;
        info!(count = articles.len(), "Loaded article list");
        Ok(articles)
    }
}

/// Parse a YAML (or JSON) article list and check every link is an absolute URL.
pub fn parse_article_list(raw: &str) -> Result<Vec<ArticleSource>, Box<dyn Error>> {
    let articles: Vec<ArticleSource> = serde_yaml::from_str(raw)?;
    for article in &articles {
        let url = Url::parse(&article.link)
            .map_err(|e| format!("invalid link {:?}: {}", article.link, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported link scheme {:?}", article.link).into());
        }
    }
    Ok(articles)
}
