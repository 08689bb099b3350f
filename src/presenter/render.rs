//! Markup for one feed entry.

use crate::models::{ArticleRecord, SummaryStatus};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt;

/// Shown in the panel of a record that carries no summary text at all.
pub const EMPTY_SUMMARY: &str = "ごめん、この内容はまだAI要約されていません。";

/// A record prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArticle {
    pub id: String,
    pub title: String,
    pub link: String,
    pub date_line: String,
    pub status: SummaryStatus,
    pub summary: String,
}

impl RenderedArticle {
    pub fn from_record(record: &ArticleRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            link: record.link.clone(),
            date_line: format!("{} - {}", record.pub_date, record.source),
            status: record.status(),
            summary: if record.summary.trim().is_empty() {
                EMPTY_SUMMARY.to_string()
            } else {
                record.summary.clone()
            },
        }
    }

    /// Element id of the summary panel.
    pub fn panel_id(&self) -> String {
        format!("summary-{}", self.id)
    }

    pub fn toggle_label(&self) -> &'static str {
        match self.status {
            SummaryStatus::Ok => "🐢 要約を表示/非表示",
            SummaryStatus::Skipped | SummaryStatus::Error => "❌ 要約待ち",
        }
    }

    fn data_status(&self) -> &'static str {
        match self.status {
            SummaryStatus::Ok => "has-summary",
            SummaryStatus::Skipped => "no-summary",
            SummaryStatus::Error => "failed",
        }
    }

    /// The `<li>` for this entry; the summary panel is hidden unless `expanded`.
    pub fn to_html(&self, expanded: bool) -> String {
        let panel_class = if expanded { "summary-box" } else { "summary-box hidden" };
        format!(
            r#"<li class="article-item">
  <a href="{link}" target="_blank" rel="noopener noreferrer" class="article-link">{title}</a>
  <span class="article-date">{date_line}</span>
  <button class="kame-button" data-status="{data_status}" aria-controls="{panel_id}" aria-expanded="{expanded}">{label}</button>
  <div id="{panel_id}" class="{panel_class}">
    <div class="summary">{summary}</div>
  </div>
</li>"#,
            link = encode_double_quoted_attribute(&self.link),
            title = encode_text(&self.title),
            date_line = encode_text(&self.date_line),
            data_status = self.data_status(),
            panel_id = encode_double_quoted_attribute(&self.panel_id()),
            expanded = expanded,
            label = self.toggle_label(),
            panel_class = panel_class,
            summary = encode_text(&self.summary),
        )
    }
}

impl fmt::Display for RenderedArticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "    {}", self.date_line)?;
        writeln!(f, "    {}", self.link)?;
        write!(f, "    [{}]", self.toggle_label())
    }
}
