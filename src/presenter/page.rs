//! The page the feed renders into.
//!
//! [`FeedView`] is everything the feed controller needs from its host page:
//! somewhere to append entries, a status line, a way to show a blocking
//! notice, summary panels to open and close, and the scroll geometry.
//! [`Page`] is an in-memory model of that page with a fixed per-entry
//! layout height, able to write itself out as a static HTML document.

use crate::presenter::feed::ScrollMetrics;
use crate::presenter::render::RenderedArticle;
use html_escape::encode_text;
use itertools::Itertools;
use std::collections::HashSet;

pub trait FeedView {
    /// Append entries after the ones already shown.
    fn append(&mut self, items: Vec<RenderedArticle>);
    fn set_status(&mut self, text: &str);
    /// Show a one-shot message the viewer has to acknowledge.
    fn notice(&mut self, text: &str);
    /// Flip the visibility of a summary panel and return the new state.
    fn toggle_panel(&mut self, id: &str) -> bool;
    fn metrics(&self) -> ScrollMetrics;
}

/// In-memory page: `#news-container` list plus `#status-message` line.
#[derive(Debug, Clone)]
pub struct Page {
    items: Vec<RenderedArticle>,
    expanded: HashSet<String>,
    status: String,
    notices: Vec<String>,
    viewport_height: u32,
    item_height: u32,
    scroll_y: u32,
}

impl Page {
    pub fn new(viewport_height: u32, item_height: u32) -> Self {
        Self {
            items: Vec::new(),
            expanded: HashSet::new(),
            status: String::new(),
            notices: Vec::new(),
            viewport_height,
            item_height,
            scroll_y: 0,
        }
    }

    pub fn items(&self) -> &[RenderedArticle] {
        &self.items
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Notices shown since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    fn content_height(&self) -> u32 {
        let rows = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        rows.saturating_mul(self.item_height)
    }

    /// Scroll so the bottom of the document is in view.
    pub fn scroll_to_bottom(&mut self) {
        let metrics = self.metrics();
        self.scroll_y = metrics.scroll_height.saturating_sub(metrics.viewport_height);
    }

    /// Static HTML snapshot with panels in their current visibility.
    pub fn to_html(&self) -> String {
        let list = if self.items.is_empty() {
            String::new()
        } else {
            format!(
                "<ul id=\"article-list\">\n{}\n</ul>",
                self.items
                    .iter()
                    .map(|item| item.to_html(self.is_expanded(&item.id)))
                    .join("\n")
            )
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="ja">
<head>
<meta charset="utf-8">
<title>AIニュース</title>
<style>.hidden {{ display: none; }} .summary {{ white-space: pre-line; }}</style>
</head>
<body>
<div id="news-container">
{list}
</div>
<p id="status-message">{status}</p>
</body>
</html>
"#,
            list = list,
            status = encode_text(&self.status),
        )
    }
}

impl FeedView for Page {
    fn append(&mut self, items: Vec<RenderedArticle>) {
        self.items.extend(items);
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }

    fn toggle_panel(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics {
            scroll_height: self.content_height().max(self.viewport_height),
            scroll_y: self.scroll_y,
            viewport_height: self.viewport_height,
        }
    }
}
