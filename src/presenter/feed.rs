//! Feed state and the operations that move it.
//!
//! The whole artifact is loaded up front; "pages" are revealed by slicing
//! it in fixed-size batches as the viewer nears the bottom of the page.
//! Every load goes through a simulated latency: [`request_more`] raises the
//! loading flag and the caller completes the load with [`complete_load`]
//! once the delay has elapsed. A scroll arriving in between is ignored.

use crate::models::{ArticleRecord, SummaryStatus};
use crate::presenter::page::FeedView;
use crate::presenter::render::RenderedArticle;
use crate::utils::parse_pub_date;
use std::cmp::Reverse;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Distance from the bottom of the document that triggers a load.
pub const SCROLL_THRESHOLD_PX: u32 = 100;
/// Slack under which the document is considered not to fill the viewport.
pub const FILL_SLACK_PX: u32 = 50;
/// Upper bound on consecutive loads issued only to fill the viewport.
pub const MAX_FILL_ROUNDS: usize = 20;

pub const STATUS_FETCHING: &str = "AI要約データを外部から取得中...";
pub const STATUS_LOADING: &str = "記事を追加読み込み中...";
pub const NOTICE_PENDING: &str = "要約データは次の自動更新を待ってね！";
pub const NOTICE_FAILED: &str = "この記事の要約生成に失敗しました。次の自動更新を待ってね！";

fn status_ready(total: usize) -> String {
    format!("全 {} 件の記事を準備完了。", total)
}

fn status_loaded(total: usize) -> String {
    format!("全 {} 件の記事をロード済み。", total)
}

fn status_error(reason: &str) -> String {
    format!(
        "🚨 エラー: データの読み込みに失敗しました。URLを確認してね。 ({})",
        reason
    )
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("データ取得に失敗: {0}")]
    Status(u16),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid artifact: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load the artifact from an `http(s)` URL or a local path.
#[instrument(level = "info")]
pub async fn load_artifact(location: &str) -> Result<Vec<ArticleRecord>, FeedError> {
    let raw = if location.starts_with("http://") || location.starts_with("https://") {
        let response = reqwest::get(location).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        response.text().await?
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|source| FeedError::Io {
                path: location.to_string(),
                source,
            })?
    };

    let mut records: Vec<ArticleRecord> = serde_json::from_str(&raw)?;
    records.iter_mut().for_each(ArticleRecord::normalize);
    info!(count = records.len(), "Loaded artifact");
    Ok(records)
}

/// Order records newest first; records with an unreadable date go last.
pub fn sort_newest_first(records: &mut [ArticleRecord]) {
    records.sort_by_cached_key(|r| Reverse(parse_pub_date(&r.pub_date)));
}

/// Scroll geometry of the host page, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_height: u32,
    pub scroll_y: u32,
    pub viewport_height: u32,
}

impl ScrollMetrics {
    pub fn is_near_bottom(&self) -> bool {
        self.scroll_height.saturating_sub(self.scroll_y)
            < self.viewport_height.saturating_add(SCROLL_THRESHOLD_PX)
    }

    /// The document is short enough that the viewer cannot scroll.
    pub fn has_room(&self) -> bool {
        self.scroll_height <= self.viewport_height.saturating_add(FILL_SLACK_PX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedPhase {
    Uninitialized,
    Ready,
    Error(String),
}

/// What started a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTrigger {
    Initial,
    Scroll,
    /// Issued right after a load because the page still does not fill the viewport.
    Fill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub appended: usize,
    /// More records remain and the page still does not fill the viewport.
    pub needs_fill: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Toggled { visible: bool },
    Notice(&'static str),
    NotFound,
}

/// Everything the presenter knows about the feed.
#[derive(Debug)]
pub struct FeedState {
    records: Vec<ArticleRecord>,
    cursor: usize,
    loading: bool,
    batch_size: usize,
    phase: FeedPhase,
    fill_rounds: usize,
    batches_loaded: usize,
}

impl FeedState {
    pub fn new(batch_size: usize) -> Self {
        Self {
            records: Vec::new(),
            cursor: 0,
            loading: false,
            batch_size: batch_size.max(1),
            phase: FeedPhase::Uninitialized,
            fill_rounds: 0,
            batches_loaded: 0,
        }
    }

    /// Take ownership of the loaded records, sorted newest first.
    pub fn set_records(&mut self, mut records: Vec<ArticleRecord>) {
        sort_newest_first(&mut records);
        self.records = records;
        self.cursor = 0;
        self.loading = false;
        self.fill_rounds = 0;
        self.batches_loaded = 0;
        self.phase = FeedPhase::Ready;
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.phase = FeedPhase::Error(reason.into());
    }

    pub fn phase(&self) -> &FeedPhase {
        &self.phase
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn batches_loaded(&self) -> usize {
        self.batches_loaded
    }

    pub fn has_more(&self) -> bool {
        self.phase == FeedPhase::Ready && self.cursor < self.records.len()
    }

    /// Records revealed so far, in display order.
    pub fn revealed(&self) -> &[ArticleRecord] {
        &self.records[..self.cursor]
    }
}

/// Fetch the artifact and move to `Ready`, or to `Error` with a visible message.
pub async fn initialize<V: FeedView>(state: &mut FeedState, view: &mut V, location: &str) {
    view.set_status(STATUS_FETCHING);
    match load_artifact(location).await {
        Ok(records) => {
            state.set_records(records);
            view.set_status(&status_ready(state.total()));
        }
        Err(e) => {
            error!(%location, error = %e, "Failed to initialize feed");
            state.fail(e.to_string());
            view.set_status(&status_error(&e.to_string()));
        }
    }
}

/// Start loading the next batch.
///
/// Returns `true` when the caller should call [`complete_load`] after the
/// simulated latency. Does nothing while a load is in flight, once every
/// record is revealed, or when the fill guard is exhausted.
pub fn request_more<V: FeedView>(state: &mut FeedState, view: &mut V, trigger: LoadTrigger) -> bool {
    if state.loading || !state.has_more() {
        debug!(loading = state.loading, cursor = state.cursor, ?trigger, "Load request ignored");
        return false;
    }

    match trigger {
        LoadTrigger::Fill => {
            if state.fill_rounds >= MAX_FILL_ROUNDS {
                warn!(rounds = state.fill_rounds, "Viewport still not filled; giving up until the next scroll");
                return false;
            }
            state.fill_rounds += 1;
        }
        LoadTrigger::Initial | LoadTrigger::Scroll => state.fill_rounds = 0,
    }

    state.loading = true;
    view.set_status(STATUS_LOADING);
    true
}

/// Reveal the pending batch: append it, advance the cursor, clear the flag.
pub fn complete_load<V: FeedView>(state: &mut FeedState, view: &mut V) -> LoadOutcome {
    if !state.loading {
        return LoadOutcome {
            appended: 0,
            needs_fill: false,
        };
    }

    let end = (state.cursor + state.batch_size).min(state.records.len());
    let batch = state.records[state.cursor..end]
        .iter()
        .map(RenderedArticle::from_record)
        .collect::<Vec<_>>();
    let appended = batch.len();
    view.append(batch);

    state.cursor = end;
    state.loading = false;
    state.batches_loaded += 1;
    view.set_status(&status_loaded(state.total()));
    debug!(appended, cursor = state.cursor, total = state.total(), "Batch revealed");

    LoadOutcome {
        appended,
        needs_fill: state.has_more() && view.metrics().has_room(),
    }
}

/// Scroll handler: start a load when the viewer is near the bottom.
pub fn on_scroll<V: FeedView>(state: &mut FeedState, view: &mut V) -> bool {
    view.metrics().is_near_bottom() && request_more(state, view, LoadTrigger::Scroll)
}

/// Toggle the summary panel of the revealed entry at `position` (0-based).
pub fn toggle<V: FeedView>(state: &FeedState, view: &mut V, position: usize) -> ToggleOutcome {
    let Some(record) = state.revealed().get(position) else {
        return ToggleOutcome::NotFound;
    };

    let notice = match record.status() {
        SummaryStatus::Ok => {
            let visible = view.toggle_panel(&record.id);
            return ToggleOutcome::Toggled { visible };
        }
        SummaryStatus::Skipped => NOTICE_PENDING,
        SummaryStatus::Error => NOTICE_FAILED,
    };
    view.notice(notice);
    ToggleOutcome::Notice(notice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::page::Page;
    use tempfile::TempDir;

    fn record(title: &str, link: &str, pub_date: &str, summary: &str) -> ArticleRecord {
        let mut record = ArticleRecord {
            id: String::new(),
            title: title.to_string(),
            link: link.to_string(),
            pub_date: pub_date.to_string(),
            source: "S".to_string(),
            summary: summary.to_string(),
            summary_status: None,
        };
        record.normalize();
        record
    }

    fn records(n: usize) -> Vec<ArticleRecord> {
        (0..n)
            .map(|i| {
                let day = 1 + (i % 28);
                let month = 1 + (i / 28) % 12;
                record(
                    &format!("T{i}"),
                    &format!("https://x/{i}"),
                    &format!("2024/{month:02}/{day:02}"),
                    "ok.",
                )
            })
            .collect()
    }

    fn load_all(state: &mut FeedState, page: &mut Page) -> usize {
        let mut invocations = 0;
        while request_more(state, page, LoadTrigger::Scroll) {
            complete_load(state, page);
            invocations += 1;
            assert!(state.cursor() <= state.total());
        }
        invocations
    }

    fn artifact_file(dir: &TempDir, contents: &str) -> String {
        let path = dir.path().join("data.json");
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_sort_is_descending_by_date() {
        let mut list = vec![
            record("old", "https://x/1", "2023/12/31", "ok."),
            record("bad", "https://x/2", "someday", "ok."),
            record("new", "https://x/3", "2024-06-01", "ok."),
            record("mid", "https://x/4", "2024-01-15T10:00:00Z", "ok."),
        ];
        sort_newest_first(&mut list);
        let titles: Vec<_> = list.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["new", "mid", "old", "bad"]);
    }

    #[test]
    fn test_sort_orders_same_day_by_time() {
        let mut list = vec![
            record("morning", "https://x/1", "2024-06-01T08:00:00Z", "ok."),
            record("midnight", "https://x/2", "2024/06/01", "ok."),
            record("evening", "https://x/3", "2024-06-01T20:00:00Z", "ok."),
            record("late", "https://x/4", "2024-06-02T06:00:00+09:00", "ok."),
        ];
        sort_newest_first(&mut list);
        let titles: Vec<_> = list.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["late", "evening", "morning", "midnight"]);
    }

    #[test]
    fn test_batches_needed_is_ceil_of_n_over_batch() {
        for n in [0usize, 1, 9, 10, 11, 25, 30] {
            let mut state = FeedState::new(DEFAULT_BATCH_SIZE);
            let mut page = Page::new(800, 120);
            state.set_records(records(n));

            let invocations = load_all(&mut state, &mut page);

            assert_eq!(invocations, n.div_ceil(10), "n = {n}");
            assert_eq!(state.cursor(), n);
            assert_eq!(page.items().len(), n);
        }
    }

    #[test]
    fn test_loading_flag_blocks_overlapping_loads() {
        let mut state = FeedState::new(10);
        let mut page = Page::new(100, 120);
        state.set_records(records(25));

        assert!(request_more(&mut state, &mut page, LoadTrigger::Initial));
        assert!(state.is_loading());
        page.scroll_to_bottom();
        assert!(!on_scroll(&mut state, &mut page));
        assert!(!request_more(&mut state, &mut page, LoadTrigger::Scroll));

        let outcome = complete_load(&mut state, &mut page);
        assert_eq!(outcome.appended, 10);
        assert_eq!(state.batches_loaded(), 1);
        assert!(!state.is_loading());
        assert_eq!(page.status(), "全 25 件の記事をロード済み。");
    }

    #[test]
    fn test_scroll_far_from_bottom_does_nothing() {
        let mut state = FeedState::new(10);
        let mut page = Page::new(300, 100);
        state.set_records(records(30));
        assert!(request_more(&mut state, &mut page, LoadTrigger::Initial));
        complete_load(&mut state, &mut page);

        assert!(!on_scroll(&mut state, &mut page));
        page.scroll_to_bottom();
        assert!(on_scroll(&mut state, &mut page));
    }

    #[test]
    fn test_fill_requested_while_page_is_short() {
        let mut state = FeedState::new(2);
        let mut page = Page::new(800, 100);
        state.set_records(records(12));

        assert!(request_more(&mut state, &mut page, LoadTrigger::Initial));
        let mut outcome = complete_load(&mut state, &mut page);
        let mut loads = 1;
        while outcome.needs_fill && request_more(&mut state, &mut page, LoadTrigger::Fill) {
            outcome = complete_load(&mut state, &mut page);
            loads += 1;
        }

        // 10 rows of 100px are the first to overflow 800px plus slack.
        assert_eq!(state.cursor(), 10);
        assert_eq!(loads, 5);
        assert!(!outcome.needs_fill);
    }

    #[test]
    fn test_fill_rounds_are_bounded() {
        let mut state = FeedState::new(1);
        let mut page = Page::new(10_000, 0);
        state.set_records(records(100));

        assert!(request_more(&mut state, &mut page, LoadTrigger::Initial));
        let mut outcome = complete_load(&mut state, &mut page);
        let mut loads = 1;
        while outcome.needs_fill && request_more(&mut state, &mut page, LoadTrigger::Fill) {
            outcome = complete_load(&mut state, &mut page);
            loads += 1;
        }

        assert_eq!(loads, 1 + MAX_FILL_ROUNDS);
        assert!(state.has_more());
    }

    #[test]
    fn test_no_loads_after_end() {
        let mut state = FeedState::new(10);
        let mut page = Page::new(100, 120);
        state.set_records(records(3));
        load_all(&mut state, &mut page);

        page.scroll_to_bottom();
        assert!(!on_scroll(&mut state, &mut page));
        assert_eq!(state.cursor(), 3);
    }

    #[test]
    fn test_no_loads_before_ready() {
        let mut state = FeedState::new(10);
        let mut page = Page::new(100, 120);
        assert_eq!(state.phase(), &FeedPhase::Uninitialized);
        assert!(!request_more(&mut state, &mut page, LoadTrigger::Initial));
        assert_eq!(complete_load(&mut state, &mut page).appended, 0);
    }

    #[tokio::test]
    async fn test_scenario_newest_first_and_pending_notice() {
        let dir = TempDir::new().unwrap();
        let path = artifact_file(
            &dir,
            r#"[
                {"title":"A","link":"https://x/1","pubDate":"2024-01-01","source":"S","summary":"ok."},
                {"title":"B","link":"https://x/2","pubDate":"2024-06-01","source":"S","summary":"まだ要約されていません"}
            ]"#,
        );
        let mut state = FeedState::new(10);
        let mut page = Page::new(800, 120);

        initialize(&mut state, &mut page, &path).await;
        assert_eq!(state.phase(), &FeedPhase::Ready);
        assert_eq!(page.status(), "全 2 件の記事を準備完了。");

        assert!(request_more(&mut state, &mut page, LoadTrigger::Initial));
        complete_load(&mut state, &mut page);
        let titles: Vec<_> = page.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["B", "A"]);

        let b_id = page.items()[0].id.clone();
        assert_eq!(toggle(&state, &mut page, 0), ToggleOutcome::Notice(NOTICE_PENDING));
        assert_eq!(toggle(&state, &mut page, 0), ToggleOutcome::Notice(NOTICE_PENDING));
        assert!(!page.is_expanded(&b_id));
        assert_eq!(page.take_notices().len(), 2);

        assert_eq!(toggle(&state, &mut page, 1), ToggleOutcome::Toggled { visible: true });
        assert_eq!(toggle(&state, &mut page, 1), ToggleOutcome::Toggled { visible: false });
        assert_eq!(toggle(&state, &mut page, 2), ToggleOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_failed_summary_shows_failure_notice() {
        let dir = TempDir::new().unwrap();
        let path = artifact_file(
            &dir,
            r#"[{"title":"A","link":"https://x/1","pubDate":"2024/01/01","source":"S","summary":"AI要約生成に失敗しました。","summaryStatus":"error"}]"#,
        );
        let mut state = FeedState::new(10);
        let mut page = Page::new(800, 120);
        initialize(&mut state, &mut page, &path).await;
        request_more(&mut state, &mut page, LoadTrigger::Initial);
        complete_load(&mut state, &mut page);

        assert_eq!(toggle(&state, &mut page, 0), ToggleOutcome::Notice(NOTICE_FAILED));
    }

    #[tokio::test]
    async fn test_initialize_error_is_visible() {
        let mut state = FeedState::new(10);
        let mut page = Page::new(800, 120);

        initialize(&mut state, &mut page, "/nonexistent/kame/data.json").await;

        assert!(matches!(state.phase(), FeedPhase::Error(_)));
        assert!(page.status().starts_with("🚨 エラー: データの読み込みに失敗しました。"));
        assert!(!request_more(&mut state, &mut page, LoadTrigger::Initial));
        assert!(page.items().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = artifact_file(&dir, "{ not json");
        let err = load_artifact(&path).await.unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }

    #[test]
    fn test_scroll_metrics() {
        let near = ScrollMetrics {
            scroll_height: 1000,
            scroll_y: 250,
            viewport_height: 700,
        };
        assert!(near.is_near_bottom());
        let far = ScrollMetrics { scroll_y: 100, ..near };
        assert!(!far.is_near_bottom());

        let short = ScrollMetrics {
            scroll_height: 750,
            scroll_y: 0,
            viewport_height: 700,
        };
        assert!(short.has_room());
        assert!(!ScrollMetrics { scroll_height: 751, ..short }.has_room());
    }

    #[test]
    fn test_scroll_metrics_with_huge_viewport() {
        let huge = ScrollMetrics {
            scroll_height: u32::MAX,
            scroll_y: 0,
            viewport_height: u32::MAX - 10,
        };
        assert!(!huge.is_near_bottom());
        assert!(huge.has_room());
    }
}
