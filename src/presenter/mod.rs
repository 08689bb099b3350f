//! The presenter: an infinite-scroll view over the `data.json` artifact.
//!
//! # Submodules
//!
//! - [`feed`]: Feed state, artifact loading, batch loading and toggling
//! - [`page`]: The host page abstraction and its in-memory model
//! - [`render`]: Markup for a single entry
//!
//! # Event loop
//!
//! [`run`] reads viewer commands from stdin and waits on the simulated
//! load latency at the same time, so a scroll issued while a batch is
//! still "in flight" reaches the feed and is turned away by the loading
//! flag, exactly as it would in a browser.
//!
//! | Command | Effect |
//! |---------|--------|
//! | empty line, `j`, `scroll` | Scroll to the bottom of the page |
//! | `t <n>`, `toggle <n>` | Click the toggle of entry `n` (1-based) |
//! | `q`, `quit` | Leave |

pub mod feed;
pub mod page;
pub mod render;

use crate::cli::PresentArgs;
use feed::{FeedPhase, FeedState, LoadTrigger, ToggleOutcome};
use page::Page;
use std::error::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// One line of viewer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    Scroll,
    Toggle(usize),
    Quit,
    Unknown(String),
}

impl ViewerCommand {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (None, _, _) | (Some("j" | "scroll"), None, _) => ViewerCommand::Scroll,
            (Some("q" | "quit"), None, _) => ViewerCommand::Quit,
            (Some("t" | "toggle"), Some(n), None) => match n.parse::<usize>() {
                Ok(n) if n > 0 => ViewerCommand::Toggle(n),
                _ => ViewerCommand::Unknown(line.trim().to_string()),
            },
            _ => ViewerCommand::Unknown(line.trim().to_string()),
        }
    }
}

/// Prints what changed on the page since the last call.
#[derive(Debug, Default)]
struct Console {
    printed_items: usize,
    last_status: String,
}

impl Console {
    fn flush(&mut self, page: &mut Page) {
        for (n, item) in page.items().iter().enumerate().skip(self.printed_items) {
            println!("[{}] {}", n + 1, item);
        }
        self.printed_items = page.items().len();

        for notice in page.take_notices() {
            println!("!! {notice}");
        }

        if page.status() != self.last_status {
            println!("-- {}", page.status());
            self.last_status = page.status().to_string();
        }
    }
}

/// Run the presenter on stdin until the viewer quits or input ends with nothing left to load.
#[instrument(level = "info", skip_all, fields(data_url = %args.data_url))]
pub async fn run(args: &PresentArgs) -> Result<(), Box<dyn Error>> {
    run_with_input(args, BufReader::new(tokio::io::stdin())).await
}

async fn run_with_input<R>(args: &PresentArgs, input: R) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
{
    let latency = Duration::from_millis(args.latency_ms);
    let mut state = FeedState::new(args.batch_size);
    let mut page = Page::new(args.viewport_height, args.item_height);
    let mut console = Console::default();

    feed::initialize(&mut state, &mut page, &args.data_url).await;
    console.flush(&mut page);

    let timer = sleep(Duration::ZERO);
    tokio::pin!(timer);
    let mut armed = false;
    if feed::request_more(&mut state, &mut page, LoadTrigger::Initial) {
        timer.as_mut().reset(Instant::now() + latency);
        armed = true;
    }
    console.flush(&mut page);

    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            () = &mut timer, if armed => {
                armed = false;
                let outcome = feed::complete_load(&mut state, &mut page);
                if outcome.needs_fill && feed::request_more(&mut state, &mut page, LoadTrigger::Fill) {
                    timer.as_mut().reset(Instant::now() + latency);
                    armed = true;
                }
            }
            line = lines.next_line(), if input_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        input_open = false;
                        continue;
                    }
                    Err(e) => {
                        warn!(error = %e, "Unreadable input line skipped");
                        continue;
                    }
                };
                match ViewerCommand::parse(&line) {
                    ViewerCommand::Scroll => {
                        page.scroll_to_bottom();
                        if feed::on_scroll(&mut state, &mut page) {
                            timer.as_mut().reset(Instant::now() + latency);
                            armed = true;
                        } else if state.is_loading() {
                            debug!("Load already in flight; scroll ignored");
                        } else if !state.has_more() && state.phase() == &FeedPhase::Ready {
                            println!("-- 最後まで表示しました。");
                        }
                    }
                    ViewerCommand::Toggle(n) => match feed::toggle(&state, &mut page, n - 1) {
                        ToggleOutcome::Toggled { visible: true } => {
                            if let Some(item) = page.items().get(n - 1) {
                                println!("[{}] {}", n, item.summary.replace('\n', "\n    "));
                            }
                        }
                        ToggleOutcome::Toggled { visible: false } => println!("[{}] (要約を閉じました)", n),
                        ToggleOutcome::Notice(_) => {}
                        ToggleOutcome::NotFound => println!("?? 記事 {} はまだ表示されていません。", n),
                    },
                    ViewerCommand::Quit => break,
                    ViewerCommand::Unknown(cmd) => {
                        println!("?? 不明なコマンド: {cmd:?} (Enter/j: スクロール, t <番号>: 要約, q: 終了)");
                    }
                }
            }
            else => break,
        }
        console.flush(&mut page);
    }

    if let Some(path) = &args.html {
        tokio::fs::write(path, page.to_html()).await?;
        info!(%path, items = page.items().len(), "Wrote HTML snapshot");
    }

    info!(
        revealed = state.cursor(),
        total = state.total(),
        batches = state.batches_loaded(),
        "Presenter finished"
    );
    Ok(())
}
