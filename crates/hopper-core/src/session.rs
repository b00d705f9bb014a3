//! Palette session: the event-driven driver tying the query pipeline
//! to the navigation state machine.
//!
//! The embedding UI feeds [`PaletteEvent`]s in and renders
//! [`PaletteUpdate`]s coming back on the update channel. Everything
//! runs on one cooperative loop; the only suspending work is the
//! pipeline search, dispatched as a task so typing stays responsive.

use crate::nav::{Direction, ResultWindow};
use crate::query::QueryPipeline;
use hopper_types::{PaletteMessage, ScrollDirection, SearchItem, SourceType};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Keystroke burst window: only the last keystroke triggers a fetch.
const DEBOUNCE: Duration = Duration::from_millis(150);

/// Settle delay after closing a tab, letting the host catch up before
/// the re-query.
const CLOSE_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Events fed into the session by the embedding UI.
#[derive(Debug, Clone)]
pub enum PaletteEvent {
    /// The input text changed
    QueryChanged { query: String },

    /// Arrow-key move over the grid
    Move(Direction),

    /// Wheel tick
    Wheel { delta_y: f64 },

    /// Pointer click on a visible item
    Clicked { idx: usize, new_tab: bool },

    /// Enter on the current selection
    Activate { new_tab: bool },

    /// Close the selected live tab without leaving the palette
    CloseSelectedTab,

    /// Escape: close without navigating
    Dismiss,
}

/// Updates emitted to the embedding UI.
#[derive(Debug, Clone)]
pub enum PaletteUpdate {
    /// Full result replacement
    Results {
        items: Vec<SearchItem>,
        selected: Option<usize>,
        visible: Range<usize>,
    },

    /// Selection or window moved
    Selection {
        selected: Option<usize>,
        visible: Range<usize>,
    },

    /// Hand this message to the background coordinator
    Navigate { message: PaletteMessage },

    /// The palette closed; no further updates follow
    Closed,
}

/// A resolved search, tagged with the sequence it was issued under.
struct SearchOutcome {
    seq: u64,
    query: String,
    items: Vec<SearchItem>,
}

pub struct PaletteSession {
    pipeline: Arc<QueryPipeline>,
    source: SourceType,
    scroll: ScrollDirection,
    window: ResultWindow,
    items: Vec<SearchItem>,
    query: String,

    /// Latest issued search sequence. A debounce timer that wakes to
    /// find itself superseded skips its fetch; an already-running
    /// fetch completes and its outcome is dropped as stale.
    latest_seq: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    outcome_tx: UnboundedSender<SearchOutcome>,
    outcome_rx: UnboundedReceiver<SearchOutcome>,

    update_tx: UnboundedSender<PaletteUpdate>,
    closed: bool,
}

impl PaletteSession {
    /// Create a session bound to one source. Returns the session and
    /// the update receiver for the embedding UI.
    #[must_use]
    pub fn new(
        pipeline: Arc<QueryPipeline>,
        source: SourceType,
        scroll: ScrollDirection,
    ) -> (Self, UnboundedReceiver<PaletteUpdate>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        (
            Self {
                pipeline,
                source,
                scroll,
                window: ResultWindow::new(),
                items: Vec::new(),
                query: String::new(),
                latest_seq: Arc::new(AtomicU64::new(0)),
                pending: None,
                outcome_tx,
                outcome_rx,
                update_tx,
                closed: false,
            },
            update_rx,
        )
    }

    /// Drive the session until it closes, consuming UI events and
    /// internal search outcomes on one cooperative loop. The initial
    /// empty-query search is issued immediately.
    pub async fn run(mut self, mut events: UnboundedReceiver<PaletteEvent>) {
        self.dispatch_search(self.query.clone(), Duration::ZERO);

        while !self.closed {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => self.process(event).await,
                        None => break, // the UI went away
                    }
                }
                outcome = self.outcome_rx.recv() => {
                    if let Some(outcome) = outcome {
                        self.apply_outcome(outcome);
                    }
                }
            }
        }
    }

    /// Process one event. Events arriving after close are ignored.
    pub async fn process(&mut self, event: PaletteEvent) {
        if self.closed {
            return;
        }

        match event {
            PaletteEvent::QueryChanged { query } => {
                self.query.clone_from(&query);
                self.dispatch_search(query, DEBOUNCE);
            }
            PaletteEvent::Move(direction) => {
                if self.window.move_selection(direction) {
                    self.emit_selection();
                }
            }
            PaletteEvent::Wheel { delta_y } => {
                if self.window.wheel(delta_y, self.scroll) {
                    self.emit_selection();
                }
            }
            PaletteEvent::Clicked { idx, new_tab } => {
                if self.window.selected() == Some(idx) {
                    self.activate(new_tab);
                } else if self.window.select(idx) {
                    self.emit_selection();
                }
            }
            PaletteEvent::Activate { new_tab } => self.activate(new_tab),
            PaletteEvent::CloseSelectedTab => self.close_selected_tab().await,
            PaletteEvent::Dismiss => self.close(),
        }
    }

    /// Issue a search after `delay`, superseding any pending one.
    ///
    /// Bumping the sequence cancels any not-yet-fired timer (it checks
    /// on wake) without touching fetches already in flight; those run
    /// to completion and their outcomes are dropped as stale.
    fn dispatch_search(&mut self, query: String, delay: Duration) {
        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let latest_seq = Arc::clone(&self.latest_seq);
        let pipeline = Arc::clone(&self.pipeline);
        let source = self.source;
        let outcome_tx = self.outcome_tx.clone();

        self.pending = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
                if latest_seq.load(Ordering::SeqCst) != seq {
                    debug!("Debounce timer superseded, skipping fetch");
                    return;
                }
            }
            let items = match pipeline.search(source, &query).await {
                Ok(items) => items,
                Err(e) => {
                    warn!("Search failed for {source}: {e}");
                    Vec::new()
                }
            };
            let _ = outcome_tx.send(SearchOutcome { seq, query, items });
        }));
    }

    fn apply_outcome(&mut self, outcome: SearchOutcome) {
        if self.closed {
            return;
        }
        if outcome.seq != self.latest_seq.load(Ordering::SeqCst) {
            debug!("Dropping stale search result (seq {})", outcome.seq);
            return;
        }
        // Validate against the current input text as well; a slow
        // early response must never clobber a faster later one
        if outcome.query != self.query {
            debug!("Dropping result for superseded query");
            return;
        }

        self.items = outcome.items;
        self.window.reset(self.items.len());
        self.emit_results();
    }

    /// Open/focus the selected item, then close the palette.
    fn activate(&mut self, new_tab: bool) {
        let Some(selected) = self.window.selected() else {
            return;
        };
        let Some(item) = self.items.get(selected).cloned() else {
            return;
        };

        let message = if item.is_tab() {
            PaletteMessage::SwitchTab {
                element: item,
                new_tab,
            }
        } else {
            PaletteMessage::OpenTarget {
                element: item,
                new_tab,
            }
        };

        self.emit(PaletteUpdate::Navigate { message });
        self.close();
    }

    /// Close the selected live tab, wait for the host to settle, then
    /// refresh the current query and re-clamp the selection.
    async fn close_selected_tab(&mut self) {
        let Some(selected) = self.window.selected() else {
            return;
        };
        let Some(item) = self.items.get(selected) else {
            return;
        };
        // Only live tabs can be closed
        let Some(id) = item.source_id else {
            return;
        };

        if let Err(e) = self.pipeline.remove_tab(id).await {
            warn!("Failed to close tab {id}: {e}");
            return;
        }

        tokio::time::sleep(CLOSE_SETTLE_DELAY).await;

        // The refresh replaces the set in place; bump the sequence so
        // any in-flight debounced result goes stale
        self.latest_seq.fetch_add(1, Ordering::SeqCst);
        let items = match self.pipeline.search(self.source, &self.query).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Refresh after tab close failed: {e}");
                Vec::new()
            }
        };

        self.items = items;
        self.window.clamp_after_refresh(self.items.len());
        self.emit_results();
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // The palette is gone: nothing may mutate state after close,
        // and any still-pending search is of no further interest
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.emit(PaletteUpdate::Closed);
        debug!("Palette session closed");
    }

    fn emit_results(&self) {
        self.emit(PaletteUpdate::Results {
            items: self.items.clone(),
            selected: self.window.selected(),
            visible: self.window.visible_range(),
        });
    }

    fn emit_selection(&self) {
        self.emit(PaletteUpdate::Selection {
            selected: self.window.selected(),
            visible: self.window.visible_range(),
        });
    }

    fn emit(&self, update: PaletteUpdate) {
        let _ = self.update_tx.send(update);
    }
}
