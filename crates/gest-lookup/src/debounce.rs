//! # Search Debouncer
//!
//! Collapses search keystrokes into one lookup per settling window and makes
//! sure only the newest lookup's answer is ever shown.
//!
//! ## Message Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Search Debouncer                                 │
//! │                                                                         │
//! │  SearchHandle::input("c")   ──┐                                        │
//! │  SearchHandle::input("cu")  ──┼──► pending = latest term               │
//! │  SearchHandle::input("cua") ──┘    timer re-armed on every input       │
//! │                                          │                              │
//! │                                          ▼ 300ms of silence             │
//! │                                 ┌─────────────────┐                    │
//! │                                 │  settle(term)   │  generation += 1   │
//! │                                 └────────┬────────┘                    │
//! │                   ┌──────────────────────┴──────────────┐              │
//! │                   ▼ < min chars                         ▼ ≥ min chars  │
//! │          SearchEvent::Prompt                   spawn lookup task       │
//! │          (no network)                          SearchEvent::Started    │
//! │                                                         │              │
//! │                                                         ▼              │
//! │                                            Completed { generation }    │
//! │                                                         │              │
//! │                                   ┌─────────────────────┴──────┐       │
//! │                                   ▼ generation == latest       ▼ older │
//! │                         Results / Failed event              dropped    │
//! │                                                                         │
//! │  In-flight lookups are never aborted; their answers are just ignored   │
//! │  once a newer window has settled.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use gest_core::validation::validate_search_term;
use gest_core::ProductHit;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::ProductLookup;
use crate::config::LookupSettings;
use crate::error::{LookupError, LookupResult};

// =============================================================================
// Constants
// =============================================================================

/// Default settling window in milliseconds.
pub const DEFAULT_SETTLE_WINDOW_MS: u64 = 300;

/// Message shown when a lookup fails.
pub const SEARCH_FAILED_MESSAGE: &str = "Error searching products, try again";

const CHANNEL_BUFFER: usize = 64;

// =============================================================================
// Events
// =============================================================================

/// What the debouncer reports to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// Settled term is too short; ask for more characters.
    Prompt { min_len: usize },

    /// A lookup went out for `term`.
    Started { term: String, generation: u64 },

    /// Newest lookup answered. `hits` may be empty ("no products found").
    Results { term: String, hits: Vec<ProductHit> },

    /// Newest lookup failed.
    Failed { term: String, message: String },
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebounceConfig {
    pub window: Duration,
    pub min_term_len: usize,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        DebounceConfig {
            window: Duration::from_millis(DEFAULT_SETTLE_WINDOW_MS),
            min_term_len: gest_core::MIN_SEARCH_TERM_LEN,
        }
    }
}

impl From<&LookupSettings> for DebounceConfig {
    fn from(settings: &LookupSettings) -> Self {
        DebounceConfig {
            window: settings.debounce_window(),
            min_term_len: settings.min_term_len,
        }
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable handle to a running debouncer.
#[derive(Clone)]
pub struct SearchHandle {
    cmd_tx: mpsc::Sender<DebounceCommand>,
}

#[derive(Debug)]
enum DebounceCommand {
    /// Latest value of the search box.
    Input(String),
    /// Settle the pending term now instead of waiting for the window.
    Flush,
    Shutdown,
}

impl SearchHandle {
    /// Records a keystroke and re-arms the settling timer.
    pub async fn input(&self, term: impl Into<String>) -> LookupResult<()> {
        self.send(DebounceCommand::Input(term.into())).await
    }

    /// Settles the pending term immediately.
    pub async fn flush(&self) -> LookupResult<()> {
        self.send(DebounceCommand::Flush).await
    }

    /// Stops the debouncer. In-flight lookups finish but are not reported.
    pub async fn shutdown(&self) -> LookupResult<()> {
        self.send(DebounceCommand::Shutdown).await
    }

    async fn send(&self, cmd: DebounceCommand) -> LookupResult<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| LookupError::ShuttingDown)
    }
}

// =============================================================================
// Debouncer
// =============================================================================

/// Answer of a spawned lookup task.
struct Completed {
    generation: u64,
    term: String,
    result: LookupResult<Vec<ProductHit>>,
}

pub struct SearchDebouncer {
    lookup: Arc<dyn ProductLookup>,
    config: DebounceConfig,
    /// Term waiting for the window to settle.
    pending: Option<String>,
    /// Generation of the most recently settled window.
    generation: u64,
}

impl SearchDebouncer {
    pub fn new(lookup: Arc<dyn ProductLookup>, config: DebounceConfig) -> Self {
        SearchDebouncer {
            lookup,
            config,
            pending: None,
            generation: 0,
        }
    }

    /// Spawns the debouncer task.
    ///
    /// ## Returns
    /// The command handle and the receiving end of the event stream.
    ///
    /// The loop never waits on the event stream: once the receiver is
    /// `CHANNEL_BUFFER` events behind, newer events are dropped.
    pub fn start(self) -> (SearchHandle, mpsc::Receiver<SearchEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER);
        let (event_tx, event_rx) = mpsc::channel(CHANNEL_BUFFER);

        tokio::spawn(async move {
            self.run(cmd_rx, event_tx).await;
        });

        (SearchHandle { cmd_tx }, event_rx)
    }

    /// Main debouncer loop.
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<DebounceCommand>,
        events: mpsc::Sender<SearchEvent>,
    ) {
        info!(
            window_ms = self.config.window.as_millis() as u64,
            min_term_len = self.config.min_term_len,
            "Search debouncer started"
        );

        let (done_tx, mut done_rx) = mpsc::channel::<Completed>(CHANNEL_BUFFER);
        let settle_timer = tokio::time::sleep(self.config.window);
        tokio::pin!(settle_timer);

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(DebounceCommand::Input(term)) => {
                            debug!(term = %term, "Search input");
                            self.pending = Some(term);
                            settle_timer.as_mut().reset(Instant::now() + self.config.window);
                        }
                        Some(DebounceCommand::Flush) => {
                            if let Some(term) = self.pending.take() {
                                self.settle(term, &done_tx, &events);
                            }
                        }
                        Some(DebounceCommand::Shutdown) | None => {
                            info!("Search debouncer shutting down");
                            break;
                        }
                    }
                }
                _ = &mut settle_timer, if self.pending.is_some() => {
                    if let Some(term) = self.pending.take() {
                        self.settle(term, &done_tx, &events);
                    }
                }
                Some(done) = done_rx.recv() => {
                    self.complete(done, &events);
                }
            }
        }
    }

    /// A settling window closed with `raw` as the last input.
    fn settle(
        &mut self,
        raw: String,
        done_tx: &mpsc::Sender<Completed>,
        events: &mpsc::Sender<SearchEvent>,
    ) {
        // Any older lookup still in flight is now stale
        self.generation += 1;
        let generation = self.generation;

        let term = match validate_search_term(&raw, self.config.min_term_len) {
            Ok(term) => term,
            Err(e) if raw.trim().chars().count() < self.config.min_term_len => {
                debug!(error = %e, "Search term too short");
                emit(
                    events,
                    SearchEvent::Prompt {
                        min_len: self.config.min_term_len,
                    },
                );
                return;
            }
            Err(e) => {
                warn!(error = %e, "Search term rejected");
                emit(
                    events,
                    SearchEvent::Failed {
                        term: raw.trim().to_string(),
                        message: e.to_string(),
                    },
                );
                return;
            }
        };

        debug!(term = %term, generation, "Starting product lookup");
        emit(
            events,
            SearchEvent::Started {
                term: term.clone(),
                generation,
            },
        );

        let lookup = Arc::clone(&self.lookup);
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let result = lookup.search(&term).await;
            let completed = Completed {
                generation,
                term,
                result,
            };
            if done_tx.send(completed).await.is_err() {
                debug!(generation, "Debouncer stopped before lookup finished");
            }
        });
    }

    /// A lookup task answered.
    fn complete(&self, done: Completed, events: &mpsc::Sender<SearchEvent>) {
        if done.generation != self.generation {
            debug!(
                term = %done.term,
                generation = done.generation,
                latest = self.generation,
                "Dropping stale search results"
            );
            return;
        }

        let event = match done.result {
            Ok(hits) => {
                debug!(term = %done.term, count = hits.len(), "Search results ready");
                SearchEvent::Results {
                    term: done.term,
                    hits,
                }
            }
            Err(e) => {
                warn!(term = %done.term, error = %e, "Product lookup failed");
                SearchEvent::Failed {
                    term: done.term,
                    message: SEARCH_FAILED_MESSAGE.to_string(),
                }
            }
        };
        emit(events, event);
    }
}

fn emit(events: &mpsc::Sender<SearchEvent>, event: SearchEvent) {
    match events.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(event)) => {
            debug!(?event, "Search event buffer full, dropping event");
        }
        Err(TrySendError::Closed(_)) => {
            debug!("Search event receiver dropped");
        }
    }
}
