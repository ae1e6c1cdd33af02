//! Typewriter reveal of generated text.
//!
//! [`RevealScheduler::begin`] stamps the new target with a generation id and
//! spawns a task that waits out the preface, then discloses one character per
//! tick. Every continuation re-checks the id under the watch lock, so a task
//! belonging to an abandoned reveal can never touch the current one.

use crate::clock::ClockPtr;
use crate::{GenerationResult, StudioConfig};
use futures::stream::BoxStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Preface and tick durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    pub preface: Duration,
    pub tick: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            preface: Duration::ZERO,
            tick: Duration::from_millis(30),
        }
    }
}

impl From<&StudioConfig> for RevealTiming {
    fn from(config: &StudioConfig) -> Self {
        Self {
            preface: config.preface(),
            tick: config.tick(),
        }
    }
}

/// Progress of one reveal.
///
/// `revealed` counts characters and never exceeds the target length;
/// `preface_active` is only true while nothing has been revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealState {
    generation: u64,
    target: GenerationResult,
    total: usize,
    revealed: usize,
    preface_active: bool,
}

impl RevealState {
    fn new(generation: u64, target: GenerationResult) -> Self {
        Self {
            generation,
            total: target.char_len(),
            target,
            revealed: 0,
            preface_active: true,
        }
    }

    /// Id of the reveal this state belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target(&self) -> &GenerationResult {
        &self.target
    }

    /// Number of characters shown so far.
    pub fn revealed_len(&self) -> usize {
        self.revealed
    }

    pub fn total_len(&self) -> usize {
        self.total
    }

    pub fn is_preface(&self) -> bool {
        self.preface_active
    }

    pub fn is_complete(&self) -> bool {
        !self.preface_active && self.revealed == self.total
    }

    /// The visible prefix of the target text.
    pub fn revealed_text(&self) -> &str {
        let text = &self.target.full_text;
        let end = text
            .char_indices()
            .nth(self.revealed)
            .map_or(text.len(), |(i, _)| i);
        &text[..end]
    }

    fn advance(&mut self) -> bool {
        if self.preface_active || self.revealed >= self.total {
            return false;
        }
        self.revealed += 1;
        true
    }
}

/// Drives the typewriter effect for one target at a time.
pub struct RevealScheduler {
    clock: ClockPtr,
    timing: RevealTiming,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<Option<RevealState>>>,
}

impl RevealScheduler {
    pub fn new(clock: ClockPtr, timing: RevealTiming) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            clock,
            timing,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    pub fn timing(&self) -> RevealTiming {
        self.timing
    }

    /// Start revealing `result`, replacing whatever was being revealed.
    ///
    /// Must be called from within a tokio runtime. Returns the generation id.
    pub fn begin(&self, result: GenerationResult) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, chars = result.char_len(), "Starting reveal");
        self.state.send_replace(Some(RevealState::new(generation, result)));

        let clock = Arc::clone(&self.clock);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let timing = self.timing;

        tokio::spawn(async move {
            clock.sleep(timing.preface).await;
            let mut running = state.send_if_modified(|slot| match slot {
                Some(s) if s.generation == generation => {
                    s.preface_active = false;
                    true
                }
                _ => false,
            });

            while running && current.load(Ordering::SeqCst) == generation {
                clock.sleep(timing.tick).await;
                let mut more = false;
                let advanced = state.send_if_modified(|slot| match slot {
                    Some(s) if s.generation == generation => {
                        let advanced = s.advance();
                        more = !s.is_complete();
                        advanced
                    }
                    _ => false,
                });
                running = advanced && more;
            }
            trace!(generation, "Reveal task finished");
        });

        generation
    }

    /// Drop the current reveal and invalidate its pending ticks.
    pub fn cancel(&self) {
        let stale = self.generation.fetch_add(1, Ordering::SeqCst);
        trace!(generation = stale, "Reveal cancelled");
        self.state.send_replace(None);
    }

    /// Current progress, if a reveal exists.
    pub fn snapshot(&self) -> Option<RevealState> {
        self.state.borrow().clone()
    }

    pub fn is_complete(&self) -> bool {
        self.state.borrow().as_ref().is_some_and(RevealState::is_complete)
    }

    /// Watch every change to the reveal.
    pub fn subscribe(&self) -> watch::Receiver<Option<RevealState>> {
        self.state.subscribe()
    }

    /// Wait until the reveal that is current right now completes.
    ///
    /// Returns `None` when there is no reveal, or when it is replaced or
    /// cancelled before finishing.
    pub async fn wait_complete(&self) -> Option<RevealState> {
        let mut rx = self.state.subscribe();
        let generation = rx.borrow_and_update().as_ref()?.generation;
        loop {
            {
                let current = rx.borrow_and_update();
                match current.as_ref() {
                    Some(s) if s.generation == generation => {
                        if s.is_complete() {
                            return Some(s.clone());
                        }
                    }
                    _ => return None,
                }
            }
            if rx.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Stream the newly revealed fragments of the current reveal.
    ///
    /// Concatenating every item gives the full text. The stream ends on
    /// completion, or early if the reveal is replaced.
    pub fn deltas(&self) -> BoxStream<'static, String> {
        let mut rx = self.state.subscribe();

        Box::pin(async_stream::stream! {
            let generation = {
                let current = rx.borrow_and_update();
                current.as_ref().map(|s| s.generation)
            };
            let Some(generation) = generation else {
                return;
            };

            let mut emitted = 0usize;
            loop {
                let (fragment, done) = {
                    let current = rx.borrow_and_update();
                    match current.as_ref() {
                        Some(s) if s.generation == generation => {
                            let text = s.revealed_text();
                            let fragment = text[emitted..].to_string();
                            emitted = text.len();
                            (fragment, s.is_complete())
                        }
                        _ => (String::new(), true),
                    }
                };
                if !fragment.is_empty() {
                    yield fragment;
                }
                if done || rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}
