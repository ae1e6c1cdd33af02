//! Studio - the interaction controller.
//!
//! Owns the form, transient messages and history list in one [`StudioState`]
//! published on a watch channel, and runs the pipeline: validate the topic,
//! call the provider, hand the result to the [`RevealScheduler`], then let
//! the user save or copy it.

use crate::clipboard::{ClipboardPtr, MemoryClipboard};
use crate::clock::{ClockPtr, TokioClock};
use crate::error::GENERATION_FAILURE_MESSAGE;
use crate::history::HistoryStore;
use crate::provider::{ContentProvider, TemplateProvider};
use crate::reveal::{RevealScheduler, RevealState, RevealTiming};
use crate::secret::Credential;
use crate::storage::FileStore;
use crate::{
    ContentType, GenerationRequest, GenerationResult, Result, SavedEntry, StudioConfig,
    StudioError,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Shown after a result arrives.
pub const GENERATED_MESSAGE: &str = "Generated successfully.";

/// Shown after a result is saved.
pub const SAVED_MESSAGE: &str = "Saved to history.";

/// What a copy action copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CopyTarget {
    /// The current, possibly unsaved, result.
    Current,
    /// A history entry by index, newest first.
    History(usize),
}

/// Where the pipeline currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing generated, or the last attempt failed.
    Idle,
    /// Waiting for the provider or for the first character.
    Preface,
    /// Characters are being revealed.
    Revealing,
    /// Fully revealed and not yet saved.
    Complete,
    /// Fully revealed and saved.
    Saved,
}

/// Everything a front end renders, apart from reveal progress.
#[derive(Debug, Clone, Default)]
pub struct StudioState {
    pub topic: String,
    pub content_type: ContentType,
    pub token: Credential,

    /// A provider call is in flight.
    pub pending: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    /// The current result has been saved.
    pub saved_current: bool,

    pub history: Vec<SavedEntry>,

    /// Targets with an active copy confirmation, keyed to the copy ticket.
    pub copied: BTreeMap<CopyTarget, u64>,
}

impl StudioState {
    pub fn is_copied(&self, target: CopyTarget) -> bool {
        self.copied.contains_key(&target)
    }
}

/// Result of a submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The result is being revealed.
    Started(GenerationResult),
    /// A newer submission started while this one was waiting; its result
    /// was discarded.
    Superseded,
}

/// Result of a save action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Added to history; carries the new history length.
    Saved(usize),
    /// The current result is already in history.
    AlreadySaved,
    /// Nothing fully revealed to save.
    NotReady,
}

/// Clears the pending flag if a submission is dropped while the provider
/// call is in flight, unless a newer submission has taken over.
struct PendingGuard<'a> {
    latest: &'a Mutex<u64>,
    state: &'a watch::Sender<StudioState>,
    id: u64,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if *latest == self.id {
            debug!(id = self.id, "Submission dropped while pending");
            self.state.send_modify(|s| s.pending = false);
        }
    }
}

/// The interaction controller.
///
/// # Example
///
/// ```rust,ignore
/// use studio_core::{ContentType, Studio, StudioConfig};
///
/// let studio = Studio::from_config(&StudioConfig::from_env())?;
/// studio.set_topic("Coffee");
/// studio.set_content_type(ContentType::InstagramCaption);
///
/// studio.submit().await?;
/// studio.reveal().wait_complete().await;
/// studio.save();
/// ```
pub struct Studio<P: ContentProvider> {
    provider: Arc<P>,
    clock: ClockPtr,
    config: StudioConfig,
    reveal: RevealScheduler,
    history: Mutex<HistoryStore>,
    clipboard: ClipboardPtr,
    state: Arc<watch::Sender<StudioState>>,
    /// Id of the newest submission; guards handing results to the reveal.
    latest: Mutex<u64>,
    notices: Arc<AtomicU64>,
    copies: AtomicU64,
}

impl Studio<TemplateProvider> {
    /// Build a studio with the template provider and file-backed history.
    pub fn from_config(config: &StudioConfig) -> Result<Self> {
        let dir = config.require_data_dir()?;
        info!("Using history directory {:?}", dir);
        let history = HistoryStore::open(Arc::new(FileStore::new(dir)));
        let provider = TemplateProvider::new(config.latency());

        let studio = Self::new(provider, history).with_config(config.clone());
        if let Some(token) = &config.token {
            info!(token = %token, "Token loaded");
            studio.set_token(token.clone());
        }
        Ok(studio)
    }
}

impl<P: ContentProvider + 'static> Studio<P> {
    /// Create a studio with default timing, tokio time and an in-memory
    /// clipboard.
    pub fn new(provider: P, history: HistoryStore) -> Self {
        let config = StudioConfig::default();
        let clock: ClockPtr = Arc::new(TokioClock);
        let state = StudioState {
            history: history.entries().to_vec(),
            ..StudioState::default()
        };
        let (state, _) = watch::channel(state);

        Self {
            provider: Arc::new(provider),
            reveal: RevealScheduler::new(Arc::clone(&clock), RevealTiming::from(&config)),
            clock,
            config,
            history: Mutex::new(history),
            clipboard: Arc::new(MemoryClipboard::new()),
            state: Arc::new(state),
            latest: Mutex::new(0),
            notices: Arc::new(AtomicU64::new(0)),
            copies: AtomicU64::new(0),
        }
    }

    /// Use custom timing.
    pub fn with_config(mut self, config: StudioConfig) -> Self {
        self.reveal = RevealScheduler::new(Arc::clone(&self.clock), RevealTiming::from(&config));
        self.config = config;
        self
    }

    /// Use a custom clock for the reveal and message timers.
    pub fn with_clock(mut self, clock: ClockPtr) -> Self {
        self.reveal = RevealScheduler::new(Arc::clone(&clock), self.reveal.timing());
        self.clock = clock;
        self
    }

    pub fn with_clipboard(mut self, clipboard: ClipboardPtr) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn set_topic(&self, topic: impl Into<String>) {
        let topic = topic.into();
        self.state.send_modify(|s| s.topic = topic);
    }

    pub fn set_content_type(&self, content_type: ContentType) {
        self.state.send_modify(|s| s.content_type = content_type);
    }

    /// Capture a token. It is kept in memory only.
    pub fn set_token(&self, token: Credential) {
        self.state.send_modify(|s| s.token = token);
    }

    /// Watch the studio state.
    pub fn subscribe(&self) -> watch::Receiver<StudioState> {
        self.state.subscribe()
    }

    /// Snapshot of the studio state.
    pub fn state(&self) -> StudioState {
        self.state.borrow().clone()
    }

    pub fn reveal(&self) -> &RevealScheduler {
        &self.reveal
    }

    pub fn history(&self) -> Vec<SavedEntry> {
        self.state.borrow().history.clone()
    }

    pub fn phase(&self) -> Phase {
        let (pending, saved) = {
            let state = self.state.borrow();
            (state.pending, state.saved_current)
        };
        if pending {
            return Phase::Preface;
        }
        match self.reveal.snapshot() {
            None => Phase::Idle,
            Some(r) if r.is_preface() => Phase::Preface,
            Some(r) if !r.is_complete() => Phase::Revealing,
            Some(_) if saved => Phase::Saved,
            Some(_) => Phase::Complete,
        }
    }

    /// Whether the save action is enabled.
    pub fn can_save(&self) -> bool {
        self.phase() == Phase::Complete
    }

    /// Validate the form and generate.
    ///
    /// Resets transient state and abandons any earlier generation before
    /// calling the provider. Once the provider answers, the result starts
    /// revealing and this returns; use [`RevealScheduler::wait_complete`]
    /// to wait for the full text.
    ///
    /// # Errors
    ///
    /// [`StudioError::InvalidInput`] for a blank topic (nothing else changes),
    /// [`StudioError::GenerationFailure`] when the provider fails.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let (topic, content_type, token) = {
            let state = self.state.borrow();
            (state.topic.clone(), state.content_type.clone(), state.token.clone())
        };

        let request = match GenerationRequest::new(&topic, content_type) {
            Ok(request) => request,
            Err(e) => {
                debug!("Rejected blank topic");
                let message = e.user_message().map(str::to_string);
                self.state.send_modify(|s| s.error = message);
                return Err(e);
            }
        };

        let id = {
            let mut latest = self.latest();
            *latest += 1;
            self.reveal.cancel();
            self.notices.fetch_add(1, Ordering::SeqCst);
            self.state.send_modify(|s| {
                s.pending = true;
                s.error = None;
                s.success = None;
                s.saved_current = false;
            });
            *latest
        };

        info!(
            id,
            provider = self.provider.name(),
            content_type = %request.content_type(),
            token = %token,
            "Generating content"
        );
        debug!("Prompt: {}", request.prompt());

        let mut guard = PendingGuard {
            latest: &self.latest,
            state: &self.state,
            id,
            armed: true,
        };
        let outcome = self.provider.generate(&request).await;
        guard.armed = false;

        let latest = self.latest();
        if *latest != id {
            debug!(id, "Discarding superseded generation");
            return Ok(SubmitOutcome::Superseded);
        }

        match outcome {
            Ok(result) => {
                self.reveal.begin(result.clone());
                self.state.send_modify(|s| s.pending = false);
                drop(latest);
                self.show_success(GENERATED_MESSAGE);
                Ok(SubmitOutcome::Started(result))
            }
            Err(e) => {
                warn!("Generation failed: {}", e);
                self.reveal.cancel();
                self.state.send_modify(|s| {
                    s.pending = false;
                    s.error = Some(GENERATION_FAILURE_MESSAGE.to_string());
                });
                match e {
                    StudioError::GenerationFailure(_) => Err(e),
                    other => Err(StudioError::GenerationFailure(other.to_string())),
                }
            }
        }
    }

    /// Save the current result to history, at most once per generation.
    pub fn save(&self) -> SaveOutcome {
        // Holding the pipeline lock keeps a new submission from resetting
        // the saved flag between the snapshot and the append.
        let _latest = self.latest();
        let Some(reveal) = self.reveal.snapshot().filter(RevealState::is_complete) else {
            return SaveOutcome::NotReady;
        };
        if reveal.target().full_text.trim().is_empty() {
            return SaveOutcome::NotReady;
        }

        let entries = {
            let mut history = self.history_store();
            if self.state.borrow().saved_current {
                return SaveOutcome::AlreadySaved;
            }
            let entries = history.append(SavedEntry::from(reveal.target())).to_vec();
            self.state.send_modify(|s| {
                s.history = entries.clone();
                s.saved_current = true;
            });
            entries
        };

        info!("Saved {} to history ({} entries)", reveal.target().content_type, entries.len());
        self.show_success(SAVED_MESSAGE);
        SaveOutcome::Saved(entries.len())
    }

    /// Copy a result to the clipboard and flag the target as copied for the
    /// confirmation window. Returns `false` when the target does not exist.
    pub fn copy(&self, target: CopyTarget) -> bool {
        let text = match target {
            CopyTarget::Current => self.reveal.snapshot().map(|r| r.target().full_text.clone()),
            CopyTarget::History(index) => {
                self.history_store().get(index).map(|e| e.content.clone())
            }
        };
        let Some(text) = text else {
            return false;
        };

        if let Err(e) = self.clipboard.write_text(&text) {
            warn!("Copy failed: {}", e);
        }

        let ticket = self.copies.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.copied.insert(target, ticket);
        });

        let clock = Arc::clone(&self.clock);
        let state = Arc::clone(&self.state);
        let window = self.config.copy_confirm();
        tokio::spawn(async move {
            clock.sleep(window).await;
            state.send_if_modified(|s| {
                if s.copied.get(&target) == Some(&ticket) {
                    s.copied.remove(&target);
                    true
                } else {
                    false
                }
            });
        });
        true
    }

    fn show_success(&self, message: &str) {
        let notice = self.notices.fetch_add(1, Ordering::SeqCst) + 1;
        let text = message.to_string();
        self.state.send_modify(|s| s.success = Some(text));

        let clock = Arc::clone(&self.clock);
        let state = Arc::clone(&self.state);
        let notices = Arc::clone(&self.notices);
        let lifetime = self.config.success_clear();
        tokio::spawn(async move {
            clock.sleep(lifetime).await;
            state.send_if_modified(|s| {
                if notices.load(Ordering::SeqCst) == notice && s.success.is_some() {
                    s.success = None;
                    true
                } else {
                    false
                }
            });
        });
    }

    fn latest(&self) -> MutexGuard<'_, u64> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn history_store(&self) -> MutexGuard<'_, HistoryStore> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::{template, INVALID_INPUT_MESSAGE};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Counts calls and optionally fails.
    struct ScriptedProvider {
        inner: TemplateProvider,
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedProvider {
        fn new(fail: bool) -> Self {
            Self {
                inner: TemplateProvider::new(Duration::from_millis(1500)),
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ContentProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StudioError::GenerationFailure("socket closed".into()));
            }
            self.inner.generate(request).await
        }
    }

    fn studio(fail: bool) -> Studio<ScriptedProvider> {
        let history = HistoryStore::open(Arc::new(MemoryStore::new()));
        Studio::new(ScriptedProvider::new(fail), history)
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_topic_issues_no_request() {
        let studio = studio(false);
        for topic in ["", "   ", "\t\n"] {
            studio.set_topic(topic);
            let err = studio.submit().await.unwrap_err();
            assert!(matches!(err, StudioError::InvalidInput));
        }
        assert_eq!(studio.provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(studio.state().error.as_deref(), Some(INVALID_INPUT_MESSAGE));
        assert_eq!(studio.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_pipeline() {
        let studio = studio(false);
        studio.set_topic("  Coffee  ");
        studio.set_content_type(ContentType::InstagramCaption);

        let outcome = studio.submit().await.unwrap();
        let expected = template::generate("Coffee", &ContentType::InstagramCaption);
        assert_eq!(
            outcome,
            SubmitOutcome::Started(GenerationResult::new(
                expected.clone(),
                ContentType::InstagramCaption
            ))
        );
        assert_eq!(studio.state().success.as_deref(), Some(GENERATED_MESSAGE));
        assert!(!studio.can_save());

        let done = studio.reveal().wait_complete().await.unwrap();
        assert_eq!(done.revealed_text(), expected);
        assert_eq!(studio.phase(), Phase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preface_phase_while_pending() {
        let studio = Arc::new(studio(false));
        studio.set_topic("Tea");
        let task = {
            let studio = Arc::clone(&studio);
            tokio::spawn(async move { studio.submit().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(studio.phase(), Phase::Preface);
        assert!(studio.state().pending);
        task.await.unwrap().unwrap();
        assert!(!studio.state().pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_sets_message_and_clears_result() {
        let studio = studio(true);
        studio.set_topic("Tea");
        let err = studio.submit().await.unwrap_err();
        assert!(matches!(err, StudioError::GenerationFailure(_)));
        assert_eq!(err.to_string(), "Generation failed: socket closed");
        assert_eq!(studio.state().error.as_deref(), Some(GENERATION_FAILURE_MESSAGE));
        assert!(studio.reveal().snapshot().is_none());
        assert_eq!(studio.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_clears_pending() {
        let studio = studio(false);
        studio.set_topic("Tea");
        let res = tokio::time::timeout(Duration::from_millis(100), studio.submit()).await;
        assert!(res.is_err());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!studio.state().pending);
        assert_eq!(studio.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_keeps_newer_pending() {
        let studio = Arc::new(studio(false));
        studio.set_topic("Tea");
        let spawn_submit = |studio: &Arc<Studio<ScriptedProvider>>| {
            let studio = Arc::clone(studio);
            tokio::spawn(async move { studio.submit().await.map(|_| ()) })
        };
        let first = spawn_submit(&studio);
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = spawn_submit(&studio);
        tokio::time::sleep(Duration::from_millis(100)).await;

        first.abort();
        assert!(first.await.unwrap_err().is_cancelled());
        assert!(studio.state().pending);
        assert_eq!(studio.phase(), Phase::Preface);

        second.await.unwrap().unwrap();
        assert!(!studio.state().pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_refused_once_next_submit_starts() {
        let studio = Arc::new(studio(false));
        studio.set_topic("First");
        studio.submit().await.unwrap();
        studio.reveal().wait_complete().await.unwrap();

        studio.set_topic("Second");
        let task = {
            let studio = Arc::clone(&studio);
            tokio::spawn(async move { studio.submit().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(studio.save(), SaveOutcome::NotReady);
        assert!(studio.history().is_empty());
        assert!(!studio.state().saved_current);

        task.await.unwrap().unwrap();
        studio.reveal().wait_complete().await.unwrap();
        assert_eq!(studio.save(), SaveOutcome::Saved(1));
        assert!(studio.history()[0].content.contains("Second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_is_once_per_generation() {
        let studio = studio(false);
        studio.set_topic("Tea");
        assert_eq!(studio.save(), SaveOutcome::NotReady);

        studio.submit().await.unwrap();
        assert_eq!(studio.save(), SaveOutcome::NotReady);
        studio.reveal().wait_complete().await.unwrap();

        assert_eq!(studio.save(), SaveOutcome::Saved(1));
        assert_eq!(studio.save(), SaveOutcome::AlreadySaved);
        assert_eq!(studio.history().len(), 1);
        assert_eq!(studio.phase(), Phase::Saved);
        assert!(!studio.can_save());

        studio.submit().await.unwrap();
        assert!(!studio.state().saved_current);
        studio.reveal().wait_complete().await.unwrap();
        assert_eq!(studio.save(), SaveOutcome::Saved(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_message_clears() {
        let studio = studio(false);
        studio.set_topic("Tea");
        studio.submit().await.unwrap();
        assert!(studio.state().success.is_some());
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(studio.state().success.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_confirmation_is_per_target() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let studio = studio(false).with_clipboard(clipboard.clone());
        studio.set_topic("Tea");
        assert!(!studio.copy(CopyTarget::Current));

        studio.submit().await.unwrap();
        studio.reveal().wait_complete().await.unwrap();
        studio.save();

        assert!(studio.copy(CopyTarget::Current));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(studio.copy(CopyTarget::History(0)));
        assert!(!studio.copy(CopyTarget::History(5)));

        let state = studio.state();
        assert!(state.is_copied(CopyTarget::Current));
        assert!(state.is_copied(CopyTarget::History(0)));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let state = studio.state();
        assert!(!state.is_copied(CopyTarget::Current));
        assert!(state.is_copied(CopyTarget::History(0)));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(studio.state().copied.is_empty());
        assert_eq!(clipboard.writes().len(), 2);
        assert_eq!(clipboard.last(), Some(studio.history()[0].content.clone()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_again_restarts_window() {
        let studio = studio(false).with_clipboard(Arc::new(MemoryClipboard::new()));
        studio.set_topic("Tea");
        studio.submit().await.unwrap();
        studio.reveal().wait_complete().await.unwrap();

        assert!(studio.copy(CopyTarget::Current));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(studio.copy(CopyTarget::Current));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(studio.state().is_copied(CopyTarget::Current));

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!studio.state().is_copied(CopyTarget::Current));
    }
}
