//! Public playback state machine
//!
//! The controller is the only mutator of playback state. External
//! callers start, pause, resume, and stop playback here; the queue
//! driver reports back through a single-consumer event channel, and
//! every incoming event's session token is compared against the current
//! session before it is honored. Events from superseded or stopped
//! sessions are discarded, so no two sessions ever emit callbacks
//! concurrently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::backend::SpeechBackend;
use crate::config::PlaybackConfig;
use crate::core::error::Result;
use crate::text::segment;
use crate::voice::{select_voice, VoiceInfo};

use super::boundary::HighlightRange;
use super::driver::{self, QueueOutcome, SessionEvent, SessionEventKind};
use super::session::{PlaybackSession, SessionId};

/// Playback states
///
/// `Idle → Playing → {Paused ⇄ Playing} → Idle`; completion, stop, and
/// genuine backend failure all land back in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// Per-call options for `start`
#[derive(Debug, Clone)]
pub struct SpeakOptions {
    /// Speaking rate multiplier (1.0 = normal)
    pub rate: f32,
    /// Requested BCP 47 language tag
    pub language: String,
    /// Exact voice name to prefer, empty for none
    pub preferred_voice: String,
    /// Voice catalog to select from; when empty the backend's own
    /// catalog is queried fresh (hosts populate voices asynchronously)
    pub voices: Vec<VoiceInfo>,
}

impl SpeakOptions {
    /// Options with engine defaults for rate and language
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self {
            rate: config.default_rate,
            language: config.default_language.clone(),
            preferred_voice: String::new(),
            voices: Vec::new(),
        }
    }
}

impl Default for SpeakOptions {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}

/// Progress callback, receives a percentage in [0, 100]
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;
/// Highlight callback, receives the current range or `None` when cleared
pub type HighlightCallback = Arc<dyn Fn(Option<HighlightRange>) + Send + Sync>;
/// Session-end callback, fired on completion and on genuine failure
pub type SessionEndCallback = Arc<dyn Fn() + Send + Sync>;

/// Upward-facing callbacks the UI registers with the controller
///
/// Completion and failure are deliberately not distinguished here; both
/// arrive as a session end, and recovery is a UI-level decision.
#[derive(Clone, Default)]
pub struct PlaybackCallbacks {
    on_progress: Option<ProgressCallback>,
    on_highlight: Option<HighlightCallback>,
    on_session_end: Option<SessionEndCallback>,
}

impl PlaybackCallbacks {
    /// Empty callback set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a progress callback
    pub fn on_progress(mut self, f: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    /// Register a highlight callback
    pub fn on_highlight(
        mut self,
        f: impl Fn(Option<HighlightRange>) + Send + Sync + 'static,
    ) -> Self {
        self.on_highlight = Some(Arc::new(f));
        self
    }

    /// Register a session-end callback
    pub fn on_session_end(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_end = Some(Arc::new(f));
        self
    }

    fn emit_progress(&self, percent: u8) {
        if let Some(f) = &self.on_progress {
            f(percent);
        }
    }

    fn emit_highlight(&self, range: Option<HighlightRange>) {
        if let Some(f) = &self.on_highlight {
            f(range);
        }
    }

    fn emit_session_end(&self) {
        if let Some(f) = &self.on_session_end {
            f();
        }
    }
}

/// Controller's handle on the active session
struct CurrentSession {
    id: SessionId,
    cancelled: Arc<AtomicBool>,
    total_chars: usize,
}

/// Mutable controller state, guarded by one lock
struct Inner {
    state: PlaybackState,
    current: Option<CurrentSession>,
    progress: u8,
    highlight: Option<HighlightRange>,
}

struct ControllerShared {
    backend: Arc<dyn SpeechBackend>,
    config: PlaybackConfig,
    callbacks: PlaybackCallbacks,
    inner: Mutex<Inner>,
}

impl ControllerShared {
    /// Apply one driver event, discarding it if its session is stale
    fn handle_event(&self, event: SessionEvent) {
        let mut inner = self.inner.lock().unwrap();

        let current_id = inner.current.as_ref().map(|c| c.id);
        if current_id != Some(event.session) {
            trace!(session = %event.session, "discarding event from stale session");
            return;
        }

        match event.kind {
            SessionEventKind::Boundary {
                range,
                global_start,
            } => {
                let total = inner.current.as_ref().map(|c| c.total_chars).unwrap_or(0);
                let percent = progress_percent(global_start, total);
                inner.progress = percent;
                inner.highlight = Some(range);
                drop(inner);
                self.callbacks.emit_highlight(Some(range));
                self.callbacks.emit_progress(percent);
            }
            SessionEventKind::SegmentFinished { index } => {
                trace!(session = %event.session, index, "segment finished");
            }
            SessionEventKind::Ended { outcome } => match outcome {
                QueueOutcome::Completed => {
                    debug!(session = %event.session, "session completed");
                    inner.state = PlaybackState::Idle;
                    inner.current = None;
                    inner.progress = 100;
                    inner.highlight = None;
                    drop(inner);
                    self.callbacks.emit_progress(100);
                    self.callbacks.emit_highlight(None);
                    self.callbacks.emit_session_end();
                }
                QueueOutcome::Failed(err) => {
                    warn!(session = %event.session, error = %err, "session ended on backend failure");
                    inner.state = PlaybackState::Idle;
                    inner.current = None;
                    inner.highlight = None;
                    drop(inner);
                    self.callbacks.emit_highlight(None);
                    self.callbacks.emit_session_end();
                }
                QueueOutcome::Cancelled => {
                    // Cancellation artifact without a user stop; absorbed.
                    debug!(session = %event.session, "session cancelled");
                    inner.state = PlaybackState::Idle;
                    inner.current = None;
                    inner.highlight = None;
                    drop(inner);
                    self.callbacks.emit_highlight(None);
                }
            },
        }
    }
}

/// Percentage of the text reached, clamped to [0, 100]
fn progress_percent(global_start: usize, total_chars: usize) -> u8 {
    if total_chars == 0 {
        return 0;
    }
    let percent = (global_start as f64 / total_chars as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// The public-facing playback engine
///
/// Owns the event pump task consuming driver events; requires a running
/// tokio runtime. Dropping the controller cancels the active session.
pub struct PlaybackController {
    shared: Arc<ControllerShared>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    _pump: tokio::task::JoinHandle<()>,
}

impl PlaybackController {
    /// Create a controller over a speech backend
    pub fn new(
        backend: Arc<dyn SpeechBackend>,
        config: PlaybackConfig,
        callbacks: PlaybackCallbacks,
    ) -> Self {
        let shared = Arc::new(ControllerShared {
            backend,
            config,
            callbacks,
            inner: Mutex::new(Inner {
                state: PlaybackState::Idle,
                current: None,
                progress: 0,
                highlight: None,
            }),
        });

        let (events_tx, mut events_rx) = mpsc::unbounded_channel::<SessionEvent>();
        let pump_shared = Arc::clone(&shared);
        let pump = tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                pump_shared.handle_event(event);
            }
        });

        Self {
            shared,
            events_tx,
            _pump: pump,
        }
    }

    /// Begin speaking `text`, superseding any active session
    ///
    /// No-op when the trimmed text is empty or segmentation yields
    /// nothing; the controller stays `Idle` and emits no callbacks.
    /// Otherwise the old session (if any) is cancelled before the new
    /// one is installed, so its remaining callbacks are suppressed.
    pub fn start(&self, text: &str, options: &SpeakOptions) -> Result<()> {
        if text.trim().is_empty() {
            debug!("ignoring start with empty text");
            return Ok(());
        }

        let segments = segment(text);
        if segments.is_empty() {
            debug!("ignoring start with nothing to speak");
            return Ok(());
        }
        let total_chars = text.chars().count();

        let catalog = if options.voices.is_empty() {
            self.shared.backend.voices()
        } else {
            options.voices.clone()
        };
        let voice = select_voice(&catalog, &options.language, &options.preferred_voice).cloned();

        let session = PlaybackSession::new(
            segments,
            voice,
            options.rate,
            options.language.clone(),
            total_chars,
        );
        let session_id = session.id;
        let cancelled = session.cancellation_flag();

        {
            let mut inner = self.shared.inner.lock().unwrap();
            if let Some(previous) = inner.current.take() {
                debug!(old = %previous.id, new = %session_id, "superseding active session");
                previous.cancelled.store(true, Ordering::SeqCst);
            }
            inner.current = Some(CurrentSession {
                id: session_id,
                cancelled,
                total_chars,
            });
            inner.state = PlaybackState::Playing;
            inner.progress = 0;
            inner.highlight = None;
        }
        self.shared.callbacks.emit_progress(0);
        self.shared.callbacks.emit_highlight(None);

        debug!(session = %session_id, segments = session.segments.len(), "starting playback");

        let shared = Arc::clone(&self.shared);
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let mut session = session;
            let outcome =
                driver::run_queue(&shared.backend, &shared.config, &mut session, &events_tx).await;
            let _ = events_tx.send(SessionEvent {
                session: session.id,
                kind: SessionEventKind::Ended { outcome },
            });
        });

        Ok(())
    }

    /// Pause the in-flight utterance; valid only from `Playing`
    pub async fn pause(&self) -> Result<()> {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.state != PlaybackState::Playing {
                trace!(state = ?inner.state, "ignoring pause");
                return Ok(());
            }
            inner.state = PlaybackState::Paused;
        }
        self.shared.backend.pause().await
    }

    /// Resume a paused utterance; valid only from `Paused`
    pub async fn resume(&self) -> Result<()> {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if inner.state != PlaybackState::Paused {
                trace!(state = ?inner.state, "ignoring resume");
                return Ok(());
            }
            inner.state = PlaybackState::Playing;
        }
        self.shared.backend.resume().await
    }

    /// Stop playback immediately
    ///
    /// Cancels the session, flushes the backend, clears the highlight,
    /// and returns to `Idle`. Progress is left where it was; resetting
    /// it is the caller's choice. Later callbacks from the cancelled
    /// backend utterance are discarded as stale.
    pub async fn stop(&self) -> Result<()> {
        {
            let mut inner = self.shared.inner.lock().unwrap();
            if let Some(current) = inner.current.take() {
                debug!(session = %current.id, "stopping playback");
                current.cancelled.store(true, Ordering::SeqCst);
            }
            inner.state = PlaybackState::Idle;
            inner.highlight = None;
        }
        self.shared.backend.cancel_all().await?;
        self.shared.callbacks.emit_highlight(None);
        Ok(())
    }

    /// Stop when active, start when idle
    pub async fn toggle(&self, text: &str, options: &SpeakOptions) -> Result<()> {
        if self.state() == PlaybackState::Idle {
            self.start(text, options)
        } else {
            self.stop().await
        }
    }

    /// Flip between paused and playing
    pub async fn toggle_pause(&self) -> Result<()> {
        match self.state() {
            PlaybackState::Playing => self.pause().await,
            PlaybackState::Paused => self.resume().await,
            PlaybackState::Idle => Ok(()),
        }
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.shared.inner.lock().unwrap().state
    }

    /// Last reported progress percentage
    pub fn progress(&self) -> u8 {
        self.shared.inner.lock().unwrap().progress
    }

    /// Current highlight range, if any
    pub fn highlight(&self) -> Option<HighlightRange> {
        self.shared.inner.lock().unwrap().highlight
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.shared.inner.lock() {
            if let Some(current) = inner.current.take() {
                current.cancelled.store(true, Ordering::SeqCst);
            }
        }
    }
}
