//! Speech backend abstraction
//!
//! The host environment owns a single global speech channel (on the web
//! this is `speechSynthesis`); the engine depends on it only through the
//! [`SpeechBackend`] capability trait so tests can substitute a
//! deterministic implementation. Utterance progress is delivered as
//! discrete [`UtteranceEvent`] messages over a per-utterance channel
//! rather than nested callbacks, which makes cancellation races
//! observable and testable.

pub mod scripted;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::error::{BackendErrorKind, Result};
use crate::voice::VoiceInfo;

pub use scripted::{BackendCall, ScriptedBackend, UtteranceScript};

/// One configured synthesis request, covering a single segment
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Segment text to synthesize
    pub text: String,
    /// Speaking rate multiplier (1.0 = normal)
    pub rate: f32,
    /// BCP 47 language tag
    pub language: String,
    /// Pitch multiplier (1.0 = normal)
    pub pitch: f32,
    /// Volume in [0.0, 1.0]
    pub volume: f32,
    /// Resolved voice, if any; `None` lets the backend pick its default
    pub voice: Option<VoiceInfo>,
}

/// Progress notification for a single in-flight utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEvent {
    /// Synthesis reached a word within the utterance text
    ///
    /// `char_index` is the word's character offset within the utterance;
    /// `char_length` is its character length, or 0 when the backend does
    /// not report lengths.
    Boundary {
        char_index: usize,
        char_length: usize,
    },
    /// The utterance finished speaking naturally
    Finished,
    /// The utterance failed or was interrupted
    Failed {
        kind: BackendErrorKind,
        message: String,
    },
}

/// Receiving side of a single utterance's event stream
pub type UtteranceEvents = mpsc::UnboundedReceiver<UtteranceEvent>;

/// Capability interface over the host's speech synthesis channel
///
/// Implementations wrap whatever the platform provides. The engine
/// guarantees it never holds two live utterances concurrently: a new
/// `speak_one` is only issued after the previous utterance's stream
/// yielded `Finished` (or the session was cancelled).
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Current voice catalog
    ///
    /// May be empty early in the host's lifetime; hosts typically
    /// populate voices asynchronously and callers retry.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Cancel all queued and in-flight synthesis immediately
    async fn cancel_all(&self) -> Result<()>;

    /// Submit one utterance, returning its event stream
    ///
    /// The stream yields zero or more `Boundary` events followed by a
    /// terminal `Finished` or `Failed`.
    async fn speak_one(&self, utterance: Utterance) -> Result<UtteranceEvents>;

    /// Pause the in-flight utterance at the backend level
    async fn pause(&self) -> Result<()>;

    /// Resume a previously paused utterance
    async fn resume(&self) -> Result<()>;
}
