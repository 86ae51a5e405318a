//! Playback session identity and state

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::text::Segment;
use crate::voice::VoiceInfo;

/// Unique token identifying one playback session
///
/// Every event emitted on a session's behalf carries its token; the
/// controller honors an event only if the token matches the current
/// session. This is what makes stale-callback suppression an explicit,
/// inspectable invariant instead of a closure-captured flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One end-to-end playback request, from start to stop or completion
///
/// Exactly one session is active at a time; starting a new one cancels
/// any prior session. The queue driver owns the session while it runs;
/// the controller keeps only the token and the shared cancellation flag.
#[derive(Debug)]
pub struct PlaybackSession {
    /// Session token
    pub id: SessionId,
    /// Ordered speakable segments with source offsets
    pub segments: Vec<Segment>,
    /// Index of the segment currently being (or about to be) spoken
    pub current_index: usize,
    /// Level-triggered cancellation flag, shared with the controller
    cancelled: Arc<AtomicBool>,
    /// Resolved voice for the whole session, if any
    pub voice: Option<VoiceInfo>,
    /// Speaking rate multiplier
    pub rate: f32,
    /// BCP 47 language tag
    pub language: String,
    /// Character length of the original input text
    pub total_chars: usize,
}

impl PlaybackSession {
    /// Create a session over pre-segmented text
    pub fn new(
        segments: Vec<Segment>,
        voice: Option<VoiceInfo>,
        rate: f32,
        language: impl Into<String>,
        total_chars: usize,
    ) -> Self {
        Self {
            id: SessionId::new(),
            segments,
            current_index: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
            voice,
            rate,
            language: language.into(),
            total_chars,
        }
    }

    /// Handle to the shared cancellation flag
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}
