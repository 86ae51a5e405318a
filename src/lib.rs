//! # readaloud - Speech Playback Orchestration Engine
//!
//! An engine for driving assistive read-aloud playback over an external
//! speech-synthesis backend: it segments free-form text into speakable
//! sentences, selects a synthesis voice, queues utterances strictly one
//! at a time, and maps backend word-boundary events back onto character
//! offsets in the *original* text so highlighting, progress reporting,
//! and pause/resume stay correct.
//!
//! ## Features
//!
//! - **Offset-correct segmentation**: sentence splitting with a monotonic
//!   forward scan recording each sentence's position in the source text
//! - **Deterministic voice selection**: language filter, exact-name match,
//!   quality-keyword preference, cascading fallbacks
//! - **Sequential utterance queue**: one live utterance at a time, with
//!   cancel-then-start flushing and a settling delay against backend races
//! - **Stale-callback suppression**: every event carries a session token;
//!   events from superseded or stopped sessions are discarded
//! - **Injected backend**: the host speech channel sits behind a trait, so
//!   tests replay deterministic boundary/completion/error sequences
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use readaloud::{
//!     PlaybackCallbacks, PlaybackConfig, PlaybackController, SpeakOptions,
//! };
//!
//! let backend = Arc::new(MyPlatformBackend::new());
//! let callbacks = PlaybackCallbacks::new()
//!     .on_progress(|pct| println!("{pct}%"))
//!     .on_highlight(|range| println!("{range:?}"))
//!     .on_session_end(|| println!("done"));
//!
//! let controller = PlaybackController::new(backend, PlaybackConfig::default(), callbacks);
//! controller.start("Hello world. How are you?", &SpeakOptions::default())?;
//! ```
//!
//! ## Testing
//!
//! The [`backend::ScriptedBackend`] replays scripted event sequences and
//! records every call, making playback scenarios (including cancellation
//! races) fully deterministic:
//!
//! ```rust,ignore
//! let backend = Arc::new(ScriptedBackend::with_voices(vec![
//!     VoiceInfo::new("Samantha", "en-US"),
//! ]));
//! let controller = PlaybackController::new(backend.clone(), config, callbacks);
//! ```

pub mod backend;
pub mod config;
pub mod core;
pub mod playback;
pub mod text;
pub mod voice;

// Core framework re-exports
pub use crate::core::error::{BackendErrorKind, Result, ResultExt, SpeechError, TextOperation};

// Configuration re-exports
pub use config::PlaybackConfig;

// Text re-exports
pub use text::{segment, Segment};

// Voice re-exports
pub use voice::{select_voice, VoiceInfo, PREFERRED_KEYWORDS};

// Backend re-exports
pub use backend::{
    BackendCall, ScriptedBackend, SpeechBackend, Utterance, UtteranceEvent, UtteranceEvents,
    UtteranceScript,
};

// Playback re-exports
pub use playback::{
    HighlightRange, PlaybackCallbacks, PlaybackController, PlaybackSession, PlaybackState,
    SessionId, SpeakOptions,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
