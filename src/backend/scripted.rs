//! Deterministic speech backend for tests and demos
//!
//! Replays pre-scripted event sequences per submitted utterance and
//! records every call it receives, so playback scenarios (including
//! cancellation races) can be asserted without a real synthesis stack.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::error::Result;
use crate::voice::VoiceInfo;

use super::{SpeechBackend, Utterance, UtteranceEvent, UtteranceEvents};

/// A recorded backend invocation
#[derive(Debug, Clone)]
pub enum BackendCall {
    CancelAll,
    Speak(Utterance),
    Pause,
    Resume,
}

/// Scripted behavior for one `speak_one` call
#[derive(Debug, Clone, Default)]
pub struct UtteranceScript {
    /// Events to deliver, in order
    pub events: Vec<UtteranceEvent>,
    /// Keep the event channel open after delivering `events`
    ///
    /// A held channel never terminates on its own; late events can be
    /// injected with [`ScriptedBackend::emit_held`] to simulate stale
    /// backend callbacks arriving after cancellation.
    pub hold_open: bool,
}

impl UtteranceScript {
    /// Script that delivers the given events and then closes
    pub fn events(events: Vec<UtteranceEvent>) -> Self {
        Self {
            events,
            hold_open: false,
        }
    }

    /// Script that delivers the given events and stays open
    pub fn held(events: Vec<UtteranceEvent>) -> Self {
        Self {
            events,
            hold_open: true,
        }
    }
}

/// Speech backend that replays scripted event sequences
///
/// When no script is queued for an utterance, word boundaries are
/// derived from the utterance text itself followed by `Finished`,
/// which is what a well-behaved host backend reports.
#[derive(Default)]
pub struct ScriptedBackend {
    voices: Vec<VoiceInfo>,
    scripts: Mutex<VecDeque<UtteranceScript>>,
    held: Mutex<Vec<mpsc::UnboundedSender<UtteranceEvent>>>,
    calls: Mutex<Vec<BackendCall>>,
}

impl ScriptedBackend {
    /// Create a backend with an empty voice catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend advertising the given voices
    pub fn with_voices(voices: Vec<VoiceInfo>) -> Self {
        Self {
            voices,
            ..Self::default()
        }
    }

    /// Queue a script for the next unscripted `speak_one` call
    pub fn push_script(&self, script: UtteranceScript) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Inject a late event into every held utterance channel
    ///
    /// Returns the number of channels the event reached.
    pub fn emit_held(&self, event: UtteranceEvent) -> usize {
        let held = self.held.lock().unwrap();
        held.iter()
            .filter(|tx| tx.send(event.clone()).is_ok())
            .count()
    }

    /// Snapshot of all recorded calls, in order
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Texts of all submitted utterances, in order
    pub fn spoken_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Speak(u) => Some(u.text),
                _ => None,
            })
            .collect()
    }

    /// The `index`-th submitted utterance
    ///
    /// Panics when fewer utterances were submitted; intended for test
    /// assertions.
    pub fn spoken_utterance(&self, index: usize) -> Utterance {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Speak(u) => Some(u),
                _ => None,
            })
            .nth(index)
            .expect("no utterance submitted at that index")
    }

    /// Number of `cancel_all` calls received
    pub fn cancel_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::CancelAll))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Word boundaries for a text, as (char_index, char_length) pairs
    fn word_boundaries(text: &str) -> Vec<(usize, usize)> {
        let mut boundaries = Vec::new();
        let mut index = 0usize;
        let mut word_start = None;
        let mut word_len = 0usize;

        for c in text.chars() {
            if c.is_whitespace() {
                if let Some(start) = word_start.take() {
                    boundaries.push((start, word_len));
                    word_len = 0;
                }
            } else {
                if word_start.is_none() {
                    word_start = Some(index);
                }
                word_len += 1;
            }
            index += 1;
        }
        if let Some(start) = word_start {
            boundaries.push((start, word_len));
        }

        boundaries
    }
}

#[async_trait]
impl SpeechBackend for ScriptedBackend {
    fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.clone()
    }

    async fn cancel_all(&self) -> Result<()> {
        self.record(BackendCall::CancelAll);
        Ok(())
    }

    async fn speak_one(&self, utterance: Utterance) -> Result<UtteranceEvents> {
        self.record(BackendCall::Speak(utterance.clone()));

        let (tx, rx) = mpsc::unbounded_channel();
        let script = self.scripts.lock().unwrap().pop_front();

        match script {
            Some(script) => {
                for event in script.events {
                    let _ = tx.send(event);
                }
                if script.hold_open {
                    self.held.lock().unwrap().push(tx);
                }
            }
            None => {
                for (char_index, char_length) in Self::word_boundaries(&utterance.text) {
                    let _ = tx.send(UtteranceEvent::Boundary {
                        char_index,
                        char_length,
                    });
                }
                let _ = tx.send(UtteranceEvent::Finished);
            }
        }

        Ok(rx)
    }

    async fn pause(&self) -> Result<()> {
        self.record(BackendCall::Pause);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.record(BackendCall::Resume);
        Ok(())
    }
}
