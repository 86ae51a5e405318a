//! Sequential utterance queue driver
//!
//! Drives a session's segments through the speech backend strictly one
//! at a time: segment *i+1* is submitted only after segment *i* reports
//! natural completion, so the backend never holds two live utterances
//! and spoken output follows original text order.
//!
//! Before the first submission the driver flushes any prior in-flight
//! synthesis and waits out a short settling delay, which avoids races
//! where a stale cancellation fires after the new utterance starts.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::{debug, trace, warn};

use crate::backend::{SpeechBackend, Utterance, UtteranceEvent};
use crate::config::PlaybackConfig;
use crate::core::error::SpeechError;

use super::boundary::{self, HighlightRange};
use super::session::{PlaybackSession, SessionId};

/// How a queue run ended
#[derive(Debug)]
pub(crate) enum QueueOutcome {
    /// Every segment was spoken
    Completed,
    /// Cancellation was requested, or the backend reported a
    /// cancellation artifact; swallowed, nothing is surfaced
    Cancelled,
    /// A genuine backend failure ended the session early
    Failed(SpeechError),
}

/// Message from a session's driver to the controller's event pump
#[derive(Debug)]
pub(crate) struct SessionEvent {
    /// Token of the originating session
    pub session: SessionId,
    pub kind: SessionEventKind,
}

#[derive(Debug)]
pub(crate) enum SessionEventKind {
    /// A word boundary, already translated into original-text coordinates
    Boundary {
        range: HighlightRange,
        global_start: usize,
    },
    /// A segment finished speaking naturally
    SegmentFinished { index: usize },
    /// The queue run ended
    Ended { outcome: QueueOutcome },
}

/// Run a session's segment queue to completion, cancellation, or failure
///
/// Events for a cancelled session are never forwarded; the cancellation
/// flag is checked before every submission and before every event is
/// honored, since backend callbacks may arrive after cancellation was
/// requested.
pub(crate) async fn run_queue(
    backend: &Arc<dyn SpeechBackend>,
    config: &PlaybackConfig,
    session: &mut PlaybackSession,
    events: &mpsc::UnboundedSender<SessionEvent>,
) -> QueueOutcome {
    if let Err(err) = backend.cancel_all().await {
        return QueueOutcome::Failed(err);
    }

    // Let the flush settle before the first submission.
    if config.settle_delay_ms > 0 {
        sleep(Duration::from_millis(config.settle_delay_ms)).await;
    }

    while session.current_index < session.segments.len() {
        if session.is_cancelled() {
            return QueueOutcome::Cancelled;
        }

        let index = session.current_index;
        let segment = session.segments[index].clone();
        trace!(session = %session.id, index, text = %segment.text, "submitting segment");

        let utterance = Utterance {
            text: segment.text.clone(),
            rate: session.rate,
            language: session.language.clone(),
            pitch: config.pitch,
            volume: config.volume,
            voice: session.voice.clone(),
        };

        let mut rx = match backend.speak_one(utterance).await {
            Ok(rx) => rx,
            Err(err) => return QueueOutcome::Failed(err),
        };

        let mut finished = false;
        while let Some(event) = rx.recv().await {
            if session.is_cancelled() {
                trace!(session = %session.id, "suppressing event for cancelled session");
                return QueueOutcome::Cancelled;
            }

            match event {
                UtteranceEvent::Boundary {
                    char_index,
                    char_length,
                } => {
                    let range =
                        boundary::translate(&segment, char_index, char_length, session.total_chars);
                    let global_start =
                        (segment.source_offset + char_index).min(session.total_chars);
                    let _ = events.send(SessionEvent {
                        session: session.id,
                        kind: SessionEventKind::Boundary {
                            range,
                            global_start,
                        },
                    });
                }
                UtteranceEvent::Finished => {
                    finished = true;
                    break;
                }
                UtteranceEvent::Failed { kind, message } => {
                    if kind.is_cancellation() {
                        debug!(session = %session.id, %kind, "utterance interrupted by cancel");
                        return QueueOutcome::Cancelled;
                    }
                    warn!(session = %session.id, %kind, %message, "utterance failed");
                    return QueueOutcome::Failed(SpeechError::Backend { message, kind });
                }
            }
        }

        if !finished {
            // The backend dropped the event stream without a terminal event.
            return QueueOutcome::Failed(SpeechError::Internal {
                message: format!("utterance event stream closed early at segment {index}"),
                location: Some("playback::driver".to_string()),
            });
        }

        session.current_index += 1;
        let _ = events.send(SessionEvent {
            session: session.id,
            kind: SessionEventKind::SegmentFinished { index },
        });
    }

    QueueOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendCall, ScriptedBackend, UtteranceScript};
    use crate::core::error::BackendErrorKind;
    use crate::text::segment;

    fn session_over(text: &str) -> PlaybackSession {
        PlaybackSession::new(segment(text), None, 1.0, "en-US", text.chars().count())
    }

    fn test_config() -> PlaybackConfig {
        PlaybackConfig::default().with_settle_delay_ms(0)
    }

    fn collect_kinds(
        rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    ) -> Vec<SessionEventKind> {
        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        kinds
    }

    #[tokio::test]
    async fn test_completes_segments_strictly_in_order() {
        let backend: Arc<dyn SpeechBackend> = Arc::new(ScriptedBackend::new());
        let mut session = session_over("One. Two! Three?");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let outcome = run_queue(&backend, &test_config(), &mut session, &tx).await;
        assert!(matches!(outcome, QueueOutcome::Completed));
        assert_eq!(session.current_index, 3);

        let finished: Vec<usize> = collect_kinds(&mut rx)
            .into_iter()
            .filter_map(|k| match k {
                SessionEventKind::SegmentFinished { index } => Some(index),
                _ => None,
            })
            .collect();
        assert_eq!(finished, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_flushes_backend_before_first_submission() {
        let scripted = Arc::new(ScriptedBackend::new());
        let backend: Arc<dyn SpeechBackend> = scripted.clone();
        let mut session = session_over("Only one.");
        let (tx, _rx) = mpsc::unbounded_channel();

        run_queue(&backend, &test_config(), &mut session, &tx).await;

        let calls = scripted.calls();
        assert!(matches!(calls[0], BackendCall::CancelAll));
        assert!(matches!(calls[1], BackendCall::Speak(_)));
    }

    #[tokio::test]
    async fn test_utterance_carries_session_parameters() {
        let scripted = Arc::new(ScriptedBackend::new());
        let backend: Arc<dyn SpeechBackend> = scripted.clone();
        let mut session = PlaybackSession::new(
            segment("Bonjour."),
            Some(crate::voice::VoiceInfo::new("Amélie", "fr-FR")),
            1.5,
            "fr-FR",
            8,
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = test_config();

        run_queue(&backend, &config, &mut session, &tx).await;

        let spoken = scripted
            .calls()
            .into_iter()
            .find_map(|c| match c {
                BackendCall::Speak(u) => Some(u),
                _ => None,
            })
            .unwrap();
        assert_eq!(spoken.rate, 1.5);
        assert_eq!(spoken.language, "fr-FR");
        assert_eq!(spoken.pitch, config.pitch);
        assert_eq!(spoken.voice.unwrap().name, "Amélie");
    }

    #[tokio::test]
    async fn test_cancelled_before_start_submits_nothing() {
        let scripted = Arc::new(ScriptedBackend::new());
        let backend: Arc<dyn SpeechBackend> = scripted.clone();
        let mut session = session_over("Never spoken.");
        session.cancel();
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = run_queue(&backend, &test_config(), &mut session, &tx).await;
        assert!(matches!(outcome, QueueOutcome::Cancelled));
        assert!(scripted.spoken_texts().is_empty());
    }

    #[tokio::test]
    async fn test_interrupted_error_is_swallowed() {
        let scripted = Arc::new(ScriptedBackend::new());
        scripted.push_script(UtteranceScript::events(vec![UtteranceEvent::Failed {
            kind: BackendErrorKind::Interrupted,
            message: "interrupted".to_string(),
        }]));
        let backend: Arc<dyn SpeechBackend> = scripted.clone();
        let mut session = session_over("One. Two.");
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = run_queue(&backend, &test_config(), &mut session, &tx).await;
        assert!(matches!(outcome, QueueOutcome::Cancelled));
        // The queue stopped advancing: only the first segment was submitted.
        assert_eq!(scripted.spoken_texts(), vec!["One."]);
    }

    #[tokio::test]
    async fn test_genuine_error_fails_the_session() {
        let scripted = Arc::new(ScriptedBackend::new());
        scripted.push_script(UtteranceScript::events(vec![UtteranceEvent::Failed {
            kind: BackendErrorKind::SynthesisFailed,
            message: "voice engine crashed".to_string(),
        }]));
        let backend: Arc<dyn SpeechBackend> = scripted.clone();
        let mut session = session_over("One. Two.");
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = run_queue(&backend, &test_config(), &mut session, &tx).await;
        match outcome {
            QueueOutcome::Failed(SpeechError::Backend { kind, .. }) => {
                assert_eq!(kind, BackendErrorKind::SynthesisFailed);
            }
            other => panic!("expected backend failure, got {other:?}"),
        }
        assert_eq!(scripted.spoken_texts(), vec!["One."]);
    }

    #[tokio::test]
    async fn test_closed_stream_without_terminal_event_is_internal_failure() {
        let scripted = Arc::new(ScriptedBackend::new());
        scripted.push_script(UtteranceScript::events(vec![UtteranceEvent::Boundary {
            char_index: 0,
            char_length: 3,
        }]));
        let backend: Arc<dyn SpeechBackend> = scripted.clone();
        let mut session = session_over("One.");
        let (tx, _rx) = mpsc::unbounded_channel();

        let outcome = run_queue(&backend, &test_config(), &mut session, &tx).await;
        assert!(matches!(
            outcome,
            QueueOutcome::Failed(SpeechError::Internal { .. })
        ));
    }

    #[tokio::test]
    async fn test_boundaries_arrive_in_global_coordinates() {
        let backend: Arc<dyn SpeechBackend> = Arc::new(ScriptedBackend::new());
        let mut session = session_over("Hello world. How are you?");
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_queue(&backend, &test_config(), &mut session, &tx).await;

        let starts: Vec<usize> = collect_kinds(&mut rx)
            .into_iter()
            .filter_map(|k| match k {
                SessionEventKind::Boundary { global_start, .. } => Some(global_start),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![0, 6, 13, 17, 21]);
    }
}
