//! Structured error handling for the playback engine
//!
//! Provides a hierarchical error type system with backend error
//! classification and user-friendly error messages.

use std::fmt;

use thiserror::Error;

/// Result type alias with SpeechError
pub type Result<T> = std::result::Result<T, SpeechError>;

/// Main error type for the playback engine
///
/// Most expected conditions (missing voices, segmentation fallbacks,
/// cancellation artifacts) are absorbed inside the engine and never
/// reach this type; it covers the fallible backend plumbing and
/// internal invariant violations.
#[derive(Error, Debug, Clone)]
pub enum SpeechError {
    /// Speech backend errors
    #[error("Backend error ({kind}): {message}")]
    Backend {
        message: String,
        kind: BackendErrorKind,
    },

    /// Text processing errors
    #[error("Text processing error ({operation}): {message}")]
    Text {
        message: String,
        operation: TextOperation,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Internal/bug errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        location: Option<String>,
    },
}

/// Classification of errors reported by the speech backend
///
/// `Interrupted` and `Canceled` are the expected artifacts of a
/// deliberate cancel-then-restart and are swallowed by the queue
/// driver; every other kind terminates the session early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Utterance interrupted by a cancel request
    Interrupted,
    /// Utterance canceled before it started
    Canceled,
    /// Synthesis itself failed
    SynthesisFailed,
    /// Audio output device unavailable or busy
    AudioUnavailable,
    /// Backend-specific error code
    Other(String),
}

impl BackendErrorKind {
    /// Whether this error is an expected artifact of cancellation
    /// rather than a genuine failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, BackendErrorKind::Interrupted | BackendErrorKind::Canceled)
    }

    /// Parse a backend error code string into a kind
    pub fn from_code(code: &str) -> Self {
        match code {
            "interrupted" => BackendErrorKind::Interrupted,
            "canceled" | "cancelled" => BackendErrorKind::Canceled,
            "synthesis-failed" => BackendErrorKind::SynthesisFailed,
            "audio-busy" | "audio-hardware" => BackendErrorKind::AudioUnavailable,
            other => BackendErrorKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendErrorKind::Interrupted => write!(f, "interrupted"),
            BackendErrorKind::Canceled => write!(f, "canceled"),
            BackendErrorKind::SynthesisFailed => write!(f, "synthesis failed"),
            BackendErrorKind::AudioUnavailable => write!(f, "audio unavailable"),
            BackendErrorKind::Other(code) => write!(f, "{}", code),
        }
    }
}

/// Text operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOperation {
    Segmentation,
    OffsetMapping,
}

impl fmt::Display for TextOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOperation::Segmentation => write!(f, "segmentation"),
            TextOperation::OffsetMapping => write!(f, "offset mapping"),
        }
    }
}

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add a simple message context
    fn context(self, msg: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| SpeechError::Internal {
            message: format!("{}: {}", f(), e),
            location: None,
        })
    }

    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| SpeechError::Internal {
            message: format!("{}: {}", msg.into(), e),
            location: None,
        })
    }
}

/// Convert from anyhow::Error
impl From<anyhow::Error> for SpeechError {
    fn from(err: anyhow::Error) -> Self {
        SpeechError::Internal {
            message: err.to_string(),
            location: None,
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for SpeechError {
    fn from(err: std::io::Error) -> Self {
        SpeechError::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpeechError::Backend {
            message: "device lost".to_string(),
            kind: BackendErrorKind::AudioUnavailable,
        };
        assert!(err.to_string().contains("Backend error"));
        assert!(err.to_string().contains("audio unavailable"));
        assert!(err.to_string().contains("device lost"));
    }

    #[test]
    fn test_cancellation_classification() {
        assert!(BackendErrorKind::Interrupted.is_cancellation());
        assert!(BackendErrorKind::Canceled.is_cancellation());
        assert!(!BackendErrorKind::SynthesisFailed.is_cancellation());
        assert!(!BackendErrorKind::Other("network".into()).is_cancellation());
    }

    #[test]
    fn test_kind_from_code() {
        assert_eq!(BackendErrorKind::from_code("interrupted"), BackendErrorKind::Interrupted);
        assert_eq!(BackendErrorKind::from_code("cancelled"), BackendErrorKind::Canceled);
        assert_eq!(
            BackendErrorKind::from_code("weird"),
            BackendErrorKind::Other("weird".to_string())
        );
    }

    #[test]
    fn test_result_ext_context() {
        let base: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = base.context("submitting utterance").unwrap_err();
        assert!(err.to_string().contains("submitting utterance"));
        assert!(err.to_string().contains("boom"));
    }
}
