//! Voice catalog types and selection

pub mod selector;

use serde::{Deserialize, Serialize};

pub use selector::{select_voice, PREFERRED_KEYWORDS};

/// A synthesis voice advertised by the host environment
///
/// Catalog entries are read-only; the engine never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Voice name (e.g. "Samantha", "Google US English")
    pub name: String,
    /// BCP 47 language tag (e.g. "en-US")
    pub language: String,
}

impl VoiceInfo {
    /// Create a catalog entry
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}
