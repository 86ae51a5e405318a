//! Playback engine configuration

use serde::{Deserialize, Serialize};

/// Tunable parameters of the playback engine
///
/// Defaults match what sounds natural on the common host backends: a
/// slightly raised pitch, full volume, and a 100 ms settling delay
/// between flushing prior synthesis and submitting the first utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Delay between the backend flush and the first submission, in ms
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Pitch multiplier applied to every utterance
    #[serde(default = "default_pitch")]
    pub pitch: f32,
    /// Volume applied to every utterance, in [0.0, 1.0]
    #[serde(default = "default_volume")]
    pub volume: f32,
    /// Rate used when the caller does not specify one
    #[serde(default = "default_rate")]
    pub default_rate: f32,
    /// Language tag used when the caller does not specify one
    #[serde(default = "default_language")]
    pub default_language: String,
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_pitch() -> f32 {
    1.05
}

fn default_volume() -> f32 {
    1.0
}

fn default_rate() -> f32 {
    1.0
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            pitch: default_pitch(),
            volume: default_volume(),
            default_rate: default_rate(),
            default_language: default_language(),
        }
    }
}

impl PlaybackConfig {
    /// Set the settling delay (0 disables it; useful in tests)
    pub fn with_settle_delay_ms(mut self, ms: u64) -> Self {
        self.settle_delay_ms = ms;
        self
    }

    /// Set the utterance pitch multiplier
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    /// Set the utterance volume
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    /// Set the default speaking rate
    pub fn with_default_rate(mut self, rate: f32) -> Self {
        self.default_rate = rate;
        self
    }

    /// Set the default language tag
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }
}
