//! Playback orchestration: sessions, queue driving, and the state machine

pub mod boundary;
pub mod controller;
pub(crate) mod driver;
pub mod session;

pub use boundary::{translate, HighlightRange};
pub use controller::{
    HighlightCallback, PlaybackCallbacks, PlaybackController, PlaybackState, ProgressCallback,
    SessionEndCallback, SpeakOptions,
};
pub use session::{PlaybackSession, SessionId};
