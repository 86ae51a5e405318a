//! Text processing for speech playback

pub mod segmenter;

pub use segmenter::{segment, Segment};
