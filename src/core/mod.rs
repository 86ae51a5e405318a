//! Core framework components

pub mod error;

pub use error::{BackendErrorKind, Result, ResultExt, SpeechError, TextOperation};
