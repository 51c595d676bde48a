//! Typed engine errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine constructed without a usable voice profile, or a referenced
    /// voice is missing. Fatal at construction time.
    #[error("voice configuration error: {0}")]
    Config(String),

    /// A write to the audio sink failed. The current utterance is aborted;
    /// the engine resets its filter state at the start of the next one.
    #[error("audio sink error: {0}")]
    AudioSink(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
