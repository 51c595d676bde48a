//! sibyl-core — a formant text-to-speech synthesizer.
//!
//! Converts text in Latin, Cyrillic, or Arabic script into a 48 kHz mono
//! PCM stream using a Klatt-style source-filter model: no neural
//! acoustics, no concatenative units, just a sawtooth glottal source, a
//! four-resonator filter bank, noise bands, and stop bursts.
//!
//! Pipeline: [`parser`] segments text into an event stream (running
//! [`language::g2p`] per word), [`engine::Engine`] batches events at
//! natural break-points, [`tracks`] turns each batch into dense 2 ms
//! parameter tracks, and [`synth`] renders them to samples that stream
//! into an [`engine::AudioSink`].

pub mod audio;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod language;
pub mod parser;
pub mod phoneme;
pub mod synth;
pub mod tracks;
pub mod voice;

pub use engine::{AudioSink, Engine, MemorySink};
pub use error::EngineError;
pub use voice::VoiceProfile;

/// Output sample rate in Hz.
pub const SAMPLE_RATE: u32 = 48_000;
/// Parameter-track granularity: one frame per this many milliseconds.
pub const BLOCK_MS: f64 = 2.0;
/// Samples per track frame (2 ms at 48 kHz).
pub const BLOCK_SAMPLES: usize = 96;
