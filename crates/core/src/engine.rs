//! The render driver: batches the event stream, runs the track generator
//! and synthesizer, and pushes finished PCM to an audio sink.
//!
//! Batches flush at natural break-points (pauses, breaths, end of
//! stream) or when a word boundary arrives with a full buffer. Filter
//! state and the glottal phase roll across batches so one utterance
//! streams continuously; they reset only at the start of each `speak`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{EngineError, Result};
use crate::parser::{self, Event};
use crate::synth::{self, Synth};
use crate::tracks::{self, Prosody};
use crate::voice::VoiceProfile;

/// Word-boundary flushes wait until the buffer holds this many events.
const BATCH_EVENT_LIMIT: usize = 15;

/// Destination for synthesized PCM frames (mono f32 at 48 kHz).
pub trait AudioSink {
    /// Consume a contiguous buffer of frames. May block for backpressure.
    fn write(&mut self, samples: &[f32]) -> Result<()>;

    /// Called once after the last batch of an utterance.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink that collects samples in memory, for tests and WAV export.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub samples: Vec<f32>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for MemorySink {
    fn write(&mut self, samples: &[f32]) -> Result<()> {
        self.samples.extend_from_slice(samples);
        Ok(())
    }
}

/// A text-to-speech engine bound to one voice profile.
pub struct Engine {
    voice: VoiceProfile,
    prosody: Prosody,
    synth: Synth,
    rng: StdRng,
}

impl Engine {
    /// Build an engine for a voice. Fails fast on nonsense profiles.
    pub fn new(voice: VoiceProfile) -> Result<Self> {
        Self::with_rng(voice, StdRng::from_entropy())
    }

    /// Build an engine with a fixed RNG seed so the pitch jitter and
    /// noise are reproducible.
    pub fn with_seed(voice: VoiceProfile, seed: u64) -> Result<Self> {
        Self::with_rng(voice, StdRng::seed_from_u64(seed))
    }

    fn with_rng(voice: VoiceProfile, rng: StdRng) -> Result<Self> {
        if voice.name.trim().is_empty() {
            return Err(EngineError::Config("voice profile has no name".into()));
        }
        if !(voice.base_pitch.is_finite() && voice.base_pitch > 0.0) {
            return Err(EngineError::Config(format!(
                "voice '{}' has invalid base_pitch {}",
                voice.name, voice.base_pitch
            )));
        }
        if !(voice.formant_scale.is_finite() && voice.formant_scale > 0.0) {
            return Err(EngineError::Config(format!(
                "voice '{}' has invalid formant_scale {}",
                voice.name, voice.formant_scale
            )));
        }

        Ok(Self {
            voice,
            prosody: Prosody::new(),
            synth: Synth::new(),
            rng,
        })
    }

    pub fn voice(&self) -> &VoiceProfile {
        &self.voice
    }

    /// Reset glottal phase, filter state, and prosodic memory.
    pub fn reset_filters(&mut self) {
        self.synth.reset();
        self.prosody.reset();
    }

    /// Synthesize `text` and stream it to `sink`, batch by batch.
    pub fn speak(&mut self, text: &str, sink: &mut dyn AudioSink) -> Result<()> {
        log::debug!("Synthesizing: '{}'", text);
        self.reset_filters();

        let events = parser::parse_text(text);
        let mut batch: Vec<Event> = Vec::new();

        for event in events {
            let mandatory = event.is_mandatory_break();
            let is_boundary = matches!(event, Event::WordBoundary);
            batch.push(event);

            if mandatory || (is_boundary && batch.len() > BATCH_EVENT_LIMIT) {
                self.flush(&batch, sink)?;
                batch.clear();
            }
        }

        sink.finish()
    }

    /// Convenience: synthesize into memory and return the samples.
    pub fn synthesize(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut sink = MemorySink::new();
        self.speak(text, &mut sink)?;
        Ok(sink.samples)
    }

    fn flush(&mut self, batch: &[Event], sink: &mut dyn AudioSink) -> Result<()> {
        let mut t = tracks::generate(batch, &self.voice, &mut self.prosody, &mut self.rng);
        if t.is_empty() {
            return Ok(());
        }

        tracks::smooth(&mut t);
        let mut wave = self.synth.render(&t, &self.voice, &mut self.rng);
        synth::post_process(&mut wave);

        let pcm: Vec<f32> = wave.iter().map(|&s| s as f32).collect();
        log::trace!("Flushed batch: {} events, {} samples", batch.len(), pcm.len());
        sink.write(&pcm)
    }
}
