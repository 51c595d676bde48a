//! Audio output: rodio device sink and WAV export.

use std::path::Path;

use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink};

use crate::engine::AudioSink;
use crate::error::EngineError;
use crate::SAMPLE_RATE;

/// Plays batches through the default output device as they arrive.
///
/// Batches are appended to the rodio queue; `finish` blocks until the
/// device has drained everything, so `speak` returns only after the
/// utterance has actually been heard.
pub struct RodioSink {
    _stream: OutputStream,
    sink: Sink,
}

impl RodioSink {
    /// Open the default output device for mono f32 playback.
    pub fn open() -> std::result::Result<Self, EngineError> {
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| EngineError::AudioSink(format!("failed to open output device: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| EngineError::AudioSink(format!("failed to create sink: {}", e)))?;
        Ok(Self { _stream, sink })
    }
}

impl AudioSink for RodioSink {
    fn write(&mut self, samples: &[f32]) -> std::result::Result<(), EngineError> {
        if samples.is_empty() {
            return Ok(());
        }
        let source = SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec());
        self.sink.append(source);
        Ok(())
    }

    fn finish(&mut self) -> std::result::Result<(), EngineError> {
        self.sink.sleep_until_end();
        Ok(())
    }
}

/// Write f32 samples to a 16-bit PCM WAV file.
///
/// Clips values to [-1, 1] before conversion and creates parent
/// directories if needed.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    for &sample in samples {
        let clipped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clipped * 32767.0) as i16)?;
    }

    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("sibyl_test_audio");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_write_wav_spec() {
        let path = temp_wav_path("spec.wav");
        let samples: Vec<f32> = (0..4800)
            .map(|i| (i as f32 / 4800.0 * std::f32::consts::TAU).sin() * 0.5)
            .collect();
        write_wav(&path, &samples, SAMPLE_RATE).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 4800);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_write_wav_clips_values() {
        let path = temp_wav_path("clip.wav");
        write_wav(&path, &[-2.0, 0.0, 2.0], SAMPLE_RATE).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], -32767);
        assert_eq!(samples[1], 0);
        assert_eq!(samples[2], 32767);

        std::fs::remove_file(&path).ok();
    }
}
