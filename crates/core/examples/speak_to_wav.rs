//! Render a phrase to a WAV file without touching the audio device.
//!
//! Run with: cargo run -p sibyl-core --example speak_to_wav

use sibyl_core::audio::write_wav;
use sibyl_core::voice;
use sibyl_core::{Engine, MemorySink, SAMPLE_RATE};

fn main() {
    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "hello, world.".to_string());

    let profile = voice::builtin_voices().remove(0);
    println!("Voice: {} ({} Hz)", profile.name, profile.base_pitch);

    let mut engine = Engine::with_seed(profile, 42).expect("valid built-in profile");
    let mut sink = MemorySink::new();
    engine.speak(&text, &mut sink).expect("synthesis failed");

    let seconds = sink.samples.len() as f64 / SAMPLE_RATE as f64;
    println!("Rendered {:.2}s ({} samples)", seconds, sink.samples.len());

    let path = std::path::Path::new("speak.wav");
    write_wav(path, &sink.samples, SAMPLE_RATE).expect("failed to write WAV");
    println!("Wrote {}", path.display());
}
