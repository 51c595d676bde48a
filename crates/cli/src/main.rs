//! Sibyl CLI — interactive formant text-to-speech.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use sibyl_core::audio::{write_wav, RodioSink};
use sibyl_core::voice::{self, VoiceProfile};
use sibyl_core::{Engine, MemorySink, SAMPLE_RATE};

#[derive(Parser)]
#[command(
    name = "sibyl",
    about = "Formant text-to-speech for Latin, Cyrillic, and Arabic text",
    version,
)]
struct Cli {
    /// Voices directory (default: search voices, ./voices, ../voices)
    #[arg(long)]
    voices_dir: Option<PathBuf>,

    /// Voice to start with (name, case-insensitive)
    #[arg(long)]
    voice: Option<String>,

    /// RNG seed for reproducible jitter and noise
    #[arg(long)]
    seed: Option<u64>,

    /// Speak this text and exit instead of starting the prompt
    #[arg(long)]
    text: Option<String>,

    /// Render to a WAV file instead of the audio device
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Discover voices; fall back to the built-in set.
    let voices_dir = cli.voices_dir.clone().or_else(voice::find_voices_dir);
    let mut voices: HashMap<String, VoiceProfile> = match &voices_dir {
        Some(dir) => {
            log::info!("Loading voices from: {}", dir.display());
            voice::load_voices(dir)
        }
        None => HashMap::new(),
    };
    if voices.is_empty() {
        log::info!("No voice profiles found; using built-in voices");
        voices = voice::builtin_voices()
            .into_iter()
            .map(|v| (v.name.clone(), v))
            .collect();
    }

    let mut current = match &cli.voice {
        Some(name) => voice::get_by_name(&voices, name)
            .with_context(|| format!("Voice '{}' not found", name))?
            .clone(),
        None => voice::voice_list(&voices)
            .first()
            .map(|v| (*v).clone())
            .context("No voice profiles available")?,
    };

    let mut engine = build_engine(&current, cli.seed)?;

    // One-shot mode.
    if let Some(text) = &cli.text {
        return speak(&mut engine, text, cli.wav.as_deref());
    }

    // Interactive prompt.
    println!("sibyl — formant text-to-speech");
    println!("Commands: /voices, voice <num|name>, exit");
    print_voices(&voices, &current.name);
    println!("Current voice: {}", current.name);

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.eq_ignore_ascii_case("/voices") {
            print_voices(&voices, &current.name);
            continue;
        }
        if let Some(rest) = input.strip_prefix("voice ") {
            match select_voice(&voices, rest.trim()) {
                Some(profile) => {
                    current = profile.clone();
                    // Profiles are immutable per engine; switching means a
                    // fresh one.
                    match build_engine(&current, cli.seed) {
                        Ok(e) => {
                            engine = e;
                            println!("Switched to: {}", current.name);
                        }
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                None => println!("Voice '{}' not found. Use /voices to list.", rest.trim()),
            }
            continue;
        }

        println!("Speaking as {}...", current.name);
        if let Err(e) = speak(&mut engine, input, cli.wav.as_deref()) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn build_engine(profile: &VoiceProfile, seed: Option<u64>) -> Result<Engine> {
    let engine = match seed {
        Some(s) => Engine::with_seed(profile.clone(), s),
        None => Engine::new(profile.clone()),
    }?;
    Ok(engine)
}

/// Speak to the device, or render to a WAV file when a path is given.
fn speak(engine: &mut Engine, text: &str, wav: Option<&std::path::Path>) -> Result<()> {
    match wav {
        Some(path) => {
            let mut sink = MemorySink::new();
            engine.speak(text, &mut sink)?;
            write_wav(path, &sink.samples, SAMPLE_RATE)?;
            println!("Wrote {}", path.display());
        }
        None => {
            let mut sink = RodioSink::open()?;
            engine.speak(text, &mut sink)?;
        }
    }
    Ok(())
}

/// Resolve a voice by 1-based list number or by name.
fn select_voice<'a>(
    voices: &'a HashMap<String, VoiceProfile>,
    choice: &str,
) -> Option<&'a VoiceProfile> {
    if let Ok(num) = choice.parse::<usize>() {
        let list = voice::voice_list(voices);
        if num >= 1 && num <= list.len() {
            return Some(list[num - 1]);
        }
        return None;
    }
    voice::get_by_name(voices, choice)
}

fn print_voices(voices: &HashMap<String, VoiceProfile>, current: &str) {
    println!("\n--- Available Voices ---");
    for (i, v) in voice::voice_list(voices).iter().enumerate() {
        let marker = if v.name == current { " [CURRENT]" } else { "" };
        println!("{}. {} ({}, {}){}", i + 1, v.name, v.gender, v.accent, marker);
        if !v.description.is_empty() {
            println!("   {}", v.description);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_voices() -> HashMap<String, VoiceProfile> {
        voice::builtin_voices()
            .into_iter()
            .map(|v| (v.name.clone(), v))
            .collect()
    }

    #[test]
    fn test_select_voice_by_number() {
        let voices = sample_voices();
        // List is sorted by name: Bright Female, Deep Male, Default Female.
        assert_eq!(select_voice(&voices, "1").unwrap().name, "Bright Female");
        assert_eq!(select_voice(&voices, "2").unwrap().name, "Deep Male");
        assert!(select_voice(&voices, "0").is_none());
        assert!(select_voice(&voices, "99").is_none());
    }

    #[test]
    fn test_select_voice_by_name() {
        let voices = sample_voices();
        assert_eq!(
            select_voice(&voices, "deep male").unwrap().name,
            "Deep Male"
        );
        assert!(select_voice(&voices, "nobody").is_none());
    }

    #[test]
    fn test_build_engine_seeded() {
        let voices = sample_voices();
        let profile = voice::get_by_name(&voices, "Deep Male").unwrap();
        assert!(build_engine(profile, Some(42)).is_ok());
    }
}
