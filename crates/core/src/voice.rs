//! Voice profiles: speaker parameters and the voices-directory loader.
//!
//! A voices directory contains one subfolder per voice, each holding a
//! single JSON profile. Profiles are immutable once handed to an engine;
//! switching voices means constructing a fresh engine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Immutable speaker parameters consumed by prosody and synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub name: String,
    pub gender: String,
    pub accent: String,
    /// Fundamental pitch in Hz (typical 85-145).
    pub base_pitch: f64,
    /// Formant divisor; > 1.0 darkens the voice.
    pub formant_scale: f64,
    /// Multiplies every phoneme duration.
    pub duration_scale: f64,
    /// Raw-noise amplitude scale in 0..1.
    pub noise_level: f64,
    /// Spectral-tilt adjustment in -1..+1.
    pub brightness: f64,
    #[serde(default)]
    pub description: String,
}

/// Built-in profiles used when no voices directory is found.
pub fn builtin_voices() -> Vec<VoiceProfile> {
    vec![
        VoiceProfile {
            name: "Default Female".into(),
            gender: "female".into(),
            accent: "neutral".into(),
            base_pitch: 130.0,
            formant_scale: 1.0,
            duration_scale: 1.0,
            noise_level: 0.35,
            brightness: 0.0,
            description: String::new(),
        },
        VoiceProfile {
            name: "Deep Male".into(),
            gender: "male".into(),
            accent: "neutral".into(),
            base_pitch: 85.0,
            formant_scale: 1.25,
            duration_scale: 0.95,
            noise_level: 0.32,
            brightness: -0.3,
            description: String::new(),
        },
        VoiceProfile {
            name: "Bright Female".into(),
            gender: "female".into(),
            accent: "neutral".into(),
            base_pitch: 145.0,
            formant_scale: 0.95,
            duration_scale: 1.05,
            noise_level: 0.38,
            brightness: 0.4,
            description: String::new(),
        },
    ]
}

/// Search the conventional locations for a voices directory.
pub fn find_voices_dir() -> Option<PathBuf> {
    ["voices", "./voices", "../voices"]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_dir())
}

/// Load a single profile from a JSON file.
fn load_profile(path: &Path) -> Result<VoiceProfile> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read voice profile: {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Invalid voice profile: {}", path.display()))
}

/// Load all voices from subfolders of `dir`, keyed by profile name.
///
/// Each subfolder is expected to hold one `*.json` profile. Per-voice load
/// failures are logged and skipped. A missing directory yields an empty map
/// so the caller can fall back to [`builtin_voices`].
pub fn load_voices(dir: &Path) -> HashMap<String, VoiceProfile> {
    let mut voices = HashMap::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            log::warn!("Voices directory not found: {}", dir.display());
            return voices;
        }
    };

    for entry in entries.flatten() {
        let folder = entry.path();
        if !folder.is_dir() {
            continue;
        }

        let json_file = std::fs::read_dir(&folder)
            .ok()
            .and_then(|mut files| {
                files.find_map(|f| {
                    let p = f.ok()?.path();
                    (p.extension().map(|e| e == "json").unwrap_or(false)).then_some(p)
                })
            });

        let Some(json_file) = json_file else {
            log::warn!("No profile JSON in {}", folder.display());
            continue;
        };

        match load_profile(&json_file) {
            Ok(profile) => {
                log::info!(
                    "Loaded voice: {} from {}/",
                    profile.name,
                    folder.file_name().unwrap_or_default().to_string_lossy()
                );
                voices.insert(profile.name.clone(), profile);
            }
            Err(e) => log::warn!("{:#}", e),
        }
    }

    voices
}

/// Profiles sorted by name for stable listings.
pub fn voice_list(voices: &HashMap<String, VoiceProfile>) -> Vec<&VoiceProfile> {
    let mut list: Vec<&VoiceProfile> = voices.values().collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    list
}

/// Case-insensitive lookup by profile name.
pub fn get_by_name<'a>(
    voices: &'a HashMap<String, VoiceProfile>,
    name: &str,
) -> Option<&'a VoiceProfile> {
    voices
        .values()
        .find(|v| v.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_voices_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("sibyl_test_voices").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_profile(dir: &Path, folder: &str, json: &str) {
        let vdir = dir.join(folder);
        std::fs::create_dir_all(&vdir).unwrap();
        std::fs::write(vdir.join(format!("{}.json", folder)), json).unwrap();
    }

    #[test]
    fn test_load_voices_basic() {
        let dir = temp_voices_dir("basic");
        write_profile(
            &dir,
            "diego",
            r#"{
                "name": "Diego", "gender": "male", "accent": "spanish",
                "base_pitch": 105.0, "formant_scale": 1.15,
                "duration_scale": 1.0, "noise_level": 0.30,
                "brightness": -0.15,
                "description": "Young adult male, moderate pitch."
            }"#,
        );

        let voices = load_voices(&dir);
        assert_eq!(voices.len(), 1);
        let diego = &voices["Diego"];
        assert_eq!(diego.base_pitch, 105.0);
        assert_eq!(diego.accent, "spanish");
        assert!(!diego.description.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_voices_missing_dir() {
        let voices = load_voices(Path::new("/nonexistent/voices"));
        assert!(voices.is_empty());
    }

    #[test]
    fn test_load_voices_skips_bad_json() {
        let dir = temp_voices_dir("bad");
        write_profile(&dir, "ok", r#"{
            "name": "Ok", "gender": "female", "accent": "neutral",
            "base_pitch": 130.0, "formant_scale": 1.0,
            "duration_scale": 1.0, "noise_level": 0.35, "brightness": 0.0
        }"#);
        write_profile(&dir, "broken", "not json at all");

        let voices = load_voices(&dir);
        assert_eq!(voices.len(), 1);
        assert!(voices.contains_key("Ok"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_description_defaults_empty() {
        let json = r#"{
            "name": "Terse", "gender": "male", "accent": "neutral",
            "base_pitch": 100.0, "formant_scale": 1.0,
            "duration_scale": 1.0, "noise_level": 0.3, "brightness": 0.0
        }"#;
        let profile: VoiceProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.description, "");
    }

    #[test]
    fn test_builtin_voices() {
        let voices = builtin_voices();
        assert_eq!(voices.len(), 3);
        assert!(voices.iter().any(|v| v.name == "Deep Male"));
        for v in &voices {
            assert!(v.base_pitch >= 85.0 && v.base_pitch <= 145.0);
            assert!(v.formant_scale >= 0.9 && v.formant_scale <= 1.3);
        }
    }

    #[test]
    fn test_voice_list_sorted() {
        let map: HashMap<String, VoiceProfile> = builtin_voices()
            .into_iter()
            .map(|v| (v.name.clone(), v))
            .collect();
        let list = voice_list(&map);
        assert_eq!(list[0].name, "Bright Female");
        assert_eq!(list[1].name, "Deep Male");
        assert_eq!(list[2].name, "Default Female");
    }

    #[test]
    fn test_get_by_name_case_insensitive() {
        let map: HashMap<String, VoiceProfile> = builtin_voices()
            .into_iter()
            .map(|v| (v.name.clone(), v))
            .collect();
        assert!(get_by_name(&map, "deep male").is_some());
        assert!(get_by_name(&map, "DEEP MALE").is_some());
        assert!(get_by_name(&map, "nobody").is_none());
    }
}
