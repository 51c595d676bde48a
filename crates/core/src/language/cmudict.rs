//! CMU Pronouncing Dictionary loading and lookup.
//!
//! Format: one word per line, "WORD  PH1 PH2 PH3 ..." with stress digits
//! suffixed on vowels. Lines starting with ";;;" are comments; pronunciation
//! variants are marked "WORD(2)".
//!
//! The process-wide dictionary is loaded once from the first existing path
//! among `cmudict.txt`, `./cmudict.txt`, `../cmudict.txt`, or the
//! `CMUDICT_PATH` environment variable. When no file is found, lookups
//! return `None` and English G2P deterministically uses its rule fallback.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

/// An in-memory pronunciation dictionary keyed by lowercased word.
#[derive(Debug, Default)]
pub struct CmuDict {
    entries: HashMap<String, Vec<Vec<String>>>,
}

impl CmuDict {
    /// Parse dictionary text in the CMU format.
    pub fn parse(data: &str) -> Self {
        let mut entries: HashMap<String, Vec<Vec<String>>> = HashMap::new();

        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(";;;") {
                continue;
            }

            let Some((word_raw, phonemes_str)) = line.split_once(' ') else {
                continue;
            };

            // Strip variant marker: WORD(2) -> WORD
            let word = word_raw
                .split('(')
                .next()
                .unwrap_or(word_raw)
                .to_lowercase();

            let phonemes: Vec<String> = phonemes_str
                .split_whitespace()
                .map(|s| s.to_string())
                .collect();

            if !phonemes.is_empty() {
                entries.entry(word).or_default().push(phonemes);
            }
        }

        Self { entries }
    }

    /// Load a dictionary file from disk.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(Self::parse(&data))
    }

    /// First pronunciation variant for a word, if present.
    pub fn lookup(&self, word: &str) -> Option<&Vec<String>> {
        self.entries
            .get(&word.to_lowercase())
            .and_then(|variants| variants.first())
    }

    /// All pronunciation variants for a word.
    pub fn lookup_all(&self, word: &str) -> Option<&Vec<Vec<String>>> {
        self.entries.get(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static DICT: OnceLock<CmuDict> = OnceLock::new();

/// The process-wide dictionary, loaded on first use.
pub fn global() -> &'static CmuDict {
    DICT.get_or_init(|| {
        let mut candidates = vec![
            "cmudict.txt".to_string(),
            "./cmudict.txt".to_string(),
            "../cmudict.txt".to_string(),
        ];
        if let Ok(env_path) = std::env::var("CMUDICT_PATH") {
            candidates.insert(0, env_path);
        }

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.is_file() {
                match CmuDict::load(path) {
                    Ok(dict) => {
                        log::info!("Loaded CMU dictionary: {} ({} words)", candidate, dict.len());
                        return dict;
                    }
                    Err(e) => log::warn!("Failed to read {}: {}", candidate, e),
                }
            }
        }

        log::info!("No CMU dictionary found; English words use the rule fallback");
        CmuDict::default()
    })
}

/// First pronunciation of a word from the process-wide dictionary.
pub fn lookup(word: &str) -> Option<&'static Vec<String>> {
    global().lookup(word)
}
