//! Script detection by Unicode block.

/// Writing system of a word, selecting the G2P strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    English,
    Russian,
    Arabic,
}

/// Classify a word: Cyrillic code points win over Arabic, anything else
/// is treated as English.
pub fn detect(word: &str) -> Script {
    if word.chars().any(|c| ('\u{0400}'..='\u{04FF}').contains(&c)) {
        return Script::Russian;
    }
    if word.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c)) {
        return Script::Arabic;
    }
    Script::English
}
