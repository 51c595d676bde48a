//! Text parsing into the unified event stream.
//!
//! Raw text is cleaned, split on sentence/clause punctuation, and turned
//! into an ordered sequence of phoneme and structural events. The stream
//! always ends with [`Event::EndOfStream`].

use crate::language::g2p;

/// Short pause injected after a run of words, before punctuation.
pub const WORD_PAUSE_MS: f64 = 45.0;
/// Pause after a comma.
pub const CLAUSE_PAUSE_MS: f64 = 200.0;
/// Pause after a sentence terminator.
pub const SENTENCE_PAUSE_MS: f64 = 450.0;
/// Breath after a sentence terminator.
pub const BREATH_MS: f64 = 600.0;
/// Silence tail closing every stream.
pub const TAIL_MS: f64 = 3000.0;

/// One element of the parsed stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Phoneme {
        sym: String,
        /// Lexical stress: 0 = none, 1 = primary, 2 = secondary.
        stress: u8,
        /// Stretch durations for deliberate languages (Arabic).
        slow_lang: bool,
    },
    WordBoundary,
    Pause { ms: f64 },
    Breath { ms: f64 },
    EndOfStream { ms: f64 },
}

impl Event {
    /// Pause, breath, and end-of-stream force a render flush.
    pub fn is_mandatory_break(&self) -> bool {
        matches!(
            self,
            Event::Pause { .. } | Event::Breath { .. } | Event::EndOfStream { .. }
        )
    }
}

fn keep_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(c, '.' | ',' | '!' | '?')
        || ('\u{0400}'..='\u{04FF}').contains(&c)
        || ('\u{0600}'..='\u{06FF}').contains(&c)
}

/// Run G2P on every word of `chunk` and append phoneme + word-boundary
/// events. Returns the number of events appended.
fn emit_words(chunk: &str, events: &mut Vec<Event>) -> usize {
    let before = events.len();

    for word in chunk.split_whitespace() {
        let (pron, slow_lang) = g2p::predict(word);
        for p in &pron {
            let stress = p
                .chars()
                .last()
                .and_then(|c| c.to_digit(10))
                .unwrap_or(0) as u8;
            let sym = p.trim_end_matches(|c: char| c.is_ascii_digit());
            if sym.is_empty() {
                continue;
            }
            events.push(Event::Phoneme {
                sym: sym.to_string(),
                stress,
                slow_lang,
            });
        }
        events.push(Event::WordBoundary);
    }

    events.len() - before
}

/// Segment raw text into the event stream.
pub fn parse_text(text: &str) -> Vec<Event> {
    let clean: String = text.chars().filter(|&c| keep_char(c)).collect();

    let mut events = Vec::new();
    let mut chunk = String::new();

    for c in clean.chars() {
        if !matches!(c, '.' | ',' | '!' | '?') {
            chunk.push(c);
            continue;
        }

        let emitted = emit_words(&chunk, &mut events);
        chunk.clear();
        if emitted > 0 {
            events.push(Event::Pause { ms: WORD_PAUSE_MS });
        }

        if c == ',' {
            events.push(Event::Pause { ms: CLAUSE_PAUSE_MS });
        } else {
            events.push(Event::Pause { ms: SENTENCE_PAUSE_MS });
            events.push(Event::Breath { ms: BREATH_MS });
        }
    }

    emit_words(&chunk, &mut events);
    events.push(Event::EndOfStream { ms: TAIL_MS });
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phonemes_of(events: &[Event]) -> Vec<&str> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Phoneme { sym, .. } => Some(sym.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_input_is_only_tail() {
        let events = parse_text("");
        assert_eq!(events, vec![Event::EndOfStream { ms: TAIL_MS }]);
    }

    #[test]
    fn test_always_ends_with_tail() {
        for text in ["hi", "hello, world.", "...", "да", "سلام"] {
            let events = parse_text(text);
            assert_eq!(events.last(), Some(&Event::EndOfStream { ms: TAIL_MS }));
        }
    }

    #[test]
    fn test_lone_period() {
        // No words means no 45 ms pause, just the terminator events.
        let events = parse_text(".");
        assert_eq!(
            events,
            vec![
                Event::Pause { ms: SENTENCE_PAUSE_MS },
                Event::Breath { ms: BREATH_MS },
                Event::EndOfStream { ms: TAIL_MS },
            ]
        );
    }

    #[test]
    fn test_word_boundary_after_each_word() {
        let events = parse_text("да да");
        let boundaries = events
            .iter()
            .filter(|e| **e == Event::WordBoundary)
            .count();
        assert_eq!(boundaries, 2);
    }

    #[test]
    fn test_comma_and_sentence_pauses() {
        let events = parse_text("да, да.");
        let comma_pos = events
            .iter()
            .position(|e| *e == Event::Pause { ms: CLAUSE_PAUSE_MS })
            .expect("comma pause missing");
        // The word run before the comma ends with the short pause.
        assert_eq!(events[comma_pos - 1], Event::Pause { ms: WORD_PAUSE_MS });

        // Sentence terminator: 45ms pause, 450ms pause, breath, tail.
        let n = events.len();
        assert_eq!(events[n - 4], Event::Pause { ms: WORD_PAUSE_MS });
        assert_eq!(events[n - 3], Event::Pause { ms: SENTENCE_PAUSE_MS });
        assert_eq!(events[n - 2], Event::Breath { ms: BREATH_MS });
    }

    #[test]
    fn test_stress_digits_decoded() {
        // Russian G2P emits no digits, so build the check on raw symbols:
        // no emitted phoneme symbol may end with a digit.
        let events = parse_text("привет hello world один");
        for e in &events {
            if let Event::Phoneme { sym, stress, .. } = e {
                assert!(!sym.ends_with(|c: char| c.is_ascii_digit()));
                assert!(*stress <= 2);
            }
        }
    }

    #[test]
    fn test_strips_disallowed_chars() {
        let a = parse_text("да");
        let b = parse_text("#@$да%^&*()");
        assert_eq!(a, b);
    }

    #[test]
    fn test_russian_word() {
        let events = parse_text("да");
        assert_eq!(phonemes_of(&events), vec!["D", "AA"]);
        if let Event::Phoneme { slow_lang, .. } = &events[0] {
            assert!(!slow_lang);
        }
    }

    #[test]
    fn test_arabic_word_is_slow() {
        let events = parse_text("سلام");
        assert!(events.iter().any(
            |e| matches!(e, Event::Phoneme { slow_lang, .. } if *slow_lang)
        ));
    }

    #[test]
    fn test_parse_deterministic() {
        let a = parse_text("hello, world. да سلام");
        let b = parse_text("hello, world. да سلام");
        assert_eq!(a, b);
    }

    #[test]
    fn test_mandatory_break_classification() {
        assert!(Event::Pause { ms: 45.0 }.is_mandatory_break());
        assert!(Event::Breath { ms: 600.0 }.is_mandatory_break());
        assert!(Event::EndOfStream { ms: 3000.0 }.is_mandatory_break());
        assert!(!Event::WordBoundary.is_mandatory_break());
        let ph = Event::Phoneme {
            sym: "AA".into(),
            stress: 0,
            slow_lang: false,
        };
        assert!(!ph.is_mandatory_break());
    }
}
