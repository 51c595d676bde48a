//! Grapheme-to-phoneme conversion for English, Russian, and Arabic.
//!
//! English is dictionary-first (CMU) with a rule fallback for
//! out-of-vocabulary words. Russian is a fixed per-character mapping.
//! Arabic walks the letters with article assimilation, gemination, and
//! diacritic vowels, inserting fathas heuristically when the input text
//! carries no diacritics.

use super::cmudict;
use super::script::{self, Script};

/// Convert a word to phonemes.
///
/// Returns the phoneme sequence (stress digits still attached where the
/// dictionary provides them) and a slow-language flag that stretches all
/// durations downstream.
pub fn predict(word: &str) -> (Vec<String>, bool) {
    match script::detect(word) {
        Script::Russian => (predict_russian(word), false),
        Script::Arabic => (predict_arabic(word), true),
        Script::English => (predict_english(word), false),
    }
}

// ─── English ─────────────────────────────────────────────────────

fn predict_english(word: &str) -> Vec<String> {
    if let Some(pron) = cmudict::lookup(word) {
        return pron.clone();
    }
    rule_fallback(&word.to_uppercase())
}

/// Ordered multi-character spelling patterns for the rule fallback.
const PATTERNS: &[(&str, &[&str])] = &[
    ("TION", &["SH", "AH", "N"]),
    ("ING", &["IH", "NG"]),
    ("OUS", &["AH", "S"]),
    ("IGHT", &["AY", "T"]),
    ("OUGH", &["OW"]),
    ("EE", &["IY"]),
    ("EA", &["IY"]),
    ("OO", &["UW"]),
    ("AI", &["EY"]),
    ("AY", &["EY"]),
    ("OA", &["OW"]),
    ("OW", &["OW"]),
    ("OU", &["AW"]),
    ("AU", &["AO"]),
    ("AR", &["AA", "R"]),
    ("SH", &["SH"]),
    ("CH", &["CH"]),
    ("TH", &["TH"]),
    ("PH", &["F"]),
    ("WH", &["W"]),
];

/// Rule-based fallback for words missing from the dictionary.
///
/// Greedy left-to-right match over `PATTERNS`, then single-letter
/// defaults: vowels become AH, S/T/R/L map to themselves, and any other
/// letter becomes T.
fn rule_fallback(word: &str) -> Vec<String> {
    let mut phonemes = Vec::new();
    let mut rest = word;

    'outer: while !rest.is_empty() {
        for (pat, out) in PATTERNS {
            if rest.starts_with(pat) {
                phonemes.extend(out.iter().map(|p| p.to_string()));
                rest = &rest[pat.len()..];
                continue 'outer;
            }
        }

        let c = rest.chars().next().unwrap();
        match c {
            'A' | 'E' | 'I' | 'O' | 'U' => phonemes.push("AH".to_string()),
            'S' | 'T' | 'R' | 'L' => phonemes.push(c.to_string()),
            _ => phonemes.push("T".to_string()),
        }
        rest = &rest[c.len_utf8()..];
    }

    phonemes
}

// ─── Russian ─────────────────────────────────────────────────────

/// Per-character phonemes for an uppercased Cyrillic letter.
fn russian_char(c: char) -> &'static [&'static str] {
    match c {
        'А' => &["AA"],
        'Б' => &["B"],
        'В' => &["V"],
        'Г' => &["G"],
        'Д' => &["D"],
        'Е' => &["IY", "EH"],
        'Ё' => &["IY", "AO"],
        'Ж' => &["ZH"],
        'З' => &["Z"],
        'И' => &["IY"],
        'Й' => &["Y"],
        'К' => &["K"],
        'Л' => &["L"],
        'М' => &["M"],
        'Н' => &["N"],
        'О' => &["AO"],
        'П' => &["P"],
        'Р' => &["RR"],
        'С' => &["S"],
        'Т' => &["T"],
        'У' => &["UW"],
        'Ф' => &["F"],
        'Х' => &["KH"],
        'Ц' => &["T", "S"],
        'Ч' => &["CH"],
        'Ш' => &["SH"],
        'Щ' => &["SH", "CH"],
        'Ъ' => &["PAUSE"],
        'Ы' => &["IH"],
        'Ь' => &[],
        'Э' => &["EH"],
        'Ю' => &["Y", "UW"],
        'Я' => &["Y", "AA"],
        _ => &[],
    }
}

fn predict_russian(word: &str) -> Vec<String> {
    word.to_uppercase()
        .chars()
        .flat_map(|c| russian_char(c).iter().map(|p| p.to_string()))
        .collect()
}

// ─── Arabic ──────────────────────────────────────────────────────

const ALEF: char = '\u{0627}';
const ALEF_MADDA: char = '\u{0622}';
const LAM: char = '\u{0644}';
const FATHA: char = '\u{064E}';
const DAMMA: char = '\u{064F}';
const KASRA: char = '\u{0650}';
const FATHATAN: char = '\u{064B}';
const DAMMATAN: char = '\u{064C}';
const KASRATAN: char = '\u{064D}';
const SHADDA: char = '\u{0651}';
const SUKUN: char = '\u{0652}';

/// Consonant (and long vowel) phoneme for an Arabic letter.
fn arabic_letter(c: char) -> Option<&'static str> {
    let p = match c {
        'ا' => "AA",
        'ب' => "B",
        'ت' => "T",
        'ث' => "TH",
        'ج' => "JH",
        'ح' => "H_AR",
        'خ' => "KH",
        'د' => "D",
        'ذ' => "DH",
        'ر' => "RR",
        'ز' => "Z",
        'س' => "S",
        'ش' => "SH",
        'ص' => "S_AR",
        'ض' => "D_AR",
        'ط' => "T_AR",
        'ظ' => "Z_AR",
        'ع' => "AIN",
        'غ' => "GH",
        'ف' => "F",
        'ق' => "Q",
        'ك' => "K",
        'ل' => "L",
        'م' => "M",
        'ن' => "N",
        'ه' => "HH",
        'و' => "UW",
        'ي' => "IY",
        'ة' => "T",
        'ء' | 'ؤ' | 'ئ' => "Q",
        'ى' => "AA",
        _ => return None,
    };
    Some(p)
}

/// Letters that assimilate the article lam.
fn is_sun_letter(c: char) -> bool {
    matches!(
        c,
        'ت' | 'ث' | 'د' | 'ذ' | 'ر' | 'ز' | 'س' | 'ش' | 'ص' | 'ض' | 'ط' | 'ظ' | 'ل' | 'ن'
    )
}

/// Letters that color a following fatha toward a back AA.
fn is_emphatic(c: char) -> bool {
    matches!(c, 'ص' | 'ض' | 'ط' | 'ظ' | 'ق' | 'غ' | 'خ' | 'ر')
}

fn is_long_vowel(c: char) -> bool {
    matches!(c, 'ا' | 'و' | 'ي' | 'ى' | ALEF_MADDA)
}

fn is_diacritic(c: char) -> bool {
    ('\u{064B}'..='\u{0652}').contains(&c)
}

/// Insert a fatha between adjacent plain consonants of undiacritized text.
///
/// Skipped after the lam of a word-initial definite article so that the
/// sun-letter assimilation rule still sees the bare `ا ل` prefix.
fn insert_heuristic_fathas(chars: &[char]) -> Vec<char> {
    let has_article = chars.len() >= 3 && chars[0] == ALEF && chars[1] == LAM;
    let mut result = Vec::with_capacity(chars.len() * 2);

    for (i, &c) in chars.iter().enumerate() {
        result.push(c);
        if i + 1 < chars.len()
            && arabic_letter(c).is_some()
            && arabic_letter(chars[i + 1]).is_some()
            && !is_long_vowel(c)
            && !(has_article && i == 1)
        {
            result.push(FATHA);
        }
    }

    result
}

fn predict_arabic(word: &str) -> Vec<String> {
    let raw: Vec<char> = word.chars().collect();
    let chars = if raw.iter().any(|&c| is_diacritic(c)) {
        raw
    } else {
        insert_heuristic_fathas(&raw)
    };

    let mut out: Vec<String> = Vec::new();
    let mut last_cons: Option<char> = None;
    let n = chars.len();
    let mut i = 0;

    while i < n {
        let c = chars[i];

        // Definite article assimilation: the lam disappears before a sun
        // letter and the article reduces to a bare vowel.
        if c == ALEF && i + 2 < n && chars[i + 1] == LAM && is_sun_letter(chars[i + 2]) {
            out.push("AE".to_string());
            last_cons = None;
            i += 2;
            continue;
        }

        if c == ALEF_MADDA {
            out.push("Q".to_string());
            out.push("AA".to_string());
            last_cons = None;
            i += 1;
            continue;
        }

        let fatha_vowel = if last_cons.map(is_emphatic).unwrap_or(false) {
            "AA"
        } else {
            "AE"
        };

        match c {
            FATHA => out.push(fatha_vowel.to_string()),
            FATHATAN => {
                out.push(fatha_vowel.to_string());
                out.push("N".to_string());
            }
            DAMMA => out.push("UH".to_string()),
            DAMMATAN => {
                out.push("UH".to_string());
                out.push("N".to_string());
            }
            KASRA => out.push("IH".to_string()),
            KASRATAN => {
                out.push("IH".to_string());
                out.push("N".to_string());
            }
            SUKUN | SHADDA => {}
            _ => {
                if let Some(p) = arabic_letter(c) {
                    out.push(p.to_string());
                    // Gemination: a shadda doubles the consonant.
                    if i + 1 < n && chars[i + 1] == SHADDA {
                        out.push(p.to_string());
                        i += 1;
                    }
                    last_cons = Some(c);
                }
            }
        }

        i += 1;
    }

    if out.is_empty() {
        out.push("AH".to_string());
    }
    out
}
