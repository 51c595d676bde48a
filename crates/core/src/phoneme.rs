//! Static phoneme and plosive tables.
//!
//! Every symbol the G2P stage can emit is keyed here. Vowels and sonorants
//! carry four formant targets; fricatives carry only a duration and a gain
//! (their spectrum comes from the noise bands); stops carry nothing and are
//! rendered entirely from their [`PlosiveEntry`].

use std::collections::HashMap;
use std::sync::OnceLock;

/// Categorical phoneme class, drives the track-generation branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonemeType {
    Vowel,
    Fricative,
    Stop,
    Pause,
    VoicedFricative,
    Glide,
    VowelLike,
}

/// One row of the phoneme table.
#[derive(Debug, Clone, Copy)]
pub struct PhonemeEntry {
    /// Base duration in milliseconds before prosodic scaling.
    pub dur_ms: f64,
    /// F1..F4 target frequencies in Hz (0.0 where not applicable).
    pub formants: [f64; 4],
    /// Nominal gain in dB.
    pub gain_db: f64,
    pub kind: PhonemeType,
}

/// Aspiration released after a voiceless stop burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aspiration {
    /// Breathy /h/-like release (K, P, Q).
    H,
    /// Sibilant release (T).
    S,
    /// Long palato-alveolar release (CH).
    ShHard,
    /// Voiced palato-alveolar release (JH).
    Zh,
    /// Pharyngealized sibilant release (T_AR).
    SAr,
}

/// Closure/burst/aspiration parameters for a stop consonant.
#[derive(Debug, Clone, Copy)]
pub struct PlosiveEntry {
    pub closure_ms: f64,
    /// Burst noise center frequency in Hz.
    pub burst_hz: f64,
    /// Voicing-bar amplitude during closure (0.0 voiceless, ~0.9 voiced).
    pub voicing_bar: f64,
    /// F2 locus the formant tracks point at during closure.
    pub locus_f2: f64,
    /// F3 locus during closure.
    pub locus_f3: f64,
    pub aspiration: Option<Aspiration>,
    /// Burst gain in dB.
    pub burst_db: f64,
}

use Aspiration::*;
use PhonemeType::*;

type PhonemeRow = (&'static str, f64, [f64; 4], f64, PhonemeType);

#[rustfmt::skip]
const PHONEME_ROWS: &[PhonemeRow] = &[
    // Vowels
    ("IY", 85.0,  [270.0, 2250.0, 2890.0, 3500.0], -1.0, Vowel),
    ("IH", 65.0,  [390.0, 1950.0, 2650.0, 3400.0],  0.0, Vowel),
    ("EH", 85.0,  [520.0, 1750.0, 2450.0, 3350.0],  0.0, Vowel),
    ("AE", 105.0, [720.0, 1680.0, 2350.0, 3350.0],  1.0, Vowel),
    ("AA", 95.0,  [730.0, 1090.0, 2330.0, 3400.0],  2.0, Vowel),
    ("AO", 95.0,  [610.0,  920.0, 2350.0, 3300.0],  1.0, Vowel),
    ("OW", 105.0, [460.0,  920.0, 2250.0, 3250.0],  1.0, Glide),
    ("UH", 75.0,  [430.0, 1150.0, 2250.0, 3300.0],  0.0, Vowel),
    ("UW", 85.0,  [330.0,  890.0, 2150.0, 3250.0], -1.0, Vowel),
    ("AH", 75.0,  [640.0, 1240.0, 2450.0, 3350.0], -1.0, Vowel),
    ("ER", 105.0, [490.0, 1350.0, 1550.0, 3250.0], -1.0, Vowel),
    ("AX", 55.0,  [520.0, 1560.0, 2450.0, 3350.0], -3.0, Vowel),
    ("EY", 115.0, [460.0, 1950.0, 2450.0, 3350.0],  0.0, Glide),
    ("AY", 125.0, [650.0, 1950.0, 2550.0, 3400.0],  1.0, Glide),
    ("AW", 125.0, [700.0, 1150.0, 2350.0, 3350.0],  1.0, Glide),
    ("OY", 125.0, [600.0,  950.0, 2250.0, 3350.0],  0.0, Glide),
    // Fricatives
    ("S",  115.0, [0.0, 0.0, 0.0, 0.0],  -9.0, Fricative),
    ("SH", 115.0, [0.0, 0.0, 0.0, 0.0], -11.0, Fricative),
    ("Z",  105.0, [360.0, 1750.0, 2850.0, 3650.0],  -9.0, VoicedFricative),
    ("ZH", 105.0, [360.0, 1550.0, 2450.0, 3450.0], -11.0, VoicedFricative),
    ("F",  95.0,  [0.0, 0.0, 0.0, 0.0], -14.0, Fricative),
    ("V",  85.0,  [310.0, 1450.0, 2450.0, 3450.0], -11.0, VoicedFricative),
    ("TH", 95.0,  [0.0, 0.0, 0.0, 0.0], -17.0, Fricative),
    ("DH", 75.0,  [320.0, 1550.0, 2550.0, 3450.0], -14.0, VoicedFricative),
    ("HH", 75.0,  [0.0, 0.0, 0.0, 0.0], -19.0, Fricative),
    // Nasals and liquids
    ("M",  85.0, [290.0, 1050.0, 2250.0, 3550.0], -4.0, Vowel),
    ("N",  85.0, [290.0, 1750.0, 2700.0, 3550.0], -4.0, Vowel),
    ("NG", 95.0, [290.0, 1250.0, 2450.0, 3550.0], -5.0, Vowel),
    ("L",  95.0, [420.0, 1150.0, 3050.0, 3700.0], -1.0, Vowel),
    ("R",  95.0, [370.0, 1380.0, 1600.0, 3400.0], -1.0, Vowel),
    ("W",  95.0, [320.0,  650.0, 2250.0, 3300.0],  0.0, Glide),
    ("Y",  95.0, [320.0, 2250.0, 3150.0, 3750.0],  0.0, Glide),
    // Stops (silence + burst, no formant targets of their own)
    ("K",  0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    ("G",  0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    ("P",  0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    ("B",  0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    ("T",  0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    ("D",  0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    ("CH", 0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    ("JH", 0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Stop),
    // Arabic and Russian specials
    ("KH",   115.0, [0.0, 0.0, 0.0, 0.0], -11.0, Fricative),
    ("GH",   105.0, [420.0, 1280.0, 2480.0, 3450.0],  -9.0, VoicedFricative),
    ("Q",    0.0,   [0.0, 0.0, 0.0, 0.0],   0.0, Stop),
    ("RR",   75.0,  [420.0, 1450.0, 2050.0, 3550.0],  -1.0, Vowel),
    ("AIN",  105.0, [820.0, 1380.0, 2580.0, 3550.0],  -1.0, VoicedFricative),
    ("H_AR", 95.0,  [0.0, 0.0, 0.0, 0.0], -13.0, Fricative),
    ("S_AR", 115.0, [0.0, 0.0, 0.0, 0.0],  -9.0, Fricative),
    ("D_AR", 0.0,   [0.0, 0.0, 0.0, 0.0],   0.0, Stop),
    ("T_AR", 0.0,   [0.0, 0.0, 0.0, 0.0],   0.0, Stop),
    ("Z_AR", 85.0,  [0.0, 0.0, 0.0, 0.0], -14.0, VoicedFricative),
    // Structural (a hard sign in Russian maps here)
    ("PAUSE", 0.0, [0.0, 0.0, 0.0, 0.0], 0.0, Pause),
];

type PlosiveRow = (
    &'static str,
    f64,
    f64,
    f64,
    f64,
    f64,
    Option<Aspiration>,
    f64,
);

#[rustfmt::skip]
const PLOSIVE_ROWS: &[PlosiveRow] = &[
    //  sym    cl    burst   vbar  loc_f2  loc_f3  asp            b_db
    ("G",    50.0, 1500.0, 0.90, 1200.0, 2400.0, None,         -20.0),
    ("K",    60.0, 1800.0, 0.00, 1200.0, 2400.0, Some(H),      -10.0),
    ("D",    40.0, 3500.0, 0.90, 1800.0, 2800.0, None,         -18.0),
    ("T",    50.0, 3800.0, 0.00, 1800.0, 2800.0, Some(S),      -10.0),
    ("B",    45.0,  700.0, 0.90,  800.0, 2300.0, None,         -20.0),
    ("P",    55.0,  700.0, 0.00,  800.0, 2300.0, Some(H),      -12.0),
    ("JH",   45.0, 3500.0, 0.90, 1800.0, 2600.0, Some(Zh),     -15.0),
    ("CH",   55.0, 4000.0, 0.00, 1800.0, 2600.0, Some(ShHard), -12.0),
    ("Q",    70.0, 1000.0, 0.00,  900.0, 2400.0, Some(H),      -10.0),
    ("D_AR", 55.0, 3000.0, 0.90, 1100.0, 2700.0, None,         -18.0),
    ("T_AR", 65.0, 3300.0, 0.00, 1100.0, 2700.0, Some(SAr),    -10.0),
];

/// Diphthong start/end vowel qualities for glide interpolation.
const DIPHTHONGS: &[(&str, (&str, &str))] = &[
    ("AY", ("AA", "IY")),
    ("EY", ("EH", "IY")),
    ("OY", ("AO", "IY")),
    ("AW", ("AA", "UW")),
    ("OW", ("AO", "UW")),
];

static PHONEMES: OnceLock<HashMap<&'static str, PhonemeEntry>> = OnceLock::new();
static PLOSIVES: OnceLock<HashMap<&'static str, PlosiveEntry>> = OnceLock::new();

fn phoneme_table() -> &'static HashMap<&'static str, PhonemeEntry> {
    PHONEMES.get_or_init(|| {
        PHONEME_ROWS
            .iter()
            .map(|&(sym, dur_ms, formants, gain_db, kind)| {
                (
                    sym,
                    PhonemeEntry {
                        dur_ms,
                        formants,
                        gain_db,
                        kind,
                    },
                )
            })
            .collect()
    })
}

fn plosive_table() -> &'static HashMap<&'static str, PlosiveEntry> {
    PLOSIVES.get_or_init(|| {
        PLOSIVE_ROWS
            .iter()
            .map(
                |&(sym, closure_ms, burst_hz, voicing_bar, locus_f2, locus_f3, aspiration, burst_db)| {
                    (
                        sym,
                        PlosiveEntry {
                            closure_ms,
                            burst_hz,
                            voicing_bar,
                            locus_f2,
                            locus_f3,
                            aspiration,
                            burst_db,
                        },
                    )
                },
            )
            .collect()
    })
}

/// Look up a phoneme by symbol. Unknown symbols return `None` and are
/// skipped by the track generator.
pub fn entry(sym: &str) -> Option<&'static PhonemeEntry> {
    phoneme_table().get(sym)
}

/// Look up plosive parameters for a stop. Stops without their own row
/// fall back to the `T` entry.
pub fn plosive(sym: &str) -> &'static PlosiveEntry {
    let table = plosive_table();
    table.get(sym).unwrap_or_else(|| &table["T"])
}

/// Start/end vowels of a diphthong, if `sym` is one.
pub fn diphthong(sym: &str) -> Option<(&'static str, &'static str)> {
    DIPHTHONGS
        .iter()
        .find(|(s, _)| *s == sym)
        .map(|&(_, pair)| pair)
}

/// Convert a dB gain to linear amplitude. Anything at or below -90 dB
/// is treated as silence.
pub fn db_to_lin(db: f64) -> f64 {
    if db <= -90.0 {
        0.0
    } else {
        10.0f64.powf(db / 20.0)
    }
}
