//! Prosody and parameter-track generation.
//!
//! Turns a batch of stream events into dense per-frame tracks: formants,
//! pitch, voiced/fricative amplitudes, noise-band mixes, and burst
//! markers. One frame covers `BLOCK_MS` of audio. After generation all
//! continuous channels are Gaussian-smoothed; the burst channel is a
//! sparse impulse train and stays untouched.

use rand::rngs::StdRng;
use rand::Rng;

use crate::parser::Event;
use crate::phoneme::{self, Aspiration, PhonemeType};
use crate::voice::VoiceProfile;
use crate::BLOCK_MS;

/// Pitch floor in Hz.
const PITCH_MIN: f64 = 75.0;
/// Pitch ceiling above the voice's base pitch.
const PITCH_SPAN: f64 = 55.0;
/// Per-event decay of the sentence-energy scalar.
const ENERGY_DECAY: f64 = 0.97;
const ENERGY_FLOOR: f64 = 0.45;
/// Intra-syllable pitch arc amplitude (Hz).
const ARC_GLIDE: f64 = 8.0;
const ARC_PLAIN: f64 = 5.0;
/// Aspiration length after a voiceless stop burst.
const ASPIRATION_MS: f64 = 30.0;
const ASPIRATION_LONG_MS: f64 = 120.0;

/// Struct-of-arrays parameter tracks for one batch.
#[derive(Debug, Clone, Default)]
pub struct Tracks {
    pub f1: Vec<f64>,
    pub f2: Vec<f64>,
    pub f3: Vec<f64>,
    pub f4: Vec<f64>,
    pub pitch: Vec<f64>,
    pub av: Vec<f64>,
    pub af: Vec<f64>,
    pub mix_s: Vec<f64>,
    pub mix_mid: Vec<f64>,
    pub mix_h: Vec<f64>,
    pub burst: Vec<f64>,
}

impl Tracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pitch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitch.is_empty()
    }

    fn push_frame(
        &mut self,
        f: [f64; 4],
        pitch: f64,
        av: f64,
        af: f64,
        mix: [f64; 3],
        burst: f64,
    ) {
        self.f1.push(f[0]);
        self.f2.push(f[1]);
        self.f3.push(f[2]);
        self.f4.push(f[3]);
        self.pitch.push(pitch);
        self.av.push(av);
        self.af.push(af);
        self.mix_s.push(mix[0]);
        self.mix_mid.push(mix[1]);
        self.mix_h.push(mix[2]);
        self.burst.push(burst);
    }
}

/// Prosodic state carried across batches within one utterance.
///
/// `tempo_clock` deliberately survives `reset` so consecutive utterances
/// don't restart the tempo wobble from the same phase.
#[derive(Debug, Clone)]
pub struct Prosody {
    pub last_pitch: f64,
    pub last_f: [f64; 4],
    pub sentence_energy: f64,
    pub tempo_clock: f64,
}

impl Prosody {
    pub fn new() -> Self {
        Self {
            last_pitch: 125.0,
            last_f: [500.0, 1500.0, 2500.0, 3500.0],
            sentence_energy: 1.0,
            tempo_clock: 0.0,
        }
    }

    /// Back to utterance-initial state.
    pub fn reset(&mut self) {
        self.last_pitch = 125.0;
        self.last_f = [500.0, 1500.0, 2500.0, 3500.0];
        self.sentence_energy = 1.0;
    }

    fn decay_energy(&mut self) {
        self.sentence_energy = (self.sentence_energy * ENERGY_DECAY).max(ENERGY_FLOOR);
    }
}

impl Default for Prosody {
    fn default() -> Self {
        Self::new()
    }
}

/// Formant targets of the next phoneme in the batch, if it has any.
fn next_formants(events: &[Event], i: usize) -> Option<([f64; 4], PhonemeType)> {
    match events.get(i + 1) {
        Some(Event::Phoneme { sym, .. }) => {
            phoneme::entry(sym).map(|e| (e.formants, e.kind))
        }
        _ => None,
    }
}

/// Generate tracks for one batch of events.
pub fn generate(
    events: &[Event],
    voice: &VoiceProfile,
    state: &mut Prosody,
    rng: &mut StdRng,
) -> Tracks {
    let mut tracks = Tracks::new();

    for (i, event) in events.iter().enumerate() {
        match event {
            Event::WordBoundary => {}
            Event::Breath { ms } => {
                state.sentence_energy = 1.0;
                emit_silence(&mut tracks, state, ms * voice.duration_scale);
            }
            Event::EndOfStream { ms } => {
                state.sentence_energy = 1.0;
                emit_silence(&mut tracks, state, *ms);
            }
            Event::Pause { ms } => {
                state.decay_energy();
                emit_silence(&mut tracks, state, ms * voice.duration_scale);
            }
            Event::Phoneme {
                sym,
                stress,
                slow_lang,
            } => {
                emit_phoneme(
                    &mut tracks,
                    events,
                    i,
                    sym,
                    *stress,
                    *slow_lang,
                    voice,
                    state,
                    rng,
                );
            }
        }
    }

    tracks
}

fn emit_silence(tracks: &mut Tracks, state: &Prosody, ms: f64) {
    let n = (ms / BLOCK_MS).round() as usize;
    for _ in 0..n {
        tracks.push_frame(state.last_f, state.last_pitch, 0.0, 0.0, [0.0; 3], 0.0);
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_phoneme(
    tracks: &mut Tracks,
    events: &[Event],
    i: usize,
    sym: &str,
    stress: u8,
    slow_lang: bool,
    voice: &VoiceProfile,
    state: &mut Prosody,
    rng: &mut StdRng,
) {
    // Unknown symbols emit nothing.
    let Some(entry) = phoneme::entry(sym) else {
        return;
    };

    state.decay_energy();

    // Micro-pause phonemes (the Russian hard sign) carry no spectrum.
    if entry.kind == PhonemeType::Pause {
        tracks.push_frame(state.last_f, state.last_pitch, 0.0, 0.0, [0.0; 3], 0.0);
        return;
    }

    let stressed = stress > 0;

    // Pitch target with declination, stress boost, and jitter.
    let jitter = rng.gen_range(-2.0..2.0);
    let offset = state.sentence_energy * 18.0 + if stressed { 25.0 } else { -8.0 } + jitter;
    let target = (voice.base_pitch + offset).clamp(PITCH_MIN, voice.base_pitch + PITCH_SPAN);

    // Duration.
    let mut ms = entry.dur_ms;
    if stressed {
        ms *= 1.25;
    }
    if slow_lang {
        ms *= 1.35;
    }
    state.tempo_clock += 0.1;
    ms *= 1.0 + 0.12 * state.tempo_clock.sin();
    if !stressed && state.sentence_energy > 0.8 {
        ms *= 0.92;
    }
    ms *= voice.duration_scale;
    let n = ((ms / BLOCK_MS).round() as usize).max(1);

    let gain = phoneme::db_to_lin(entry.gain_db);

    // Breathy /h/ takes on the color of a following vowel or glide.
    let mut tgt_f = entry.formants;
    if sym == "HH" {
        if let Some((f, kind)) = next_formants(events, i) {
            if matches!(kind, PhonemeType::Vowel | PhonemeType::Glide) {
                tgt_f = f;
            }
        }
    }

    let max_pitch = voice.base_pitch + PITCH_SPAN;

    match entry.kind {
        PhonemeType::Glide => {
            let (start_f, end_f) = if let Some((s, e)) = phoneme::diphthong(sym) {
                let s = phoneme::entry(s).map(|p| p.formants).unwrap_or(tgt_f);
                let e = phoneme::entry(e).map(|p| p.formants).unwrap_or(tgt_f);
                (s, e)
            } else if sym == "W" {
                // Anticipatory coarticulation into whatever follows.
                let end = next_formants(events, i)
                    .map(|(f, _)| f)
                    .unwrap_or(entry.formants);
                (entry.formants, end)
            } else {
                (tgt_f, tgt_f)
            };

            for f in 0..n {
                let k = (1.0 - (f as f64 / n as f64 * std::f64::consts::PI).cos()) / 2.0;
                let curr = [
                    start_f[0] + (end_f[0] - start_f[0]) * k,
                    start_f[1] + (end_f[1] - start_f[1]) * k,
                    start_f[2] + (end_f[2] - start_f[2]) * k,
                    start_f[3] + (end_f[3] - start_f[3]) * k,
                ];
                let pitch = interp_pitch(state.last_pitch, target, f, n, ARC_GLIDE, max_pitch);
                tracks.push_frame(curr, pitch, gain, 0.0, [0.0; 3], 0.0);
            }
            state.last_pitch = target;
            state.last_f = end_f;
        }

        PhonemeType::Stop => {
            let dat = phoneme::plosive(sym);

            // Closure: low F1, formant pointers at the locus.
            let closure_f = [200.0, dat.locus_f2, dat.locus_f3, 3500.0];
            let n_closure = (dat.closure_ms / BLOCK_MS).round() as usize;
            for _ in 0..n_closure {
                tracks.push_frame(
                    closure_f,
                    state.last_pitch,
                    dat.voicing_bar,
                    0.0,
                    [0.0; 3],
                    0.0,
                );
            }

            // Release: exactly one burst frame.
            let release_f = [500.0, dat.locus_f2, dat.locus_f3, 3500.0];
            tracks.push_frame(
                release_f,
                state.last_pitch,
                dat.voicing_bar,
                0.0,
                [0.0; 3],
                dat.burst_hz,
            );

            // Aspiration.
            if let Some(asp) = dat.aspiration {
                let asp_ms = if asp == Aspiration::ShHard {
                    ASPIRATION_LONG_MS
                } else {
                    ASPIRATION_MS
                };
                let mix = match asp {
                    Aspiration::S | Aspiration::SAr => [1.0, 0.0, 0.0],
                    Aspiration::ShHard | Aspiration::Zh => [0.0, 1.0, 0.0],
                    Aspiration::H => [0.0, 0.0, 1.0],
                };
                let n_asp = (asp_ms / BLOCK_MS).round() as usize;
                for _ in 0..n_asp {
                    tracks.push_frame(
                        release_f,
                        state.last_pitch,
                        dat.voicing_bar,
                        0.9,
                        mix,
                        0.0,
                    );
                }
            }

            state.last_f = release_f;
        }

        _ => {
            // Vowels, vowel-likes, and fricatives hold their targets.
            let (mut av, mut af) = match entry.kind {
                PhonemeType::Vowel | PhonemeType::VowelLike => (gain, 0.0),
                PhonemeType::Fricative => (0.0, gain),
                PhonemeType::VoicedFricative => (gain * 0.5, gain * 0.5),
                _ => (0.0, 0.0),
            };

            let mut mix = match sym {
                "S" | "Z" | "S_AR" => [1.0, 0.0, 0.0],
                "SH" | "ZH" => [0.0, 1.0, 0.0],
                "HH" | "KH" | "H_AR" => [0.0, 0.0, 1.0],
                _ => [0.0; 3],
            };

            match sym {
                "F" | "TH" => {
                    mix = [0.0, 0.5, 0.5];
                    af *= 0.8;
                }
                "Z" | "Z_AR" => {
                    av = gain * 0.8;
                    af = gain * 0.7;
                    mix[0] = 1.0;
                }
                "V" => {
                    av = gain * 0.8;
                    af = gain * 0.5;
                    mix = [0.2, 0.0, 0.5];
                }
                "GH" => {
                    av = gain * 0.8;
                    af = gain * 0.4;
                    mix = [0.0, 0.0, 0.8];
                }
                "AIN" => {
                    av = gain;
                    af = 0.0;
                }
                "KH" | "H_AR" => {
                    mix[1] = 0.5;
                    af *= 0.6;
                }
                _ => {}
            }

            for f in 0..n {
                let pitch = interp_pitch(state.last_pitch, target, f, n, ARC_PLAIN, max_pitch);
                tracks.push_frame(tgt_f, pitch, av, af, mix, 0.0);
            }
            state.last_pitch = target;
            state.last_f = tgt_f;
        }
    }
}

fn interp_pitch(last: f64, target: f64, frame: usize, n: usize, arc: f64, max: f64) -> f64 {
    let k = frame as f64 / n as f64;
    let syllable_arc = (k * std::f64::consts::PI).sin() * arc;
    (last + (target - last) * k + syllable_arc).clamp(PITCH_MIN, max)
}

// ─── Smoothing ───────────────────────────────────────────────────

/// Gaussian-smooth every continuous channel: sigma 4 for pitch, 2 for the
/// rest. The burst channel is sparse and must not be smeared.
pub fn smooth(tracks: &mut Tracks) {
    gaussian_smooth(&mut tracks.pitch, 4.0);
    for ch in [
        &mut tracks.f1,
        &mut tracks.f2,
        &mut tracks.f3,
        &mut tracks.f4,
        &mut tracks.av,
        &mut tracks.af,
        &mut tracks.mix_s,
        &mut tracks.mix_mid,
        &mut tracks.mix_h,
    ] {
        gaussian_smooth(ch, 2.0);
    }
}

/// 1-D Gaussian filter with reflected boundaries, kernel truncated at 4
/// standard deviations.
fn gaussian_smooth(data: &mut Vec<f64>, sigma: f64) {
    let n = data.len();
    if n == 0 {
        return;
    }

    let radius = (4.0 * sigma + 0.5) as usize;
    let mut kernel = Vec::with_capacity(2 * radius + 1);
    for j in -(radius as isize)..=(radius as isize) {
        let x = j as f64 / sigma;
        kernel.push((-0.5 * x * x).exp());
    }
    let total: f64 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= total;
    }

    let reflect = |mut idx: isize| -> usize {
        let n = n as isize;
        loop {
            if idx < 0 {
                idx = -idx - 1;
            } else if idx >= n {
                idx = 2 * n - 1 - idx;
            } else {
                return idx as usize;
            }
        }
    };

    let smoothed: Vec<f64> = (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| w * data[reflect(i + k as isize - radius as isize)])
                .sum()
        })
        .collect();

    *data = smoothed;
}
