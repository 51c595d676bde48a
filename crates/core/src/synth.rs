//! Block-wise formant synthesis.
//!
//! Renders parameter tracks to PCM: a sawtooth glottal source shaped by a
//! spectral tilt feeds four parallel resonators; fricative energy comes
//! from Gaussian noise split over three band-passes; stop releases are
//! impulsive filtered-noise bursts. The glottal phase and all filter
//! state persist across blocks and batches — they are reset only between
//! utterances.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::dsp::{self, Biquad, OnePole};
use crate::tracks::Tracks;
use crate::voice::VoiceProfile;
use crate::{BLOCK_SAMPLES, SAMPLE_RATE};

/// Resonator bandwidths for F1..F4 in Hz.
const FORMANT_BW: [f64; 4] = [60.0, 90.0, 130.0, 180.0];
/// Output gain per resonator.
const FORMANT_GAIN: [f64; 4] = [1.0, 0.7, 0.5, 0.2];

/// Fixed sibilant noise band.
const BAND_S: (f64, f64) = (3200.0, 5800.0);
/// Fixed mid (palato-alveolar) noise band.
const BAND_MID: (f64, f64) = (1800.0, 4500.0);

/// The streaming synthesizer state for one voice.
#[derive(Debug, Clone)]
pub struct Synth {
    phase: f64,
    tilt: OnePole,
    formants: [Biquad; 4],
}

impl Synth {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            tilt: OnePole::new(0.92),
            formants: [Biquad::new(), Biquad::new(), Biquad::new(), Biquad::new()],
        }
    }

    /// Clear the glottal phase, tilt state, and resonator state.
    ///
    /// Called between utterances, never between batches: resetting the
    /// phase mid-utterance produces audible discontinuities.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.tilt.reset();
        for f in &mut self.formants {
            f.reset();
        }
    }

    /// Render one batch of tracks to samples.
    pub fn render(&mut self, tracks: &Tracks, voice: &VoiceProfile, rng: &mut StdRng) -> Vec<f64> {
        let n = tracks.len();
        if n == 0 {
            return Vec::new();
        }

        let fs = SAMPLE_RATE as f64;
        let nyquist_margin = fs / 2.0 - 100.0;
        let mut out = vec![0.0f64; n * BLOCK_SAMPLES];

        self.tilt.k = 0.92 + voice.brightness * 0.05;
        let normal = Normal::new(0.0, 1.0).expect("unit normal");

        let mut src = [0.0f64; BLOCK_SAMPLES];

        for b in 0..n {
            let start = b * BLOCK_SAMPLES;
            let block = &mut out[start..start + BLOCK_SAMPLES];

            let f_vals = [tracks.f1[b], tracks.f2[b], tracks.f3[b], tracks.f4[b]];
            let pitch = tracks.pitch[b];
            let (av, af) = (tracks.av[b], tracks.af[b]);
            let mix = [tracks.mix_s[b], tracks.mix_mid[b], tracks.mix_h[b]];
            let burst = tracks.burst[b];

            // Glottal sawtooth; the phase accumulator rolls on across
            // blocks for a click-free fundamental.
            let inc = pitch.max(0.0) / fs;
            for s in src.iter_mut() {
                self.phase += inc;
                if self.phase >= 1.0 {
                    self.phase -= 1.0;
                }
                *s = 2.0 * (self.phase - 0.5);
            }

            // Spectral tilt, then voiced gain.
            let gain = av * 0.18;
            for s in src.iter_mut() {
                *s = self.tilt.process(*s) * gain;
            }

            // Parallel resonator bank.
            for (k, filt) in self.formants.iter_mut().enumerate() {
                let center = (f_vals[k] / voice.formant_scale).clamp(100.0, nyquist_margin);
                let q = center / FORMANT_BW[k].max(50.0);
                filt.set_coeffs(dsp::peak(center, q, fs));
                for (i, &s) in src.iter().enumerate() {
                    block[i] += filt.process(s) * FORMANT_GAIN[k];
                }
            }

            // Fricative noise, three weighted bands.
            if af > 0.01 {
                let noise: Vec<f64> = (0..BLOCK_SAMPLES)
                    .map(|_| normal.sample(rng) * voice.noise_level * 0.5)
                    .collect();
                let mut total = [0.0f64; BLOCK_SAMPLES];

                let add_band = |lo: f64, hi: f64, weight: f64, total: &mut [f64; BLOCK_SAMPLES]| {
                    let mut f = Biquad::with(dsp::bandpass(lo, hi, fs));
                    for (i, &x) in noise.iter().enumerate() {
                        total[i] += f.process(x) * weight;
                    }
                };

                if mix[0] > 0.0 {
                    add_band(BAND_S.0, BAND_S.1, mix[0], &mut total);
                }
                if mix[1] > 0.0 {
                    add_band(BAND_MID.0, BAND_MID.1, mix[1], &mut total);
                }
                if mix[2] > 0.0 {
                    // Band follows the formant tracks, coloring the noise
                    // by the current vocal-tract shape.
                    let lo = (f_vals[1] - 600.0).max(300.0);
                    let hi = (f_vals[2] + 600.0).min(nyquist_margin);
                    if hi > lo {
                        add_band(lo, hi, mix[2], &mut total);
                    }
                }

                for (i, &t) in total.iter().enumerate() {
                    block[i] += t * af * 0.7;
                }
            }

            // Stop release burst.
            if burst > 100.0 {
                let lo = (burst - 600.0).max(50.0);
                let hi = (burst + 600.0).min(nyquist_margin);
                let mut f = Biquad::with(dsp::bandpass(lo, hi, fs));
                for s in block.iter_mut() {
                    let pop = rng.gen_range(-1.0..1.0) * 2.5;
                    *s += dsp::soft_clip(f.process(pop)) * 0.6;
                }
            }
        }

        out
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new()
    }
}

/// Batch post-filter: band-limit, saturate, and normalize to 0.92 peak.
pub fn post_process(samples: &mut [f64]) {
    if samples.is_empty() {
        return;
    }

    let fs = SAMPLE_RATE as f64;
    let mut lp = Biquad::with(dsp::lowpass(8500.0, fs));
    let mut hp = Biquad::with(dsp::highpass1(20.0, fs));

    for s in samples.iter_mut() {
        *s = hp.process(lp.process(*s));
    }

    for s in samples.iter_mut() {
        *s = dsp::soft_clip(*s * 1.3);
    }

    let peak = samples.iter().fold(0.0f64, |m, &s| m.max(s.abs()));
    if peak > 0.0 {
        let scale = 0.92 / peak;
        for s in samples.iter_mut() {
            *s *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn voice() -> VoiceProfile {
        VoiceProfile {
            name: "Test".into(),
            gender: "male".into(),
            accent: "neutral".into(),
            base_pitch: 125.0,
            formant_scale: 1.0,
            duration_scale: 1.0,
            noise_level: 0.35,
            brightness: 0.0,
            description: String::new(),
        }
    }

    fn vowel_tracks(n: usize) -> Tracks {
        let mut t = Tracks::new();
        for _ in 0..n {
            t.f1.push(730.0);
            t.f2.push(1090.0);
            t.f3.push(2330.0);
            t.f4.push(3400.0);
            t.pitch.push(120.0);
            t.av.push(0.9);
            t.af.push(0.0);
            t.mix_s.push(0.0);
            t.mix_mid.push(0.0);
            t.mix_h.push(0.0);
            t.burst.push(0.0);
        }
        t
    }

    #[test]
    fn test_render_length() {
        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = synth.render(&vowel_tracks(10), &voice(), &mut rng);
        assert_eq!(out.len(), 10 * BLOCK_SAMPLES);
    }

    #[test]
    fn test_render_empty() {
        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = synth.render(&Tracks::new(), &voice(), &mut rng);
        assert!(out.is_empty());
    }

    #[test]
    fn test_voiced_block_has_energy() {
        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = synth.render(&vowel_tracks(50), &voice(), &mut rng);
        let rms = (out.iter().map(|s| s * s).sum::<f64>() / out.len() as f64).sqrt();
        assert!(rms > 1e-4, "voiced render too quiet: rms {}", rms);
    }

    #[test]
    fn test_silent_tracks_render_silence() {
        let mut t = vowel_tracks(20);
        for a in t.av.iter_mut() {
            *a = 0.0;
        }
        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(1);
        let out = synth.render(&t, &voice(), &mut rng);
        assert!(out.iter().all(|&s| s.abs() < 1e-9));
    }

    #[test]
    fn test_render_deterministic_with_seed() {
        let t = vowel_tracks(25);
        let mut a_synth = Synth::new();
        let mut b_synth = Synth::new();
        let mut a_rng = StdRng::seed_from_u64(42);
        let mut b_rng = StdRng::seed_from_u64(42);
        let a = a_synth.render(&t, &voice(), &mut a_rng);
        let b = b_synth.render(&t, &voice(), &mut b_rng);
        assert_eq!(a, b);
    }

    #[test]
    fn test_phase_continuity_across_batches() {
        // Rendering one long batch must equal rendering it as two halves
        // with the same synth, because all state carries over.
        let t_full = vowel_tracks(20);
        let t_a = vowel_tracks(10);
        let t_b = vowel_tracks(10);

        let mut synth1 = Synth::new();
        let mut rng1 = StdRng::seed_from_u64(9);
        let full = synth1.render(&t_full, &voice(), &mut rng1);

        let mut synth2 = Synth::new();
        let mut rng2 = StdRng::seed_from_u64(9);
        let mut halves = synth2.render(&t_a, &voice(), &mut rng2);
        halves.extend(synth2.render(&t_b, &voice(), &mut rng2));

        assert_eq!(full.len(), halves.len());
        for (x, y) in full.iter().zip(halves.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let t = vowel_tracks(15);
        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(3);
        let first = synth.render(&t, &voice(), &mut rng);

        synth.reset();
        let mut rng = StdRng::seed_from_u64(3);
        let second = synth.render(&t, &voice(), &mut rng);
        assert_eq!(first, second);
    }

    #[test]
    fn test_fricative_noise_present() {
        let mut t = vowel_tracks(30);
        for i in 0..t.len() {
            t.av[i] = 0.0;
            t.af[i] = 0.5;
            t.mix_s[i] = 1.0;
        }
        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(5);
        let out = synth.render(&t, &voice(), &mut rng);
        let rms = (out.iter().map(|s| s * s).sum::<f64>() / out.len() as f64).sqrt();
        assert!(rms > 1e-4);
    }

    #[test]
    fn test_burst_is_loud_and_local() {
        let mut t = vowel_tracks(3);
        for i in 0..3 {
            t.av[i] = 0.0;
        }
        t.burst[1] = 3800.0;

        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(5);
        let out = synth.render(&t, &voice(), &mut rng);

        let energy = |range: std::ops::Range<usize>| -> f64 {
            out[range].iter().map(|s| s * s).sum()
        };
        let quiet = energy(0..BLOCK_SAMPLES);
        let pop = energy(BLOCK_SAMPLES..2 * BLOCK_SAMPLES);
        assert!(pop > quiet * 100.0, "burst not impulsive: {} vs {}", pop, quiet);
    }

    #[test]
    fn test_formant_center_guard() {
        // Zero formants (a fricative) must not blow up the resonators.
        let mut t = vowel_tracks(10);
        for i in 0..t.len() {
            t.f1[i] = 0.0;
            t.f2[i] = 0.0;
            t.f3[i] = 0.0;
            t.f4[i] = 0.0;
        }
        let mut synth = Synth::new();
        let mut rng = StdRng::seed_from_u64(5);
        let out = synth.render(&t, &voice(), &mut rng);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_post_process_bounds_and_peak() {
        let mut samples: Vec<f64> = (0..9600)
            .map(|i| (i as f64 * 0.01).sin() * 3.0)
            .collect();
        post_process(&mut samples);

        let peak = samples.iter().fold(0.0f64, |m, &s| m.max(s.abs()));
        assert!(peak <= 1.0);
        assert!((peak - 0.92).abs() < 1e-9);
    }

    #[test]
    fn test_post_process_silence_stays_silent() {
        let mut samples = vec![0.0f64; 960];
        post_process(&mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
    }
}
