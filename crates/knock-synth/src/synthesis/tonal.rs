//! Tonal voices for the non-calibrated palette.
//!
//! These are deterministic composites with no search component: detuned
//! oscillator pairs for warmth and an FM bell for chimes. The detuning of
//! ±5 cents produces a slow organic beating between the two voices.

use rand_pcg::Pcg32;

use crate::envelope;
use crate::oscillator::{self, TWO_PI};

use super::Synthesizer;

/// Detune ratio for the paired voices (5 cents).
const DETUNE: f64 = 1.0028922878693671; // 2^(5/1200)

/// Rate at which an FM bell's modulation index decays, in s^-1.
const FM_INDEX_DECAY: f64 = 14.0;

/// Warm voice: detuned sine pair plus low harmonics.
#[derive(Debug, Clone)]
pub struct WarmVoice {
    /// Base frequency in Hz.
    pub frequency: f64,
    /// Envelope decay rate in s^-1.
    pub decay_per_s: f64,
}

impl WarmVoice {
    /// Creates a warm voice.
    pub fn new(frequency: f64, decay_per_s: f64) -> Self {
        Self {
            frequency: frequency.max(20.0),
            decay_per_s: decay_per_s.max(0.0),
        }
    }
}

impl Synthesizer for WarmVoice {
    fn synthesize(&self, num_samples: usize, sample_rate: f64, _rng: &mut Pcg32) -> Vec<f64> {
        let hi = oscillator::sine_wave(self.frequency * DETUNE, num_samples, sample_rate);
        let lo = oscillator::sine_wave(self.frequency / DETUNE, num_samples, sample_rate);
        let second = oscillator::sine_wave(self.frequency * 2.0, num_samples, sample_rate);
        let third = oscillator::sine_wave(self.frequency * 3.0, num_samples, sample_rate);

        let mut output: Vec<f64> = (0..num_samples)
            .map(|i| hi[i] + lo[i] + 0.28 * second[i] + 0.10 * third[i])
            .collect();
        normalize_peak(&mut output);

        let env = envelope::exponential(num_samples, sample_rate, self.decay_per_s);
        for (sample, e) in output.iter_mut().zip(&env) {
            *sample *= e;
        }
        output
    }
}

/// Softer variant of [`WarmVoice`] built from triangle waves.
#[derive(Debug, Clone)]
pub struct WarmTriangleVoice {
    /// Base frequency in Hz.
    pub frequency: f64,
    /// Envelope decay rate in s^-1.
    pub decay_per_s: f64,
}

impl WarmTriangleVoice {
    /// Creates a warm triangle voice.
    pub fn new(frequency: f64, decay_per_s: f64) -> Self {
        Self {
            frequency: frequency.max(20.0),
            decay_per_s: decay_per_s.max(0.0),
        }
    }
}

impl Synthesizer for WarmTriangleVoice {
    fn synthesize(&self, num_samples: usize, sample_rate: f64, _rng: &mut Pcg32) -> Vec<f64> {
        let hi = oscillator::triangle_wave(self.frequency * DETUNE, num_samples, sample_rate);
        let lo = oscillator::triangle_wave(self.frequency / DETUNE, num_samples, sample_rate);
        let second = oscillator::sine_wave(self.frequency * 2.0, num_samples, sample_rate);

        let mut output: Vec<f64> = (0..num_samples)
            .map(|i| hi[i] + lo[i] + 0.15 * second[i])
            .collect();
        normalize_peak(&mut output);

        let env = envelope::exponential(num_samples, sample_rate, self.decay_per_s);
        for (sample, e) in output.iter_mut().zip(&env) {
            *sample *= e;
        }
        output
    }
}

/// FM bell: bright inharmonic attack decaying to a pure fundamental.
#[derive(Debug, Clone)]
pub struct FmBell {
    /// Carrier frequency in Hz.
    pub frequency: f64,
    /// Modulator-to-carrier frequency ratio.
    pub mod_ratio: f64,
    /// Peak modulation index at onset.
    pub mod_index_peak: f64,
    /// Envelope decay rate in s^-1.
    pub decay_per_s: f64,
}

impl FmBell {
    /// Creates an FM bell voice.
    pub fn new(frequency: f64, mod_ratio: f64, mod_index_peak: f64, decay_per_s: f64) -> Self {
        Self {
            frequency: frequency.max(20.0),
            mod_ratio: mod_ratio.max(0.01),
            mod_index_peak: mod_index_peak.max(0.0),
            decay_per_s: decay_per_s.max(0.0),
        }
    }
}

impl Synthesizer for FmBell {
    fn synthesize(&self, num_samples: usize, sample_rate: f64, _rng: &mut Pcg32) -> Vec<f64> {
        let mod_freq = self.frequency * self.mod_ratio;
        let mut output = Vec::with_capacity(num_samples);

        for i in 0..num_samples {
            let t = i as f64 / sample_rate;
            let index = self.mod_index_peak * (-t * FM_INDEX_DECAY).exp();
            let modulator = index * (TWO_PI * mod_freq * t).sin();
            output.push((TWO_PI * self.frequency * t + modulator).sin());
        }

        let env = envelope::exponential(num_samples, sample_rate, self.decay_per_s);
        for (sample, e) in output.iter_mut().zip(&env) {
            *sample *= e;
        }
        output
    }
}

fn normalize_peak(samples: &mut [f64]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max);
    if peak > 0.0 {
        for s in samples.iter_mut() {
            *s /= peak;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    const SR: f64 = 44_100.0;

    #[test]
    fn test_warm_voice_bounded() {
        let voice = WarmVoice::new(392.0, 15.0);
        let mut rng = create_rng(42);
        let samples = voice.synthesize(4410, SR, &mut rng);

        assert_eq!(samples.len(), 4410);
        for &s in &samples {
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_warm_triangle_voice_bounded() {
        let voice = WarmTriangleVoice::new(493.88, 9.0);
        let mut rng = create_rng(42);
        let samples = voice.synthesize(4410, SR, &mut rng);

        assert_eq!(samples.len(), 4410);
        for &s in &samples {
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_fm_bell_bounded() {
        let bell = FmBell::new(783.99, 1.41, 5.0, 5.0);
        let mut rng = create_rng(42);
        let samples = bell.synthesize(4410, SR, &mut rng);

        assert_eq!(samples.len(), 4410);
        for &s in &samples {
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_voices_are_deterministic() {
        let voice = WarmVoice::new(392.0, 15.0);
        let mut rng1 = create_rng(1);
        let mut rng2 = create_rng(2);

        // No randomness flows into tonal voices, whatever the RNG state.
        assert_eq!(
            voice.synthesize(1000, SR, &mut rng1),
            voice.synthesize(1000, SR, &mut rng2)
        );
    }

    #[test]
    fn test_different_frequencies_differ() {
        let a = WarmVoice::new(392.0, 15.0);
        let b = WarmVoice::new(493.88, 15.0);
        let mut rng = create_rng(42);

        assert_ne!(
            a.synthesize(1000, SR, &mut rng),
            b.synthesize(1000, SR, &mut rng)
        );
    }

    #[test]
    fn test_fm_bell_attack_is_brighter_than_tail() {
        // The modulation index decays, so zero crossings should be denser in
        // the first quarter than in the last quarter.
        let bell = FmBell::new(587.33, 1.41, 4.0, 3.0);
        let mut rng = create_rng(42);
        let samples = bell.synthesize(SR as usize, SR, &mut rng);

        let crossings = |window: &[f64]| -> usize {
            window.windows(2).filter(|p| p[0] * p[1] < 0.0).count()
        };
        let quarter = samples.len() / 4;
        assert!(crossings(&samples[..quarter]) >= crossings(&samples[3 * quarter..]));
    }
}
