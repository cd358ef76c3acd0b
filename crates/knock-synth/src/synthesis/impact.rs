//! Modal impact synthesis.
//!
//! Models an object-on-surface contact as a small bank of inharmonic
//! resonant modes plus a filtered-noise residual, both shaped by one shared
//! stretched-exponential envelope. The mode frequency ratios follow the
//! zeros of Bessel functions for a circular membrane, which is what gives
//! struck-object sounds their characteristic non-harmonic partials.

use rand_pcg::Pcg32;

use knock_spec::SynthParams;

use crate::envelope;
use crate::error::SynthResult;
use crate::filter;
use crate::oscillator::{self, TWO_PI};
use crate::rng::{create_rng, derive_component_seed};

use super::Synthesizer;

/// Circular membrane mode frequency ratios (Bessel function zeros),
/// normalized to the fundamental. Engineering constants of the physical
/// model, not search parameters.
const MODE_RATIOS: [f64; 9] = [
    1.000, // (0,1) fundamental
    1.593, // (1,1)
    2.135, // (2,1)
    2.295, // (0,2)
    2.653, // (3,1)
    2.917, // (1,2)
    3.155, // (4,1)
    3.500, // (2,2)
    3.598, // (0,3)
];

/// Extra per-mode damping in s^-1 per unit of frequency ratio above the
/// fundamental. Higher modes die faster, as on a real membrane.
const MODE_EXTRA_DAMPING: f64 = 25.0;

/// Modal impact synthesizer.
///
/// The only randomness is the noise residual, drawn from the provided RNG;
/// the mode bank itself is fully deterministic.
#[derive(Debug, Clone)]
pub struct ImpactSynth {
    /// Impact parameters.
    pub params: SynthParams,
}

impl ImpactSynth {
    /// Creates an impact synthesizer from validated parameters.
    pub fn new(params: SynthParams) -> Self {
        Self { params }
    }

    /// Amplitude of mode `index` after the balance tilt.
    ///
    /// Base amplitudes fall off with mode number; `mode_balance` shifts
    /// emphasis between the fundamental and the overtones.
    fn mode_amplitude(&self, index: usize) -> f64 {
        let base = 1.0 / (1.0 + index as f64 * 0.5);
        let tilt = if index == 0 {
            1.0 - self.params.mode_balance * 0.5
        } else {
            0.3 + self.params.mode_balance * 0.7
        };
        base * tilt
    }
}

impl Synthesizer for ImpactSynth {
    fn synthesize(&self, num_samples: usize, sample_rate: f64, rng: &mut Pcg32) -> Vec<f64> {
        if num_samples == 0 {
            return vec![];
        }

        let nyquist = sample_rate / 2.0;
        let dt = 1.0 / sample_rate;

        // Shared temporal envelope for modes and residual, so tonal and noise
        // components decay in lock-step.
        let env = envelope::stretched_exponential(
            num_samples,
            sample_rate,
            self.params.onset_ms / 1000.0,
            self.params.decay_ms / 1000.0,
            self.params.decay_shape,
        );

        // Mode bank. Modes at or above Nyquist are dropped, so the model
        // degrades gracefully as the fundamental grows.
        let mut modes = vec![0.0_f64; num_samples];
        for (index, &ratio) in MODE_RATIOS.iter().enumerate() {
            let freq = self.params.fundamental_hz * ratio;
            if freq >= nyquist {
                continue;
            }

            let amplitude = self.mode_amplitude(index);
            let damping = MODE_EXTRA_DAMPING * (ratio - 1.0);
            let step = TWO_PI * freq * dt;
            let mut phase = 0.0_f64;

            for (i, sample) in modes.iter_mut().enumerate() {
                let t = i as f64 * dt;
                *sample += phase.sin() * amplitude * (-damping * t).exp();
                phase += step;
                if phase >= TWO_PI {
                    phase -= TWO_PI;
                }
            }
        }

        // Noise residual: pink noise limited to the band between the
        // fundamental and the brightness cutoff.
        let band_high = self.params.noise_brightness_hz.max(self.params.fundamental_hz * 1.5);
        let pink = oscillator::pink_noise(rng, num_samples);
        let residual = filter::band_pass(&pink, self.params.fundamental_hz, band_high, sample_rate);

        // Unweighted sum, deliberately left unnormalized: relative level
        // information feeds the analyzer's energy-weighted moments.
        let mut output = Vec::with_capacity(num_samples);
        for i in 0..num_samples {
            output.push((modes[i] + self.params.noise_mix * residual[i]) * env[i]);
        }

        output
    }
}

/// Renders one impact sound of `duration_s` seconds.
///
/// The noise stream is seeded from `seed` via a fixed component key, so the
/// result is a pure function of `(params, duration_s, sample_rate, seed)`.
pub fn render(
    params: &SynthParams,
    duration_s: f64,
    sample_rate: f64,
    seed: u64,
) -> SynthResult<Vec<f64>> {
    params.validate()?;
    if !duration_s.is_finite() || duration_s <= 0.0 {
        return Err(crate::error::SynthError::invalid_param(
            "duration_s",
            format!("must be positive and finite, got {duration_s}"),
        ));
    }

    let num_samples = (duration_s * sample_rate).round() as usize;
    let mut rng = create_rng(derive_component_seed(seed, "impact-noise"));
    Ok(ImpactSynth::new(*params).synthesize(num_samples, sample_rate, &mut rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    const SR: f64 = 44_100.0;

    #[test]
    fn test_impact_basic() {
        let synth = ImpactSynth::new(SynthParams::default());
        let mut rng = create_rng(42);
        let samples = synth.synthesize(4410, SR, &mut rng);

        assert_eq!(samples.len(), 4410);
        assert!(samples.iter().all(|s| s.is_finite()));
        assert!(samples.iter().any(|&s| s.abs() > 1e-6));
    }

    #[test]
    fn test_impact_determinism() {
        let synth = ImpactSynth::new(SynthParams::default());
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(42);

        assert_eq!(
            synth.synthesize(2000, SR, &mut rng1),
            synth.synthesize(2000, SR, &mut rng2)
        );
    }

    #[test]
    fn test_impact_different_seeds_differ() {
        let synth = ImpactSynth::new(SynthParams::default());
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(43);

        assert_ne!(
            synth.synthesize(2000, SR, &mut rng1),
            synth.synthesize(2000, SR, &mut rng2)
        );
    }

    #[test]
    fn test_high_fundamental_drops_modes_gracefully() {
        // Only the fundamental itself survives below Nyquist.
        let params = SynthParams {
            fundamental_hz: 15_000.0,
            ..SynthParams::default()
        };
        let synth = ImpactSynth::new(params);
        let mut rng = create_rng(42);
        let samples = synth.synthesize(2000, SR, &mut rng);

        assert_eq!(samples.len(), 2000);
        assert!(samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_all_modes_above_nyquist() {
        // Every mode is dropped; with the noise mix silenced the output is
        // exactly zero rather than an error.
        let params = SynthParams {
            fundamental_hz: 30_000.0,
            noise_mix: 0.0,
            ..SynthParams::default()
        };
        let synth = ImpactSynth::new(params);
        let mut rng = create_rng(42);
        let samples = synth.synthesize(1000, SR, &mut rng);

        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_noise_mix_zero_is_pure_modes() {
        let params = SynthParams {
            noise_mix: 0.0,
            ..SynthParams::default()
        };
        let synth = ImpactSynth::new(params);

        let mut rng1 = create_rng(1);
        let mut rng2 = create_rng(999);

        // Without the residual the RNG never influences the output.
        assert_eq!(
            synth.synthesize(2000, SR, &mut rng1),
            synth.synthesize(2000, SR, &mut rng2)
        );
    }

    #[test]
    fn test_render_duration_and_validation() {
        let samples = render(&SynthParams::default(), 0.1, SR, 7).unwrap();
        assert_eq!(samples.len(), 4410);

        let bad = SynthParams {
            noise_mix: 2.0,
            ..SynthParams::default()
        };
        assert!(render(&bad, 0.1, SR, 7).is_err());
        assert!(render(&SynthParams::default(), -1.0, SR, 7).is_err());
    }

    #[test]
    fn test_render_is_reproducible() {
        let a = render(&SynthParams::default(), 0.1, SR, 7).unwrap();
        let b = render(&SynthParams::default(), 0.1, SR, 7).unwrap();
        assert_eq!(a, b);
    }
}
