//! Temporal envelopes: exponential and stretched-exponential decay.
//!
//! Both families smooth their onset with a raised-cosine ramp over a short
//! fixed window so the rendered signal never starts with a click. The same
//! raised-cosine shape also provides the end-of-buffer fade.

use std::f64::consts::PI;

/// Raised-cosine onset ramp length in seconds.
pub const ONSET_RAMP_SECONDS: f64 = 0.008;

/// Raised-cosine fade-out tail length in seconds.
pub const FADE_TAIL_SECONDS: f64 = 0.005;

/// Exponential decay envelope `e^(-t * decay_per_s)`.
pub fn exponential(num_samples: usize, sample_rate: f64, decay_per_s: f64) -> Vec<f64> {
    let decay = decay_per_s.max(0.0);
    let mut env: Vec<f64> = (0..num_samples)
        .map(|i| (-(i as f64) / sample_rate * decay).exp())
        .collect();

    apply_onset_ramp(&mut env, 0, ramp_samples(sample_rate, num_samples));
    env
}

/// Stretched-exponential (Weibull) survival envelope.
///
/// Zero before `onset_s`, then `exp(-((t - onset) / tau)^beta)`. Shape
/// exponents below 1 front-load the energy and leave a long low-amplitude
/// tail, the signature of real impact recordings.
pub fn stretched_exponential(
    num_samples: usize,
    sample_rate: f64,
    onset_s: f64,
    tau_s: f64,
    beta: f64,
) -> Vec<f64> {
    let onset = onset_s.max(0.0);
    let tau = tau_s.max(1e-6);
    let shape = beta.max(1e-3);

    let onset_samples = ((onset * sample_rate).round() as usize).min(num_samples);
    let mut env = vec![0.0; num_samples];

    for (i, value) in env.iter_mut().enumerate().skip(onset_samples) {
        let t = (i - onset_samples) as f64 / sample_rate;
        *value = (-(t / tau).powf(shape)).exp();
    }

    apply_onset_ramp(
        &mut env,
        onset_samples,
        ramp_samples(sample_rate, num_samples.saturating_sub(onset_samples)),
    );
    env
}

/// Applies a raised-cosine amplitude taper over the last
/// [`FADE_TAIL_SECONDS`] of the buffer.
///
/// Applied as the final transform before output so the buffer always ends at
/// silence regardless of what the chain produced.
pub fn fade_out(samples: &mut [f64], sample_rate: f64) {
    let tail = ((FADE_TAIL_SECONDS * sample_rate) as usize).min(samples.len());
    if tail == 0 {
        return;
    }

    let len = samples.len();
    for j in 0..tail {
        let progress = (j + 1) as f64 / tail as f64;
        samples[len - tail + j] *= 0.5 * (1.0 + (PI * progress).cos());
    }
}

fn ramp_samples(sample_rate: f64, available: usize) -> usize {
    ((ONSET_RAMP_SECONDS * sample_rate) as usize).min(available)
}

/// Scales `env[start..start + ramp]` by a raised-cosine rise from 0 to 1.
fn apply_onset_ramp(env: &mut [f64], start: usize, ramp: usize) {
    for j in 0..ramp {
        env[start + j] *= 0.5 * (1.0 - (PI * j as f64 / ramp as f64).cos());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44_100.0;

    #[test]
    fn test_exponential_shape() {
        let env = exponential(4410, SR, 12.0);
        assert_eq!(env.len(), 4410);
        assert!(env.iter().all(|v| (0.0..=1.0).contains(v)));

        // Ramp starts from silence.
        assert_eq!(env[0], 0.0);

        // Monotone non-increasing after the onset ramp.
        let ramp = (ONSET_RAMP_SECONDS * SR) as usize;
        for pair in env[ramp..].windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12);
        }
    }

    #[test]
    fn test_exponential_zero_decay_is_flat() {
        let env = exponential(1000, SR, 0.0);
        let ramp = (ONSET_RAMP_SECONDS * SR) as usize;
        for &v in &env[ramp..] {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_stretched_exponential_respects_onset() {
        let env = stretched_exponential(8820, SR, 0.02, 0.06, 0.85);
        let onset_samples = (0.02 * SR).round() as usize;

        for &v in &env[..onset_samples] {
            assert_eq!(v, 0.0);
        }
        assert!(env[onset_samples..].iter().any(|&v| v > 0.5));
        assert!(env.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_stretched_exponential_decays_after_ramp() {
        let env = stretched_exponential(8820, SR, 0.0, 0.05, 0.7);
        let ramp = (ONSET_RAMP_SECONDS * SR) as usize;
        for pair in env[ramp..].windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12);
        }
    }

    #[test]
    fn test_stretched_exponential_onset_beyond_buffer() {
        let env = stretched_exponential(100, SR, 10.0, 0.05, 0.7);
        assert!(env.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fade_out_ends_at_silence() {
        let mut samples = vec![1.0; 4410];
        fade_out(&mut samples, SR);

        assert_eq!(samples[0], 1.0);
        assert!(samples[4409].abs() < 1e-9);

        // Untouched before the tail window.
        let tail = (FADE_TAIL_SECONDS * SR) as usize;
        assert_eq!(samples[4410 - tail - 1], 1.0);
    }

    #[test]
    fn test_fade_out_short_buffer() {
        let mut samples = vec![1.0; 8];
        fade_out(&mut samples, SR);
        assert!(samples[7].abs() < 1e-9);
    }
}
