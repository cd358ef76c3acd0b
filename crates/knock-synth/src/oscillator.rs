//! Waveform primitives: oscillators and noise generators.
//!
//! Pure functions of `(params, sample_rate)`; the noise generators take a
//! PCG32 so the same logical seed always reproduces the same sample sequence,
//! which the calibration loop depends on.

use std::f64::consts::PI;

use rand::Rng;
use rand_pcg::Pcg32;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Two pi, the full phase cycle.
pub const TWO_PI: f64 = 2.0 * PI;

/// Generates a sine wave at `frequency` Hz.
pub fn sine_wave(frequency: f64, num_samples: usize, sample_rate: f64) -> Vec<f64> {
    let step = TWO_PI * frequency / sample_rate;
    let mut phase = 0.0_f64;
    let mut output = Vec::with_capacity(num_samples);

    for _ in 0..num_samples {
        output.push(phase.sin());
        phase += step;
        if phase >= TWO_PI {
            phase -= TWO_PI;
        }
    }

    output
}

/// Generates a triangle wave at `frequency` Hz.
///
/// Computed with the fractional-phase folding formula
/// `2·|2·(t·f − round(t·f))| − 1` rather than a lookup table.
pub fn triangle_wave(frequency: f64, num_samples: usize, sample_rate: f64) -> Vec<f64> {
    let mut output = Vec::with_capacity(num_samples);

    for i in 0..num_samples {
        let cycles = i as f64 / sample_rate * frequency;
        let folded = cycles - (cycles + 0.5).floor();
        output.push(2.0 * (2.0 * folded).abs() - 1.0);
    }

    output
}

/// A buffer of zeros.
pub fn silence(num_samples: usize) -> Vec<f64> {
    vec![0.0; num_samples]
}

/// Generates uniform white noise in [-1, 1].
pub fn white_noise(rng: &mut Pcg32, num_samples: usize) -> Vec<f64> {
    (0..num_samples).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect()
}

/// Generates spectrally-shaped pink noise.
///
/// A white buffer is transformed to the frequency domain, every bin except DC
/// is scaled by `1/sqrt(f)`, and the spectrum is transformed back. The DC bin
/// is excluded from the weighting so no division by zero can occur. Output is
/// peak-normalized to 1.0.
pub fn pink_noise(rng: &mut Pcg32, num_samples: usize) -> Vec<f64> {
    if num_samples < 2 {
        return white_noise(rng, num_samples);
    }

    let white = white_noise(rng, num_samples);
    let mut spectrum: Vec<Complex<f64>> =
        white.iter().map(|&s| Complex::new(s, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(num_samples);
    fft.process(&mut spectrum);

    // Weight by 1/sqrt(f). Bin k and its mirror n-k share the same frequency,
    // so conjugate symmetry (and thus a real inverse transform) is preserved.
    for (k, bin) in spectrum.iter_mut().enumerate().skip(1) {
        let freq_index = k.min(num_samples - k) as f64;
        *bin *= 1.0 / freq_index.sqrt();
    }

    let ifft = planner.plan_fft_inverse(num_samples);
    ifft.process(&mut spectrum);

    let scale = 1.0 / num_samples as f64;
    let mut output: Vec<f64> = spectrum.iter().map(|c| c.re * scale).collect();

    let peak = output.iter().map(|s| s.abs()).fold(0.0_f64, f64::max);
    if peak > 0.0 {
        for s in &mut output {
            *s /= peak;
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn test_sine_wave_range_and_length() {
        let samples = sine_wave(440.0, 1000, 44_100.0);
        assert_eq!(samples.len(), 1000);
        for &s in &samples {
            assert!((-1.0..=1.0).contains(&s));
        }
        // Starts at phase zero.
        assert!(samples[0].abs() < 1e-12);
    }

    #[test]
    fn test_triangle_wave_range() {
        let samples = triangle_wave(440.0, 1000, 44_100.0);
        assert_eq!(samples.len(), 1000);
        for &s in &samples {
            assert!((-1.0..=1.0).contains(&s));
        }
    }

    #[test]
    fn test_triangle_wave_hits_extremes() {
        // One full 1 Hz cycle sampled at 1000 Hz touches both rails.
        let samples = triangle_wave(1.0, 1000, 1000.0);
        let max = samples.iter().cloned().fold(f64::MIN, f64::max);
        let min = samples.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max > 0.99);
        assert!(min < -0.99);
    }

    #[test]
    fn test_white_noise_determinism() {
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(42);
        assert_eq!(white_noise(&mut rng1, 256), white_noise(&mut rng2, 256));
    }

    #[test]
    fn test_pink_noise_determinism() {
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(42);
        assert_eq!(pink_noise(&mut rng1, 2048), pink_noise(&mut rng2, 2048));
    }

    #[test]
    fn test_pink_noise_normalized_and_finite() {
        let mut rng = create_rng(42);
        let samples = pink_noise(&mut rng, 4096);
        assert_eq!(samples.len(), 4096);

        let peak = samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max);
        assert!((peak - 1.0).abs() < 1e-9);
        assert!(samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_pink_noise_is_bass_heavy() {
        let mut rng = create_rng(42);
        let n = 4096;
        let samples = pink_noise(&mut rng, n);

        let mut spectrum: Vec<Complex<f64>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        let mut planner = FftPlanner::new();
        planner.plan_fft_forward(n).process(&mut spectrum);

        let band_energy = |lo: usize, hi: usize| -> f64 {
            spectrum[lo..hi].iter().map(|c| c.norm_sqr()).sum()
        };

        // Equal-width bands, one at the bottom and one near Nyquist; the
        // 1/f power law concentrates energy in the low band.
        let low = band_energy(1, 257);
        let high = band_energy(n / 2 - 256, n / 2);
        assert!(
            low > 2.0 * high,
            "expected bass-heavy spectrum, low={low} high={high}"
        );
    }

    #[test]
    fn test_pink_noise_degenerate_lengths() {
        let mut rng = create_rng(42);
        assert!(pink_noise(&mut rng, 0).is_empty());
        assert_eq!(pink_noise(&mut rng, 1).len(), 1);
    }
}
