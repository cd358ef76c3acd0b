//! Statistical feature extraction.
//!
//! Computes the eight moments the calibration loop steers by: four over a
//! log-frequency power spectrum (Welch estimate) and four over the
//! time-domain energy envelope.
//!
//! Working in `log2(frequency)` makes an octave doubling a unit shift, which
//! matches pitch perception and keeps the moment math scale-invariant. The
//! zero-frequency bin is discarded before the log transform.
//!
//! Every denominator carries a small additive epsilon, so degenerate inputs
//! (zero energy, zero spread) produce defined values instead of NaN: unit
//! centroid, zero spread and skewness, kurtosis at the Fisher floor of -3.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use knock_spec::FeatureVector;

/// Additive guard for power- and energy-normalizing denominators.
const EPS: f64 = 1e-30;

/// Largest Welch segment length in samples.
const MAX_SEGMENT: usize = 2048;

/// Computes the feature vector of a waveform.
///
/// Deterministic: identical samples always produce a bit-identical vector.
pub fn analyze(samples: &[f64], sample_rate: f64) -> FeatureVector {
    let (freqs, psd) = welch_psd(samples, sample_rate);
    let (f_centroid, f_spread, f_skewness, f_kurtosis) = spectral_moments(&freqs, &psd);
    let (t_centroid, t_spread, t_skewness, t_kurtosis) = temporal_moments(samples, sample_rate);

    FeatureVector {
        f_centroid,
        f_spread,
        f_skewness,
        f_kurtosis,
        t_centroid,
        t_spread,
        t_skewness,
        t_kurtosis,
    }
}

/// Welch power spectral density estimate.
///
/// Hann-windowed segments of `min(2048, len)` samples with 50% overlap,
/// averaged one-sided periodograms. Returns `(frequencies, psd)`; both are
/// empty for signals too short to hold one segment of at least 4 samples.
pub fn welch_psd(samples: &[f64], sample_rate: f64) -> (Vec<f64>, Vec<f64>) {
    let len = samples.len();
    if len < 4 {
        return (vec![], vec![]);
    }

    let nperseg = len.min(MAX_SEGMENT);
    let hop = (nperseg / 2).max(1);
    let num_bins = nperseg / 2 + 1;

    let window: Vec<f64> = (0..nperseg)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / nperseg as f64).cos()))
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(nperseg);

    let mut psd = vec![0.0_f64; num_bins];
    let mut segments = 0usize;
    let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); nperseg];

    let mut start = 0;
    while start + nperseg <= len {
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(samples[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);

        for (k, acc) in psd.iter_mut().enumerate() {
            *acc += buffer[k].norm_sqr();
        }

        segments += 1;
        start += hop;
    }

    let scale = 1.0 / segments as f64;
    for value in &mut psd {
        *value *= scale;
    }

    let freqs = (0..num_bins)
        .map(|k| k as f64 * sample_rate / nperseg as f64)
        .collect();
    (freqs, psd)
}

/// Power-weighted moments over `log2(frequency)`, DC bin discarded.
///
/// Returns `(centroid_hz, spread_octaves, skewness, kurtosis)`.
fn spectral_moments(freqs: &[f64], psd: &[f64]) -> (f64, f64, f64, f64) {
    if freqs.len() <= 1 {
        return (1.0, 0.0, 0.0, -3.0);
    }

    let total: f64 = psd[1..].iter().sum::<f64>() + EPS;

    let mut mean_log = 0.0;
    for (f, p) in freqs[1..].iter().zip(&psd[1..]) {
        mean_log += f.log2() * p;
    }
    mean_log /= total;

    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for (f, p) in freqs[1..].iter().zip(&psd[1..]) {
        let dev = f.log2() - mean_log;
        m2 += dev * dev * p;
        m3 += dev * dev * dev * p;
        m4 += dev * dev * dev * dev * p;
    }

    let spread = (m2 / total).sqrt();
    let skewness = m3 / (total * spread.powi(3) + EPS);
    let kurtosis = m4 / (total * spread.powi(4) + EPS) - 3.0;

    (2.0_f64.powf(mean_log), spread, skewness, kurtosis)
}

/// Energy-weighted moments over time in milliseconds.
///
/// Returns `(centroid_ms, spread_ms, skewness, kurtosis)`.
fn temporal_moments(samples: &[f64], sample_rate: f64) -> (f64, f64, f64, f64) {
    let total: f64 = samples.iter().map(|s| s * s).sum::<f64>() + EPS;
    let ms_per_sample = 1000.0 / sample_rate;

    let mut centroid = 0.0;
    for (i, s) in samples.iter().enumerate() {
        centroid += i as f64 * ms_per_sample * s * s;
    }
    centroid /= total;

    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for (i, s) in samples.iter().enumerate() {
        let dev = i as f64 * ms_per_sample - centroid;
        let energy = s * s;
        m2 += dev * dev * energy;
        m3 += dev * dev * dev * energy;
        m4 += dev * dev * dev * dev * energy;
    }

    let spread = (m2 / total).sqrt();
    let skewness = m3 / (total * spread.powi(3) + EPS);
    let kurtosis = m4 / (total * spread.powi(4) + EPS) - 3.0;

    (centroid, spread, skewness, kurtosis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::sine_wave;
    use pretty_assertions::assert_eq;

    const SR: f64 = 44_100.0;

    #[test]
    fn test_analyze_is_deterministic() {
        let samples = sine_wave(440.0, 22_050, SR);
        let a = analyze(&samples, SR);
        let b = analyze(&samples, SR);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_waveform_yields_defined_features() {
        let features = analyze(&vec![0.0; 8820], SR);

        assert!(features.is_finite());
        assert_eq!(features.f_centroid, 1.0);
        assert_eq!(features.f_spread, 0.0);
        assert_eq!(features.f_skewness, 0.0);
        assert_eq!(features.f_kurtosis, -3.0);
        assert_eq!(features.t_centroid, 0.0);
        assert_eq!(features.t_spread, 0.0);
        assert_eq!(features.t_skewness, 0.0);
        assert_eq!(features.t_kurtosis, -3.0);
    }

    #[test]
    fn test_empty_and_tiny_waveforms_are_defined() {
        assert!(analyze(&[], SR).is_finite());
        assert!(analyze(&[0.3], SR).is_finite());
        assert!(analyze(&[0.3, -0.2, 0.1], SR).is_finite());
    }

    #[test]
    fn test_sine_centroid_tracks_frequency() {
        let samples = sine_wave(440.0, SR as usize, SR);
        let features = analyze(&samples, SR);

        assert!(
            (400.0..480.0).contains(&features.f_centroid),
            "f_centroid was {}",
            features.f_centroid
        );
        assert!(features.f_spread < 0.6, "f_spread was {}", features.f_spread);
        assert!(features.f_kurtosis > 0.0);
    }

    #[test]
    fn test_steady_signal_time_moments() {
        // Constant-amplitude tone: energy is uniform over the second, so the
        // centroid sits mid-buffer and the distribution is platykurtic.
        let samples = sine_wave(440.0, SR as usize, SR);
        let features = analyze(&samples, SR);

        assert!(
            (450.0..550.0).contains(&features.t_centroid),
            "t_centroid was {}",
            features.t_centroid
        );
        assert!(features.t_skewness.abs() < 0.2);
        assert!(
            (-1.5..-0.9).contains(&features.t_kurtosis),
            "t_kurtosis was {}",
            features.t_kurtosis
        );
    }

    #[test]
    fn test_features_are_scale_invariant() {
        let samples = sine_wave(330.0, 22_050, SR);
        let doubled: Vec<f64> = samples.iter().map(|s| s * 2.0).collect();

        let a = analyze(&samples, SR);
        let b = analyze(&doubled, SR);

        for (x, y) in a.as_array().iter().zip(b.as_array()) {
            let tolerance = 1e-6 * x.abs().max(1.0);
            assert!((x - y).abs() < tolerance, "{x} vs {y}");
        }
    }

    #[test]
    fn test_front_loaded_energy_is_right_skewed() {
        // Energy packed at the start of the buffer: positive time skewness.
        let mut samples = vec![0.0; 44_100];
        for (i, s) in samples.iter_mut().enumerate().take(2205) {
            *s = (1.0 - i as f64 / 2205.0) * (i as f64 * 0.3).sin();
        }
        let features = analyze(&samples, SR);
        assert!(features.t_skewness > 0.5);
    }

    #[test]
    fn test_welch_segment_cap() {
        let samples = sine_wave(440.0, 10_000, SR);
        let (freqs, psd) = welch_psd(&samples, SR);

        // Segment capped at 2048 -> 1025 one-sided bins.
        assert_eq!(freqs.len(), 1025);
        assert_eq!(psd.len(), 1025);
        assert_eq!(freqs[0], 0.0);
        assert!((freqs[1] - SR / 2048.0).abs() < 1e-9);
    }

    #[test]
    fn test_welch_short_signal_uses_whole_buffer() {
        let samples = sine_wave(440.0, 512, SR);
        let (freqs, _) = welch_psd(&samples, SR);
        assert_eq!(freqs.len(), 257);
    }
}
