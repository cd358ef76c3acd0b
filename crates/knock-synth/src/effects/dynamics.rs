//! Dynamics processing: envelope-follower compressor.

use knock_spec::CompressorParams;

use crate::error::{SynthError, SynthResult};

/// Converts linear amplitude to decibels.
fn amp_to_db(amp: f64) -> f64 {
    20.0 * amp.abs().max(1e-10).log10()
}

/// Converts decibels to linear amplitude.
fn db_to_amp(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Applies compression to a mono buffer in place.
pub fn apply_compressor(
    samples: &mut [f64],
    params: &CompressorParams,
    sample_rate: f64,
) -> SynthResult<()> {
    if !(-60.0..=0.0).contains(&params.threshold_db) {
        return Err(SynthError::invalid_param(
            "compressor.threshold_db",
            format!("must be -60 to 0, got {}", params.threshold_db),
        ));
    }
    if !(1.0..=20.0).contains(&params.ratio) {
        return Err(SynthError::invalid_param(
            "compressor.ratio",
            format!("must be 1.0-20.0, got {}", params.ratio),
        ));
    }
    if !(0.1..=100.0).contains(&params.attack_ms) {
        return Err(SynthError::invalid_param(
            "compressor.attack_ms",
            format!("must be 0.1-100, got {}", params.attack_ms),
        ));
    }
    if !(10.0..=1000.0).contains(&params.release_ms) {
        return Err(SynthError::invalid_param(
            "compressor.release_ms",
            format!("must be 10-1000, got {}", params.release_ms),
        ));
    }

    let attack_coeff = (-1.0 / (params.attack_ms * 0.001 * sample_rate)).exp();
    let release_coeff = (-1.0 / (params.release_ms * 0.001 * sample_rate)).exp();
    let makeup_gain = db_to_amp(params.makeup_db);

    let mut envelope = 0.0_f64;

    for sample in samples.iter_mut() {
        let input_level = sample.abs();

        // Envelope follower
        if input_level > envelope {
            envelope = attack_coeff * envelope + (1.0 - attack_coeff) * input_level;
        } else {
            envelope = release_coeff * envelope + (1.0 - release_coeff) * input_level;
        }

        let envelope_db = amp_to_db(envelope);
        let gain_db = if envelope_db > params.threshold_db {
            let over_db = envelope_db - params.threshold_db;
            -(over_db * (1.0 - 1.0 / params.ratio))
        } else {
            0.0
        };

        *sample *= db_to_amp(gain_db) * makeup_gain;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compressor_reduces_loud_signal() {
        // A full-scale signal sits far above a -14 dB threshold, so its
        // steady-state level must drop even after makeup gain is removed.
        let params = CompressorParams {
            makeup_db: 0.0,
            ..CompressorParams::default()
        };
        let mut samples = vec![1.0; 44_100];
        apply_compressor(&mut samples, &params, 44_100.0).unwrap();

        let settled = samples[44_000];
        assert!(settled < 0.9, "expected gain reduction, got {settled}");
        assert!(settled > 0.0);
    }

    #[test]
    fn test_compressor_leaves_quiet_signal() {
        let params = CompressorParams {
            makeup_db: 0.0,
            ..CompressorParams::default()
        };
        // -40 dBFS, far below the -14 dB threshold.
        let mut samples = vec![0.01; 4410];
        apply_compressor(&mut samples, &params, 44_100.0).unwrap();
        assert!((samples[4000] - 0.01).abs() < 1e-3);
    }

    #[test]
    fn test_compressor_rejects_bad_ratio() {
        let params = CompressorParams {
            ratio: 0.5,
            ..CompressorParams::default()
        };
        let mut samples = vec![0.0; 16];
        assert!(apply_compressor(&mut samples, &params, 44_100.0).is_err());
    }

    #[test]
    fn test_compressor_determinism() {
        let input: Vec<f64> = (0..4000).map(|i| (i as f64 * 0.021).sin() * 0.8).collect();
        let mut a = input.clone();
        let mut b = input;
        apply_compressor(&mut a, &CompressorParams::default(), 44_100.0).unwrap();
        apply_compressor(&mut b, &CompressorParams::default(), 44_100.0).unwrap();
        assert_eq!(a, b);
    }
}
