//! Post-processing chain.
//!
//! Fixed stage order: peak-normalize, high-pass, low-pass, gain, optional
//! reverb, optional compressor, clamp limit, fade-out. Each stage is an
//! exact no-op at its boundary value, so the identity chain changes nothing
//! but overall level and the 5 ms end taper.
//!
//! The normalize/limit bracket keeps the analyzer's moment calculations free
//! of clipping artifacts: moments are energy-normalized, so the level itself
//! does not move them.

use knock_spec::ChainParams;

use crate::effects::{dynamics, reverb};
use crate::envelope;
use crate::error::SynthResult;
use crate::filter;

/// Peak level the chain normalizes to before filtering.
const NORMALIZE_PEAK: f64 = 0.9;

/// Scales the buffer so its absolute peak sits at `target`.
///
/// A near-silent buffer is left untouched rather than divided by its
/// vanishing peak.
pub fn peak_normalize(samples: &mut [f64], target: f64) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0_f64, f64::max);
    if peak > 1e-12 {
        let scale = target / peak;
        for s in samples.iter_mut() {
            *s *= scale;
        }
    }
}

/// Runs the post-processing chain over a raw waveform.
pub fn process(samples: &[f64], chain: &ChainParams, sample_rate: f64) -> SynthResult<Vec<f64>> {
    chain.validate()?;

    let mut output = samples.to_vec();
    peak_normalize(&mut output, NORMALIZE_PEAK);

    output = filter::high_pass(&output, chain.highpass_hz, sample_rate);
    output = filter::low_pass(&output, chain.lowpass_hz, sample_rate);

    if chain.gain != 1.0 {
        for s in &mut output {
            *s *= chain.gain;
        }
    }

    if let Some(reverb_params) = &chain.reverb {
        reverb::apply(&mut output, reverb_params, sample_rate)?;
    }
    if let Some(compressor_params) = &chain.compressor {
        dynamics::apply_compressor(&mut output, compressor_params, sample_rate)?;
    }

    for s in &mut output {
        *s = s.clamp(-1.0, 1.0);
    }
    envelope::fade_out(&mut output, sample_rate);

    Ok(output)
}
