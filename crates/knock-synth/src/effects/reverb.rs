//! Freeverb-style mono reverb.
//!
//! Eight parallel feedback comb filters into four serial allpass filters.
//! Tuning constants are the classic Freeverb delays at 44.1 kHz and are
//! rescaled for other sample rates.

use knock_spec::ReverbParams;

use crate::error::{SynthError, SynthResult};

// Freeverb tuning constants (in samples at 44.1 kHz)
const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];

const FIXED_GAIN: f64 = 0.015;
const SCALE_DAMPING: f64 = 0.4;
const SCALE_ROOM: f64 = 0.28;
const OFFSET_ROOM: f64 = 0.7;

/// Comb filter with feedback and internal damping.
struct CombFilter {
    buffer: Vec<f64>,
    buffer_index: usize,
    filter_store: f64,
    damp1: f64,
    damp2: f64,
    feedback: f64,
}

impl CombFilter {
    fn new(size: usize, damping: f64, feedback: f64) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            buffer_index: 0,
            filter_store: 0.0,
            damp1: damping,
            damp2: 1.0 - damping,
            feedback,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let output = self.buffer[self.buffer_index];

        // One-pole lowpass in the feedback path
        self.filter_store = output * self.damp2 + self.filter_store * self.damp1;
        self.buffer[self.buffer_index] = input + self.filter_store * self.feedback;

        self.buffer_index += 1;
        if self.buffer_index >= self.buffer.len() {
            self.buffer_index = 0;
        }

        output
    }
}

/// Allpass diffusion filter.
struct AllpassFilter {
    buffer: Vec<f64>,
    buffer_index: usize,
}

impl AllpassFilter {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            buffer_index: 0,
        }
    }

    fn process(&mut self, input: f64) -> f64 {
        let buf_out = self.buffer[self.buffer_index];
        let output = buf_out - input;

        self.buffer[self.buffer_index] = input + buf_out * 0.5;

        self.buffer_index += 1;
        if self.buffer_index >= self.buffer.len() {
            self.buffer_index = 0;
        }

        output
    }
}

/// Applies reverb to a mono buffer in place.
pub fn apply(samples: &mut [f64], params: &ReverbParams, sample_rate: f64) -> SynthResult<()> {
    if !(0.0..=1.0).contains(&params.room_size) {
        return Err(SynthError::invalid_param(
            "reverb.room_size",
            format!("must be 0.0-1.0, got {}", params.room_size),
        ));
    }
    if !(0.0..=1.0).contains(&params.damping) {
        return Err(SynthError::invalid_param(
            "reverb.damping",
            format!("must be 0.0-1.0, got {}", params.damping),
        ));
    }
    if !(0.0..=1.0).contains(&params.wet) {
        return Err(SynthError::invalid_param(
            "reverb.wet",
            format!("must be 0.0-1.0, got {}", params.wet),
        ));
    }

    let feedback = params.room_size * SCALE_ROOM + OFFSET_ROOM;
    let damping = params.damping * SCALE_DAMPING;
    let rate_scale = sample_rate / 44_100.0;

    let mut combs: Vec<CombFilter> = COMB_TUNINGS
        .iter()
        .map(|&size| {
            CombFilter::new(
                (size as f64 * rate_scale).round() as usize,
                damping,
                feedback,
            )
        })
        .collect();
    let mut allpasses: Vec<AllpassFilter> = ALLPASS_TUNINGS
        .iter()
        .map(|&size| AllpassFilter::new((size as f64 * rate_scale).round() as usize))
        .collect();

    let dry = 1.0 - params.wet;
    for sample in samples.iter_mut() {
        let input = *sample * FIXED_GAIN;

        let mut wet_signal = 0.0;
        for comb in &mut combs {
            wet_signal += comb.process(input);
        }
        for allpass in &mut allpasses {
            wet_signal = allpass.process(wet_signal);
        }

        *sample = *sample * dry + wet_signal * params.wet;
    }

    Ok(())
}
