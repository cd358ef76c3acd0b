//! Synthesis modules.
//!
//! - `impact` - Modal impact synthesis (the calibrated sound family)
//! - `tonal` - Deterministic tonal voices for the non-calibrated palette

pub mod impact;
pub mod tonal;

use rand_pcg::Pcg32;

/// Common trait for all synthesis modules.
pub trait Synthesizer {
    /// Generates audio samples.
    ///
    /// # Arguments
    /// * `num_samples` - Number of samples to generate
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `rng` - Deterministic RNG for any randomness
    fn synthesize(&self, num_samples: usize, sample_rate: f64, rng: &mut Pcg32) -> Vec<f64>;
}
