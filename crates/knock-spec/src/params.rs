//! Typed synthesis and post-processing parameters.
//!
//! The optimizer only understands flat `f64` vectors, so every parameter type
//! here carries a single explicit pack/unpack pair (`to_flat`/`from_flat`).
//! Internal code never indexes into an untyped vector; the flat form exists
//! at the optimizer boundary only.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Parameters of one modal impact render.
///
/// Immutable once constructed: produced either from hand-authored defaults or
/// by the optimizer via [`SynthParams::from_flat`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthParams {
    /// Fundamental frequency of the mode bank in Hz.
    pub fundamental_hz: f64,
    /// Noise residual mix level (0.0 = pure modes, 1.0 = equal weight).
    pub noise_mix: f64,
    /// Upper band edge of the noise residual in Hz.
    pub noise_brightness_hz: f64,
    /// Tilt between fundamental and overtones (0.0 = dark, 1.0 = bright).
    pub mode_balance: f64,
    /// Envelope onset delay in milliseconds.
    pub onset_ms: f64,
    /// Envelope decay scale (tau) in milliseconds.
    pub decay_ms: f64,
    /// Envelope decay shape exponent (beta); values below 1 front-load energy.
    pub decay_shape: f64,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            fundamental_hz: 110.0,
            noise_mix: 0.35,
            noise_brightness_hz: 3000.0,
            mode_balance: 0.4,
            onset_ms: 2.0,
            decay_ms: 60.0,
            decay_shape: 0.85,
        }
    }
}

impl SynthParams {
    /// Number of values in the flat representation.
    pub const DIMS: usize = 7;

    /// Checks that every field is finite and inside its legal domain.
    pub fn validate(&self) -> SpecResult<()> {
        check_finite("fundamental_hz", self.fundamental_hz)?;
        check_finite("noise_mix", self.noise_mix)?;
        check_finite("noise_brightness_hz", self.noise_brightness_hz)?;
        check_finite("mode_balance", self.mode_balance)?;
        check_finite("onset_ms", self.onset_ms)?;
        check_finite("decay_ms", self.decay_ms)?;
        check_finite("decay_shape", self.decay_shape)?;

        if self.fundamental_hz <= 0.0 {
            return Err(SpecError::invalid_param(
                "fundamental_hz",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.noise_mix) {
            return Err(SpecError::invalid_param("noise_mix", "must be in [0, 1]"));
        }
        if self.noise_brightness_hz <= 0.0 {
            return Err(SpecError::invalid_param(
                "noise_brightness_hz",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.mode_balance) {
            return Err(SpecError::invalid_param("mode_balance", "must be in [0, 1]"));
        }
        if self.onset_ms < 0.0 {
            return Err(SpecError::invalid_param("onset_ms", "must be non-negative"));
        }
        if self.decay_ms <= 0.0 {
            return Err(SpecError::invalid_param("decay_ms", "must be positive"));
        }
        if self.decay_shape <= 0.0 {
            return Err(SpecError::invalid_param("decay_shape", "must be positive"));
        }
        Ok(())
    }

    /// Appends the flat representation to `out`.
    pub fn to_flat(&self, out: &mut Vec<f64>) {
        out.extend_from_slice(&[
            self.fundamental_hz,
            self.noise_mix,
            self.noise_brightness_hz,
            self.mode_balance,
            self.onset_ms,
            self.decay_ms,
            self.decay_shape,
        ]);
    }

    /// Builds params from a flat slice of exactly [`SynthParams::DIMS`] values.
    pub fn from_flat(values: &[f64]) -> SpecResult<Self> {
        if values.len() != Self::DIMS {
            return Err(SpecError::DimensionMismatch {
                expected: Self::DIMS,
                found: values.len(),
            });
        }
        Ok(Self {
            fundamental_hz: values[0],
            noise_mix: values[1],
            noise_brightness_hz: values[2],
            mode_balance: values[3],
            onset_ms: values[4],
            decay_ms: values[5],
            decay_shape: values[6],
        })
    }
}

/// Mono reverb stage settings (not searched by the optimizer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReverbParams {
    /// Room size (0.0 to 1.0).
    pub room_size: f64,
    /// High-frequency damping (0.0 to 1.0).
    pub damping: f64,
    /// Wet mix level (0.0 to 1.0).
    pub wet: f64,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            room_size: 0.18,
            damping: 0.4,
            wet: 0.22,
        }
    }
}

/// Compressor stage settings (not searched by the optimizer).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompressorParams {
    /// Threshold in dBFS (-60 to 0).
    pub threshold_db: f64,
    /// Compression ratio (1.0 to 20.0).
    pub ratio: f64,
    /// Attack time in milliseconds.
    pub attack_ms: f64,
    /// Release time in milliseconds.
    pub release_ms: f64,
    /// Makeup gain in dB.
    pub makeup_db: f64,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: -14.0,
            ratio: 3.5,
            attack_ms: 2.0,
            release_ms: 60.0,
            makeup_db: 2.0,
        }
    }
}

/// Post-processing chain settings.
///
/// The first three fields are the searchable part of the chain; each stage is
/// an exact no-op at its boundary value (0 Hz high-pass, at-or-above-Nyquist
/// low-pass, unit gain, `None` reverb/compressor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainParams {
    /// High-pass cutoff in Hz; 0 disables the stage.
    pub highpass_hz: f64,
    /// Low-pass cutoff in Hz; at or above Nyquist the stage passes through.
    pub lowpass_hz: f64,
    /// Linear output gain.
    pub gain: f64,
    /// Optional reverb stage for non-calibrated sound families.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverb: Option<ReverbParams>,
    /// Optional compressor stage for non-calibrated sound families.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressor: Option<CompressorParams>,
}

impl Default for ChainParams {
    fn default() -> Self {
        Self {
            highpass_hz: 0.0,
            lowpass_hz: 24_000.0,
            gain: 1.0,
            reverb: None,
            compressor: None,
        }
    }
}

impl ChainParams {
    /// Number of searchable values in the flat representation.
    pub const SEARCH_DIMS: usize = 3;

    /// An identity chain: every stage at its no-op boundary value.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Checks that every searchable field is finite and legal.
    pub fn validate(&self) -> SpecResult<()> {
        check_finite("highpass_hz", self.highpass_hz)?;
        check_finite("lowpass_hz", self.lowpass_hz)?;
        check_finite("gain", self.gain)?;
        if self.highpass_hz < 0.0 {
            return Err(SpecError::invalid_param(
                "highpass_hz",
                "must be non-negative",
            ));
        }
        if self.lowpass_hz <= 0.0 {
            return Err(SpecError::invalid_param("lowpass_hz", "must be positive"));
        }
        if self.gain < 0.0 {
            return Err(SpecError::invalid_param("gain", "must be non-negative"));
        }
        Ok(())
    }

    /// Appends the searchable fields to `out`.
    pub fn to_flat(&self, out: &mut Vec<f64>) {
        out.extend_from_slice(&[self.highpass_hz, self.lowpass_hz, self.gain]);
    }

    /// Builds a chain from a flat slice of exactly [`ChainParams::SEARCH_DIMS`]
    /// values; the optional stages are left disabled.
    pub fn from_flat(values: &[f64]) -> SpecResult<Self> {
        if values.len() != Self::SEARCH_DIMS {
            return Err(SpecError::DimensionMismatch {
                expected: Self::SEARCH_DIMS,
                found: values.len(),
            });
        }
        Ok(Self {
            highpass_hz: values[0],
            lowpass_hz: values[1],
            gain: values[2],
            reverb: None,
            compressor: None,
        })
    }
}

/// One synthesis layer: impact parameters plus its post-processing chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerParams {
    /// Modal impact parameters.
    pub synth: SynthParams,
    /// Post-processing chain for this layer.
    pub chain: ChainParams,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            synth: SynthParams::default(),
            chain: ChainParams::identity(),
        }
    }
}

impl LayerParams {
    /// Searchable values per layer.
    pub const SEARCH_DIMS: usize = SynthParams::DIMS + ChainParams::SEARCH_DIMS;

    /// Checks both halves of the layer.
    pub fn validate(&self) -> SpecResult<()> {
        self.synth.validate()?;
        self.chain.validate()
    }

    /// Appends the flat representation to `out`.
    pub fn to_flat(&self, out: &mut Vec<f64>) {
        self.synth.to_flat(out);
        self.chain.to_flat(out);
    }

    /// Builds a layer from a flat slice of exactly
    /// [`LayerParams::SEARCH_DIMS`] values.
    pub fn from_flat(values: &[f64]) -> SpecResult<Self> {
        if values.len() != Self::SEARCH_DIMS {
            return Err(SpecError::DimensionMismatch {
                expected: Self::SEARCH_DIMS,
                found: values.len(),
            });
        }
        Ok(Self {
            synth: SynthParams::from_flat(&values[..SynthParams::DIMS])?,
            chain: ChainParams::from_flat(&values[SynthParams::DIMS..])?,
        })
    }

    /// Default search intervals for one layer, ordered as the flat form.
    ///
    /// Frequency-valued dimensions are capped below the Nyquist limit of the
    /// given sample rate.
    pub fn default_bounds(sample_rate: f64) -> Vec<(f64, f64)> {
        let upper_hz = (0.45 * sample_rate).min(12_000.0);
        vec![
            (40.0, 2_000.0),     // fundamental_hz
            (0.0, 1.0),          // noise_mix
            (200.0, upper_hz),   // noise_brightness_hz
            (0.0, 1.0),          // mode_balance
            (0.0, 30.0),         // onset_ms
            (5.0, 400.0),        // decay_ms
            (0.3, 3.0),          // decay_shape
            (0.0, 400.0),        // highpass_hz
            (1_000.0, upper_hz), // lowpass_hz
            (0.3, 1.5),          // gain
        ]
    }
}

/// Packs a set of layers into one flat search vector.
pub fn pack_layers(layers: &[LayerParams]) -> Vec<f64> {
    let mut out = Vec::with_capacity(layers.len() * LayerParams::SEARCH_DIMS);
    for layer in layers {
        layer.to_flat(&mut out);
    }
    out
}

/// Unpacks a flat search vector into `num_layers` typed layers.
pub fn unpack_layers(values: &[f64], num_layers: usize) -> SpecResult<Vec<LayerParams>> {
    let expected = num_layers * LayerParams::SEARCH_DIMS;
    if values.len() != expected {
        return Err(SpecError::DimensionMismatch {
            expected,
            found: values.len(),
        });
    }
    values
        .chunks_exact(LayerParams::SEARCH_DIMS)
        .map(LayerParams::from_flat)
        .collect()
}

fn check_finite(name: &'static str, value: f64) -> SpecResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SpecError::invalid_param(name, format!("must be finite, got {value}")))
    }
}
