//! Calibration: tuning impact parameters against target feature ranges.
//!
//! Builds the objective `render -> process -> analyze -> cost` as a pure
//! function of the flat parameter vector and drives the differential
//! evolution search over it. All noise inside the objective uses one fixed
//! seed derived from the calibration seed, so the cost of a candidate never
//! depends on when or where it is evaluated.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use knock_spec::{pack_layers, unpack_layers, FeatureVector, LayerParams, ParamBounds, TargetRanges};

use crate::chain;
use crate::cost::cost;
use crate::error::{SynthError, SynthResult};
use crate::features::analyze;
use crate::optimizer::{
    DeConfig, DifferentialEvolution, GenerationStats, OptimizationResult,
};
use crate::rng::{create_rng, derive_component_seed, derive_layer_seed};
use crate::synthesis::impact::ImpactSynth;
use crate::synthesis::Synthesizer;

/// One calibration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalibrationSpec {
    /// Target ranges for all eight features.
    pub targets: TargetRanges,
    /// Number of layered impacts in the compound sound.
    #[serde(default = "default_layers")]
    pub layers: usize,
    /// Base seed for the search and all objective noise.
    #[serde(default)]
    pub seed: u64,
    /// Optional warm-start vector (flat, `layers * 10` values).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_guess: Option<Vec<f64>>,
    /// Wall-clock budget in seconds.
    #[serde(default = "default_budget_secs")]
    pub time_budget_secs: f64,
    /// Best-cost value that counts as success.
    #[serde(default = "default_threshold")]
    pub success_threshold: f64,
    /// Rendered duration of each candidate in seconds.
    #[serde(default = "default_duration_s")]
    pub duration_s: f64,
    /// Population size for the search.
    #[serde(default = "default_population")]
    pub population: usize,
    /// Absolute generation cap.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
}

fn default_layers() -> usize {
    1
}

fn default_budget_secs() -> f64 {
    30.0
}

fn default_threshold() -> f64 {
    1e-3
}

fn default_duration_s() -> f64 {
    0.25
}

fn default_population() -> usize {
    24
}

fn default_max_generations() -> usize {
    200
}

impl CalibrationSpec {
    /// Creates a spec with the documented defaults for the given targets.
    pub fn new(targets: TargetRanges, seed: u64) -> Self {
        Self {
            targets,
            layers: default_layers(),
            seed,
            initial_guess: None,
            time_budget_secs: default_budget_secs(),
            success_threshold: default_threshold(),
            duration_s: default_duration_s(),
            population: default_population(),
            max_generations: default_max_generations(),
        }
    }

    fn to_de_config(&self) -> DeConfig {
        DeConfig {
            population: self.population,
            max_generations: self.max_generations,
            success_threshold: self.success_threshold,
            time_budget: Duration::from_secs_f64(self.time_budget_secs.max(1e-3)),
            ..DeConfig::default()
        }
    }
}

/// Outcome of one calibration run.
///
/// Verification failures are warnings, never errors: the search returns its
/// best effort and the caller decides whether the remaining cost is
/// acceptable.
#[derive(Debug, Clone, Serialize)]
pub struct CalibrationOutcome {
    /// Raw optimizer result over the flat vector.
    pub result: OptimizationResult,
    /// Best-found parameters, unpacked per layer.
    pub layers: Vec<LayerParams>,
    /// Features of the re-rendered best candidate.
    pub features: FeatureVector,
    /// One entry per feature that ended outside its target range.
    pub warnings: Vec<String>,
}

/// The fixed noise seed every objective evaluation under `seed` shares.
pub fn objective_noise_seed(seed: u64) -> u64 {
    derive_component_seed(seed, "objective-noise")
}

/// Renders a compound sound from per-layer parameters and sums the layers.
///
/// Each layer draws its noise from a seed derived from `noise_seed` and the
/// layer index, runs through its own post-processing chain, and is added
/// into the mix unweighted.
pub fn render_layers(
    layers: &[LayerParams],
    duration_s: f64,
    sample_rate: f64,
    noise_seed: u64,
) -> SynthResult<Vec<f64>> {
    if layers.is_empty() {
        return Err(SynthError::invalid_config("at least one layer is required"));
    }

    let num_samples = (duration_s * sample_rate).round() as usize;
    let mut mix = vec![0.0_f64; num_samples];

    for (index, layer) in layers.iter().enumerate() {
        layer.validate()?;
        let mut rng = create_rng(derive_layer_seed(noise_seed, index as u32));
        let raw = ImpactSynth::new(layer.synth).synthesize(num_samples, sample_rate, &mut rng);
        let processed = chain::process(&raw, &layer.chain, sample_rate)?;
        for (slot, sample) in mix.iter_mut().zip(&processed) {
            *slot += sample;
        }
    }

    Ok(mix)
}

/// Runs one calibration with progress reporting.
///
/// `callback` is invoked once per generation with read-only best-cost state
/// and may return `true` to stop early.
pub fn calibrate_with_progress<C>(
    spec: &CalibrationSpec,
    bounds: &ParamBounds,
    sample_rate: f64,
    callback: C,
) -> SynthResult<CalibrationOutcome>
where
    C: FnMut(&GenerationStats) -> bool,
{
    spec.targets.validate()?;
    if spec.layers == 0 {
        return Err(SynthError::invalid_config("layers must be at least 1"));
    }
    let expected_dims = spec.layers * LayerParams::SEARCH_DIMS;
    if bounds.len() != expected_dims {
        return Err(SynthError::invalid_config(format!(
            "bounds have {} dimensions, {} layers need {}",
            bounds.len(),
            spec.layers,
            expected_dims
        )));
    }

    let noise_seed = objective_noise_seed(spec.seed);
    let search_seed = derive_component_seed(spec.seed, "search");
    let layers = spec.layers;
    let duration_s = spec.duration_s;
    let targets = spec.targets;

    let objective = move |vector: &[f64]| -> f64 {
        // The optimizer preserves dimensionality and bounds, so these paths
        // only reject candidates if the model itself cannot express them.
        let layer_params = match unpack_layers(vector, layers) {
            Ok(l) => l,
            Err(_) => return f64::INFINITY,
        };
        match render_layers(&layer_params, duration_s, sample_rate, noise_seed) {
            Ok(waveform) => cost(&analyze(&waveform, sample_rate), &targets),
            Err(_) => f64::INFINITY,
        }
    };

    let mut search =
        DifferentialEvolution::new(bounds.clone(), spec.to_de_config(), search_seed)?;
    if let Some(x0) = &spec.initial_guess {
        search = search.with_initial_guess(x0.clone())?;
    }

    let result = search.run_with(objective, callback);

    let best_layers = unpack_layers(&result.best, spec.layers)?;
    let waveform = render_layers(&best_layers, spec.duration_s, sample_rate, noise_seed)?;
    let features = analyze(&waveform, sample_rate);

    let warnings = spec
        .targets
        .as_array()
        .iter()
        .zip(features.as_array())
        .zip(knock_spec::FEATURE_NAMES)
        .filter(|((range, value), _)| !range.contains(*value))
        .map(|((range, value), name)| {
            format!(
                "{name} = {value:.4} outside target [{:.4}, {:.4}]",
                range.low, range.high
            )
        })
        .collect();

    Ok(CalibrationOutcome {
        result,
        layers: best_layers,
        features,
        warnings,
    })
}

/// Runs one calibration without progress reporting.
pub fn calibrate(
    spec: &CalibrationSpec,
    bounds: &ParamBounds,
    sample_rate: f64,
) -> SynthResult<CalibrationOutcome> {
    calibrate_with_progress(spec, bounds, sample_rate, |_| false)
}

/// Packs hand-authored layers into a warm-start vector.
pub fn warm_start(layers: &[LayerParams]) -> Vec<f64> {
    pack_layers(layers)
}
