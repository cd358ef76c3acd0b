//! Sound bank: orchestration of calibrated and fixed-parameter sounds.
//!
//! The bank is an explicit owned cache keyed by sound identifier. A sound
//! with target ranges is calibrated once on first render and the winning
//! parameters are reused for every later render; sounds without targets
//! bypass the optimizer entirely and render from their fixed parameters.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use knock_spec::{LayerParams, ParamBounds, TargetRanges};

use crate::calibrate::{
    calibrate, objective_noise_seed, render_layers, warm_start, CalibrationOutcome,
    CalibrationSpec,
};
use crate::error::{SynthError, SynthResult};
use crate::rng::derive_component_seed;

/// Definition of one bank sound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundDef {
    /// Stable identifier, also the cache key.
    pub id: String,
    /// Rendered duration in seconds.
    pub duration_s: f64,
    /// Hand-authored layer parameters; doubles as the calibration warm start.
    pub layers: Vec<LayerParams>,
    /// Target ranges; `None` renders the fixed parameters directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<TargetRanges>,
}

/// Owned compute-once cache over a set of sound definitions.
pub struct SoundBank {
    sample_rate: f64,
    seed: u64,
    defs: BTreeMap<String, SoundDef>,
    calibrated: HashMap<String, Vec<LayerParams>>,
    outcomes: HashMap<String, CalibrationOutcome>,
}

impl SoundBank {
    /// Creates an empty bank.
    pub fn new(sample_rate: f64, seed: u64) -> Self {
        Self {
            sample_rate,
            seed,
            defs: BTreeMap::new(),
            calibrated: HashMap::new(),
            outcomes: HashMap::new(),
        }
    }

    /// Registers a sound definition, replacing any previous one and dropping
    /// its cached calibration.
    pub fn insert(&mut self, def: SoundDef) {
        self.calibrated.remove(&def.id);
        self.outcomes.remove(&def.id);
        self.defs.insert(def.id.clone(), def);
    }

    /// Attaches target ranges to an existing sound. Returns false when the
    /// id is unknown.
    pub fn set_targets(&mut self, id: &str, targets: TargetRanges) -> bool {
        match self.defs.get_mut(id) {
            Some(def) => {
                def.targets = Some(targets);
                self.calibrated.remove(id);
                self.outcomes.remove(id);
                true
            }
            None => false,
        }
    }

    /// Registered sound ids, in stable order.
    pub fn ids(&self) -> Vec<String> {
        self.defs.keys().cloned().collect()
    }

    /// The calibration outcome for a sound, if one has run.
    pub fn outcome(&self, id: &str) -> Option<&CalibrationOutcome> {
        self.outcomes.get(id)
    }

    /// Renders a sound, calibrating it first if it defines targets and has
    /// not been calibrated yet.
    pub fn render(&mut self, id: &str) -> SynthResult<Vec<f64>> {
        let def = self
            .defs
            .get(id)
            .ok_or_else(|| SynthError::invalid_config(format!("unknown sound '{id}'")))?
            .clone();

        let sound_seed = derive_component_seed(self.seed, &def.id);

        if let Some(targets) = def.targets {
            if !self.calibrated.contains_key(id) {
                let spec = CalibrationSpec {
                    layers: def.layers.len().max(1),
                    initial_guess: Some(warm_start(&def.layers)),
                    duration_s: def.duration_s,
                    ..CalibrationSpec::new(targets, sound_seed)
                };
                let bounds =
                    ParamBounds::for_impact_layers(spec.layers, self.sample_rate)?;
                let outcome = calibrate(&spec, &bounds, self.sample_rate)?;

                self.calibrated.insert(def.id.clone(), outcome.layers.clone());
                self.outcomes.insert(def.id.clone(), outcome);
            }
        }

        let layers = match self.calibrated.get(id) {
            Some(calibrated) => calibrated.clone(),
            None => def.layers.clone(),
        };

        render_layers(
            &layers,
            def.duration_s,
            self.sample_rate,
            objective_noise_seed(sound_seed),
        )
    }
}
