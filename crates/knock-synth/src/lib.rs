//! Knock Synthesis Engine
//!
//! Deterministic impact-sound synthesis with feature-based calibration.
//!
//! # Overview
//!
//! The engine renders short percussive sounds from a parametric modal model
//! and tunes those parameters automatically: a differential-evolution search
//! minimizes the distance between the rendered waveform's statistical
//! features and target ranges measured from reference recordings.
//!
//! The pipeline under the objective is `render -> process -> analyze ->
//! cost`, every stage a pure function of its inputs:
//!
//! - [`render`] - modal impact synthesis from [`knock_spec::SynthParams`]
//! - [`process`] - the post-processing chain from [`knock_spec::ChainParams`]
//! - [`analyze`] - the eight-moment feature extractor
//! - [`cost`] - scalar distance from [`knock_spec::TargetRanges`]
//! - [`calibrate`] - the derivative-free search tying them together
//!
//! # Determinism
//!
//! All randomness flows through PCG32 with BLAKE3-derived seeds. Given the
//! same parameters and seed, every render and every calibration run is
//! bit-identical across runs (on the same platform), which keeps shipped
//! assets reproducible from their definitions.
//!
//! # Crate Structure
//!
//! - [`oscillator`] - sine/triangle oscillators and the noise generators
//! - [`envelope`] - exponential and stretched-exponential envelopes
//! - [`filter`] - zero-phase Butterworth-class filters
//! - [`synthesis`] - the modal impact synthesizer and tonal palette voices
//! - [`chain`] - the post-processing chain
//! - [`effects`] - optional reverb/compressor stages
//! - [`features`] - Welch PSD and moment extraction
//! - [`cost`] - the target-range cost function
//! - [`optimizer`] - bounded differential evolution with a custom stop policy
//! - [`calibrate`] - objective assembly and the calibration entry point
//! - [`bank`] - compute-once orchestration over sound definitions
//! - [`palette`] - the stock sound set
//! - [`rng`] - deterministic RNG with seed derivation
//! - [`wav`] - deterministic WAV writer

pub mod bank;
pub mod calibrate;
pub mod chain;
pub mod cost;
pub mod effects;
pub mod envelope;
pub mod error;
pub mod features;
pub mod filter;
pub mod optimizer;
pub mod oscillator;
pub mod palette;
pub mod rng;
pub mod synthesis;
pub mod wav;

// Re-export the main entry points at crate root
pub use bank::{SoundBank, SoundDef};
pub use calibrate::{
    calibrate, calibrate_with_progress, render_layers, CalibrationOutcome, CalibrationSpec,
};
pub use chain::process;
pub use cost::cost;
pub use error::{SynthError, SynthResult};
pub use features::analyze;
pub use optimizer::{
    DeConfig, DifferentialEvolution, GenerationStats, OptimizationResult, TerminationReason,
};
pub use synthesis::impact::render;
