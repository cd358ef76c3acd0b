//! Knock Parameter Model
//!
//! This crate provides the typed parameter and measurement model shared by
//! the Knock synthesis engine and tooling:
//!
//! - **Parameters**: [`SynthParams`], [`ChainParams`], and [`LayerParams`]
//!   fully determine one rendered impact sound. They are immutable value
//!   types with a single explicit pack/unpack pair to and from the flat
//!   `f64` vectors the optimizer searches over.
//! - **Features**: [`FeatureVector`] holds the eight statistical moments the
//!   analyzer measures; [`TargetRanges`] holds the per-feature calibration
//!   corridors derived from reference recordings.
//! - **Bounds**: [`ParamBounds`] describes the closed legal interval of every
//!   search dimension.
//!
//! All types serialize with serde so sound definitions, calibration targets,
//! and results round-trip through JSON documents.

pub mod bounds;
pub mod error;
pub mod features;
pub mod params;

// Re-export main types at crate root
pub use bounds::ParamBounds;
pub use error::{SpecError, SpecResult};
pub use features::{FeatureVector, TargetRange, TargetRanges, FEATURE_COUNT, FEATURE_NAMES};
pub use params::{
    pack_layers, unpack_layers, ChainParams, CompressorParams, LayerParams, ReverbParams,
    SynthParams,
};
