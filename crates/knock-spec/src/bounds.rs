//! Closed search intervals for the optimizer's flat parameter vector.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};
use crate::params::LayerParams;

/// Per-dimension closed intervals `[lo, hi]` for a flat search vector.
///
/// Every candidate the optimizer evaluates is clamped into these intervals
/// first, so the objective never sees an out-of-bounds value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamBounds {
    intervals: Vec<(f64, f64)>,
}

impl ParamBounds {
    /// Creates bounds, rejecting non-finite or inverted intervals.
    pub fn new(intervals: Vec<(f64, f64)>) -> SpecResult<Self> {
        for (dim, (lo, hi)) in intervals.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(SpecError::InvalidBounds {
                    dim,
                    message: format!("edges must be finite, got [{lo}, {hi}]"),
                });
            }
            if lo > hi {
                return Err(SpecError::InvalidBounds {
                    dim,
                    message: format!("low edge {lo} exceeds high edge {hi}"),
                });
            }
        }
        if intervals.is_empty() {
            return Err(SpecError::InvalidBounds {
                dim: 0,
                message: "at least one dimension is required".to_string(),
            });
        }
        Ok(Self { intervals })
    }

    /// Default bounds for `num_layers` impact layers at the given sample rate.
    pub fn for_impact_layers(num_layers: usize, sample_rate: f64) -> SpecResult<Self> {
        if num_layers == 0 {
            return Err(SpecError::InvalidBounds {
                dim: 0,
                message: "at least one layer is required".to_string(),
            });
        }
        let per_layer = LayerParams::default_bounds(sample_rate);
        let mut intervals = Vec::with_capacity(num_layers * per_layer.len());
        for _ in 0..num_layers {
            intervals.extend_from_slice(&per_layer);
        }
        Self::new(intervals)
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// True when no dimensions are present (never true for validated bounds).
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The interval for one dimension.
    pub fn interval(&self, dim: usize) -> (f64, f64) {
        self.intervals[dim]
    }

    /// Iterates over all intervals in order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.intervals.iter().copied()
    }

    /// Clamps every value of `vector` into its interval.
    pub fn clamp(&self, vector: &mut [f64]) {
        for (value, (lo, hi)) in vector.iter_mut().zip(&self.intervals) {
            *value = value.clamp(*lo, *hi);
        }
    }

    /// True when every value of `vector` lies inside its interval.
    pub fn contains(&self, vector: &[f64]) -> bool {
        vector.len() == self.intervals.len()
            && vector
                .iter()
                .zip(&self.intervals)
                .all(|(v, (lo, hi))| *v >= *lo && *v <= *hi)
    }
}
