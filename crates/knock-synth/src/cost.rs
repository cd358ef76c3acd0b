//! Cost function: distance from a feature vector to its target ranges.

use knock_spec::{FeatureVector, TargetRanges};

/// Guard added to the per-feature scale so near-zero midpoints stay usable.
const SCALE_EPS: f64 = 1e-9;

/// Scalar distance of `features` from `targets`.
///
/// Per feature: zero inside the inclusive range, otherwise the squared
/// relative overshoot `((value - boundary) / scale)^2` with
/// `scale = |midpoint| + eps`. Normalizing by the midpoint magnitude puts
/// features with very different natural units (Hz versus dimensionless
/// moments) on comparable penalty scales, so no single feature dominates the
/// search just because its numbers are bigger.
///
/// The total is the sum over all eight features; zero is the success
/// condition.
pub fn cost(features: &FeatureVector, targets: &TargetRanges) -> f64 {
    features
        .as_array()
        .iter()
        .zip(targets.as_array())
        .map(|(&value, range)| {
            if range.contains(value) {
                0.0
            } else {
                let boundary = if value < range.low { range.low } else { range.high };
                let scale = range.midpoint().abs() + SCALE_EPS;
                let overshoot = (value - boundary) / scale;
                overshoot * overshoot
            }
        })
        .sum()
}
