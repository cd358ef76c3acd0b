//! Feature vectors and calibration target ranges.
//!
//! The eight features are statistical moments of a rendered waveform: four
//! over a log-frequency power spectrum and four over the time-domain energy
//! envelope. Their order is fixed and shared between [`FeatureVector`] and
//! [`TargetRanges`], so the two can be zipped without a lookup step.

use serde::{Deserialize, Serialize};

use crate::error::{SpecError, SpecResult};

/// Number of features.
pub const FEATURE_COUNT: usize = 8;

/// Feature names in canonical order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "f_centroid",
    "f_spread",
    "f_skewness",
    "f_kurtosis",
    "t_centroid",
    "t_spread",
    "t_skewness",
    "t_kurtosis",
];

/// Statistical moments of one waveform.
///
/// Derived data, never hand-edited. Kurtosis values use the Fisher convention
/// (a normal distribution scores 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureVector {
    /// Power-weighted spectral centroid, reported in Hz.
    pub f_centroid: f64,
    /// Power-weighted spectral spread in octaves.
    pub f_spread: f64,
    /// Standardized third spectral moment.
    pub f_skewness: f64,
    /// Standardized fourth spectral moment, Fisher convention.
    pub f_kurtosis: f64,
    /// Energy-weighted temporal centroid in milliseconds.
    pub t_centroid: f64,
    /// Energy-weighted temporal spread in milliseconds.
    pub t_spread: f64,
    /// Standardized third temporal moment.
    pub t_skewness: f64,
    /// Standardized fourth temporal moment, Fisher convention.
    pub t_kurtosis: f64,
}

impl FeatureVector {
    /// Returns the features as an array in canonical order.
    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.f_centroid,
            self.f_spread,
            self.f_skewness,
            self.f_kurtosis,
            self.t_centroid,
            self.t_spread,
            self.t_skewness,
            self.t_kurtosis,
        ]
    }

    /// Builds a feature vector from an array in canonical order.
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            f_centroid: values[0],
            f_spread: values[1],
            f_skewness: values[2],
            f_kurtosis: values[3],
            t_centroid: values[4],
            t_spread: values[5],
            t_skewness: values[6],
            t_kurtosis: values[7],
        }
    }

    /// True when every feature is a finite number.
    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }
}

/// An inclusive `[low, high]` interval for one feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetRange {
    /// Lower edge (inclusive).
    pub low: f64,
    /// Upper edge (inclusive).
    pub high: f64,
}

impl TargetRange {
    /// Creates a range, rejecting inverted or non-finite edges.
    pub fn new(feature: &'static str, low: f64, high: f64) -> SpecResult<Self> {
        if !low.is_finite() || !high.is_finite() || low > high {
            return Err(SpecError::InvalidRange { feature, low, high });
        }
        Ok(Self { low, high })
    }

    /// True when `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    /// Midpoint of the range.
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    /// Width of the range.
    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Target ranges for all eight features, in canonical order.
///
/// Invariant: `low <= high` holds for every range, enforced at construction
/// and re-checked after deserialization via [`TargetRanges::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetRanges {
    pub f_centroid: TargetRange,
    pub f_spread: TargetRange,
    pub f_skewness: TargetRange,
    pub f_kurtosis: TargetRange,
    pub t_centroid: TargetRange,
    pub t_spread: TargetRange,
    pub t_skewness: TargetRange,
    pub t_kurtosis: TargetRange,
}

impl TargetRanges {
    /// Builds ranges from two reference measurements plus a symmetric
    /// tolerance margin.
    ///
    /// For each feature the raw interval spans the two reference values; it
    /// is then widened on both sides by `margin` times the sum of the
    /// interval half-width and the midpoint magnitude, so tight intervals on
    /// large-valued features (Hz) and near-zero features (skewness) both get
    /// a usable corridor.
    pub fn from_references(a: &FeatureVector, b: &FeatureVector, margin: f64) -> SpecResult<Self> {
        let av = a.as_array();
        let bv = b.as_array();
        let mut ranges = [TargetRange { low: 0.0, high: 0.0 }; FEATURE_COUNT];

        for i in 0..FEATURE_COUNT {
            let low = av[i].min(bv[i]);
            let high = av[i].max(bv[i]);
            let mid = 0.5 * (low + high);
            let pad = margin * (0.5 * (high - low) + mid.abs());
            ranges[i] = TargetRange::new(FEATURE_NAMES[i], low - pad, high + pad)?;
        }

        Ok(Self::from_ranges(ranges))
    }

    /// Builds the struct from an array in canonical order.
    pub fn from_ranges(ranges: [TargetRange; FEATURE_COUNT]) -> Self {
        Self {
            f_centroid: ranges[0],
            f_spread: ranges[1],
            f_skewness: ranges[2],
            f_kurtosis: ranges[3],
            t_centroid: ranges[4],
            t_spread: ranges[5],
            t_skewness: ranges[6],
            t_kurtosis: ranges[7],
        }
    }

    /// Returns the ranges as an array in canonical order.
    pub fn as_array(&self) -> [TargetRange; FEATURE_COUNT] {
        [
            self.f_centroid,
            self.f_spread,
            self.f_skewness,
            self.f_kurtosis,
            self.t_centroid,
            self.t_spread,
            self.t_skewness,
            self.t_kurtosis,
        ]
    }

    /// Re-checks the `low <= high` invariant on every range.
    pub fn validate(&self) -> SpecResult<()> {
        for (range, name) in self.as_array().iter().zip(FEATURE_NAMES) {
            if !range.low.is_finite() || !range.high.is_finite() || range.low > range.high {
                return Err(SpecError::InvalidRange {
                    feature: name,
                    low: range.low,
                    high: range.high,
                });
            }
        }
        Ok(())
    }

    /// The feature vector sitting at the midpoint of every range.
    pub fn midpoints(&self) -> FeatureVector {
        let ranges = self.as_array();
        let mut mids = [0.0; FEATURE_COUNT];
        for (mid, range) in mids.iter_mut().zip(&ranges) {
            *mid = range.midpoint();
        }
        FeatureVector::from_array(mids)
    }

    /// Names of the features whose value falls outside its range.
    pub fn violations(&self, features: &FeatureVector) -> Vec<&'static str> {
        self.as_array()
            .iter()
            .zip(features.as_array())
            .zip(FEATURE_NAMES)
            .filter(|((range, value), _)| !range.contains(*value))
            .map(|(_, name)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_pair() -> (FeatureVector, FeatureVector) {
        let a = FeatureVector::from_array([420.0, 1.1, 0.8, 1.5, 38.0, 22.0, 1.4, 2.1]);
        let b = FeatureVector::from_array([510.0, 1.4, 1.1, 2.6, 45.0, 27.0, 1.9, 3.4]);
        (a, b)
    }

    #[test]
    fn test_array_roundtrip() {
        let (a, _) = reference_pair();
        assert_eq!(FeatureVector::from_array(a.as_array()), a);
    }

    #[test]
    fn test_range_rejects_inverted() {
        assert!(TargetRange::new("f_centroid", 2.0, 1.0).is_err());
        assert!(TargetRange::new("f_centroid", f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_from_references_contains_both() {
        let (a, b) = reference_pair();
        let targets = TargetRanges::from_references(&a, &b, 0.25).unwrap();
        targets.validate().unwrap();

        assert!(targets.violations(&a).is_empty());
        assert!(targets.violations(&b).is_empty());
    }

    #[test]
    fn test_from_references_widens_symmetrically() {
        let (a, b) = reference_pair();
        let targets = TargetRanges::from_references(&a, &b, 0.25).unwrap();

        // Raw interval for f_centroid is [420, 510]; margin widens both edges.
        assert!(targets.f_centroid.low < 420.0);
        assert!(targets.f_centroid.high > 510.0);

        let mid = targets.f_centroid.midpoint();
        assert!((mid - 465.0).abs() < 1e-9);
    }

    #[test]
    fn test_violations_reports_names() {
        let (a, b) = reference_pair();
        let targets = TargetRanges::from_references(&a, &b, 0.1).unwrap();

        let mut outlier = targets.midpoints();
        outlier.t_spread = 1e6;
        assert_eq!(targets.violations(&outlier), vec!["t_spread"]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let (a, b) = reference_pair();
        let targets = TargetRanges::from_references(&a, &b, 0.25).unwrap();
        let json = serde_json::to_string(&targets).unwrap();
        let parsed: TargetRanges = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, targets);
    }
}
