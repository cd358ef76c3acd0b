//! Error types for parameter validation and marshalling.

use thiserror::Error;

/// Result type for parameter operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors raised while validating or marshalling parameter data.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A parameter value is out of its legal domain or non-finite.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// A flat vector has the wrong number of values for the target type.
    #[error("flat vector has {found} values, expected {expected}")]
    DimensionMismatch {
        /// Expected number of values.
        expected: usize,
        /// Number of values found.
        found: usize,
    },

    /// A search-bounds interval is malformed.
    #[error("invalid bounds at dimension {dim}: {message}")]
    InvalidBounds {
        /// Zero-based dimension index.
        dim: usize,
        /// Error message.
        message: String,
    },

    /// A target range is inverted or non-finite.
    #[error("invalid target range for '{feature}': low {low} must not exceed high {high}")]
    InvalidRange {
        /// Feature name.
        feature: &'static str,
        /// Lower edge.
        low: f64,
        /// Upper edge.
        high: f64,
    },
}

impl SpecError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_param_helper() {
        let err = SpecError::invalid_param("noise_mix", "must be between 0 and 1");
        assert!(err.to_string().contains("noise_mix"));
        assert!(err.to_string().contains("between 0 and 1"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = SpecError::DimensionMismatch {
            expected: 10,
            found: 7,
        };
        assert_eq!(err.to_string(), "flat vector has 7 values, expected 10");
    }
}
