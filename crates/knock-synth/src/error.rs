//! Error types for the synthesis engine.

use thiserror::Error;

/// Result type for engine operations.
pub type SynthResult<T> = Result<T, SynthError>;

/// Errors that can occur during synthesis and calibration.
///
/// Degenerate signals (near-zero energy or spread) are deliberately absent:
/// the analyzer handles them locally by returning defined epsilon-guarded
/// feature values, never a failure.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Out-of-domain or non-finite input to a primitive. A caller bug: the
    /// optimizer enforces bounds upstream, so this should not occur during
    /// normal calibration.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Error message.
        message: String,
    },

    /// Malformed optimizer setup (bounds, dimensions, population). Fatal,
    /// surfaced immediately, never retried.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message.
        message: String,
    },

    /// I/O error while persisting audio.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthError {
    /// Creates an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

impl From<knock_spec::SpecError> for SynthError {
    fn from(err: knock_spec::SpecError) -> Self {
        match err {
            knock_spec::SpecError::InvalidParameter { name, message } => {
                Self::InvalidParameter { name, message }
            }
            other => Self::InvalidConfiguration {
                message: other.to_string(),
            },
        }
    }
}
