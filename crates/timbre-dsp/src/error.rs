//! Error types for DSP operations.
//!
//! Silence, empty ranges and other degenerate inputs are not errors: they
//! produce neutral results. Only conditions that would otherwise yield a
//! malformed result are reported here.

use thiserror::Error;

/// Errors raised by the analysis core.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Transform length is not a power of two.
    #[error("transform length {len} is not a power of two")]
    NonPowerOfTwo {
        /// Offending buffer length.
        len: usize,
    },

    /// Buffer shapes do not line up.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Too few samples to form a single analysis frame.
    #[error("insufficient data: need {required} samples, have {available}")]
    InsufficientData {
        /// Minimum number of samples needed.
        required: usize,
        /// Samples actually available.
        available: usize,
    },

    /// A parameter is outside its usable domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl Error {
    /// Create an invalid parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias for DSP operations.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_power_of_two_display() {
        let err = Error::NonPowerOfTwo { len: 1000 };
        assert_eq!(err.to_string(), "transform length 1000 is not a power of two");
    }

    #[test]
    fn insufficient_data_display() {
        let err = Error::InsufficientData {
            required: 2048,
            available: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("2048"), "got: {msg}");
        assert!(msg.contains("100"), "got: {msg}");
    }

    #[test]
    fn invalid_factory_produces_correct_variant() {
        let err = Error::invalid("hop_size", "must be non-zero");
        assert!(matches!(err, Error::InvalidParameter { name: "hop_size", .. }));
        assert_eq!(err.to_string(), "invalid parameter 'hop_size': must be non-zero");
    }
}
