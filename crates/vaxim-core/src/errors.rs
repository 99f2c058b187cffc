//! Error types for vaxim.
//!
//! A single unified error enum covers the whole workspace. Validation is
//! strict and up-front: coverage values outside [0,1] are rejected before any
//! computation runs, never clamped into range.

use thiserror::Error;

/// Unified error type for all vaxim operations.
#[derive(Error, Debug)]
pub enum VaximError {
    /// A caller-supplied value is outside its admissible range, or two
    /// caller-supplied vectors disagree in length.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A caller-supplied combination of inputs is not a supported model shape
    /// (e.g. a coverage list that is neither two nor three routine doses).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A numerical procedure failed (no valid Beta for the given moments,
    /// optimizer non-convergence, degenerate variance).
    #[error("Numerical error: {0}")]
    Numerical(String),

    /// An internal invariant was violated: a joint term went genuinely
    /// negative, or a normalized distribution's total drifted from 1 beyond
    /// tolerance. Always indicates a defect, never bad caller input.
    #[error("Invariant violated in {context}: {detail}")]
    InvariantViolation { context: String, detail: String },
}

impl VaximError {
    /// Creates an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        VaximError::InvalidArgument(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        VaximError::Configuration(message.into())
    }

    /// Creates a numerical error.
    pub fn numerical(message: impl Into<String>) -> Self {
        VaximError::Numerical(message.into())
    }

    /// Creates an invariant-violation error with context.
    pub fn invariant(context: impl Into<String>, detail: impl Into<String>) -> Self {
        VaximError::InvariantViolation {
            context: context.into(),
            detail: detail.into(),
        }
    }

    /// True when the error points at a library defect rather than bad input.
    pub fn is_defect(&self) -> bool {
        matches!(self, VaximError::InvariantViolation { .. })
    }
}

/// Result type alias for vaxim operations.
pub type Result<T> = std::result::Result<T, VaximError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let arg = VaximError::invalid_argument("coverage 1.2 outside [0,1]");
        assert!(matches!(arg, VaximError::InvalidArgument(_)));

        let cfg = VaximError::configuration("4 routine doses unsupported");
        assert!(matches!(cfg, VaximError::Configuration(_)));

        let inv = VaximError::invariant("normalize", "term -0.3 below zero");
        assert!(matches!(inv, VaximError::InvariantViolation { .. }));
    }

    #[test]
    fn test_defect_classification() {
        assert!(VaximError::invariant("aggregate", "sum 0.9").is_defect());
        assert!(!VaximError::invalid_argument("bad coverage").is_defect());
        assert!(!VaximError::numerical("no convergence").is_defect());
    }

    #[test]
    fn test_display_messages() {
        let err = VaximError::invariant("normalize", "omega = 0");
        assert_eq!(err.to_string(), "Invariant violated in normalize: omega = 0");
    }
}
