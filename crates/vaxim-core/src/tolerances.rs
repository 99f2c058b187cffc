//! Numeric tolerances shared across the engines.
//!
//! The piecewise dropout formulas can leave terms a few ulps below zero or a
//! rate at 1e-16 where exact arithmetic would give 0. `epsilon` is the snap
//! threshold for that noise; `sum_tolerance` is the allowed relative drift of
//! a normalized distribution's total from 1 before it is treated as a defect.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaximError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Magnitude below which a rate or joint term is snapped to exactly 0
    /// (or a rate within epsilon of 1 to exactly 1).
    pub epsilon: f64,
    /// Maximum |total - 1| accepted for a normalized distribution.
    pub sum_tolerance: f64,
}

impl Tolerances {
    /// Anything snapped at a coarser epsilon than this would be rewriting
    /// genuine probability mass, not absorbing rounding noise.
    pub const MAX_EPSILON: f64 = 1e-6;
    pub const MAX_SUM_TOLERANCE: f64 = 1e-3;

    pub const DEFAULT_EPSILON: f64 = 1e-12;
    pub const DEFAULT_SUM_TOLERANCE: f64 = 1e-9;

    pub fn new(epsilon: f64, sum_tolerance: f64) -> Result<Self> {
        let t = Tolerances {
            epsilon,
            sum_tolerance,
        };
        t.validate()?;
        Ok(t)
    }

    pub fn validate(self) -> Result<()> {
        if !(self.epsilon > 0.0 && self.epsilon <= Self::MAX_EPSILON) {
            return Err(VaximError::configuration(format!(
                "epsilon out of bounds: {}",
                self.epsilon
            )));
        }
        if !(self.sum_tolerance > 0.0 && self.sum_tolerance <= Self::MAX_SUM_TOLERANCE) {
            return Err(VaximError::configuration(format!(
                "sum_tolerance out of bounds: {}",
                self.sum_tolerance
            )));
        }
        Ok(())
    }

    /// Snaps `value` to 0 or 1 when it sits within `epsilon` of either end.
    pub fn snap_unit(self, value: f64) -> f64 {
        if value.abs() < self.epsilon {
            0.0
        } else if (value - 1.0).abs() < self.epsilon {
            1.0
        } else {
            value
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
            sum_tolerance: Self::DEFAULT_SUM_TOLERANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        assert!(Tolerances::default().validate().is_ok());
    }

    #[test]
    fn test_bounds_enforced() {
        assert!(Tolerances::new(0.0, 1e-9).is_err());
        assert!(Tolerances::new(1e-3, 1e-9).is_err());
        assert!(Tolerances::new(1e-12, 0.0).is_err());
        assert!(Tolerances::new(1e-12, 0.5).is_err());
        assert!(Tolerances::new(1e-10, 1e-8).is_ok());
    }

    #[test]
    fn test_snap_unit() {
        let tol = Tolerances::default();
        assert_eq!(tol.snap_unit(1e-16), 0.0);
        assert_eq!(tol.snap_unit(-1e-16), 0.0);
        assert_eq!(tol.snap_unit(1.0 - 1e-16), 1.0);
        assert_eq!(tol.snap_unit(0.3), 0.3);
    }
}
