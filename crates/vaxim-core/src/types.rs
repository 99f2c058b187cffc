//! Core value types for dose-coverage accounting.
//!
//! All types here are immutable once constructed and carry their invariants
//! in the constructor: a [`Coverage`] is always in [0,1], a
//! [`DoseCountDistribution`] always sums to 1 within tolerance. Nothing in
//! this module mutates after creation, so every type is safe to share across
//! threads (e.g. Monte Carlo loops drawing many coverage samples).

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaximError};
use crate::tolerances::Tolerances;

/// Proportion of a population successfully vaccinated in one activity
/// (routine dose k, or an SIA campaign).
///
/// Invariant: 0 <= value <= 1. Out-of-range inputs (including NaN) are
/// rejected at construction, never clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coverage(f64);

impl Coverage {
    /// Validates and wraps a raw proportion.
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(VaximError::invalid_argument(format!(
                "coverage must be in [0,1], got {value}"
            )));
        }
        Ok(Coverage(value))
    }

    /// The raw proportion.
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Conditional probability of NOT receiving a later dose given an earlier
/// reference coverage was achieved. Derived, never supplied by callers.
///
/// Invariant: 0 <= value <= 1, and the value is 0 whenever the later
/// coverage met or exceeded its reference.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DropoutRate(f64);

impl DropoutRate {
    pub fn new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(VaximError::invariant(
                "dropout_rate",
                format!("rate must be in [0,1], got {value}"),
            ));
        }
        Ok(DropoutRate(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Probability mass function over the number of doses (0..k) an individual
/// has received.
///
/// Entry `i` is the probability of having received exactly `i` doses; the
/// dose counts 0..k are implicit in the positional ordering and have no
/// gaps. Constructed by the dose engines, consumed by the immunity
/// aggregator, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseCountDistribution {
    probabilities: Vec<f64>,
}

impl DoseCountDistribution {
    /// Wraps an already-normalized probability vector, verifying the
    /// distribution invariants (every entry >= 0, total within
    /// `tolerances.sum_tolerance` of 1).
    pub fn from_probabilities(probabilities: Vec<f64>, tolerances: Tolerances) -> Result<Self> {
        if probabilities.is_empty() {
            return Err(VaximError::invariant(
                "dose_count_distribution",
                "empty probability vector",
            ));
        }
        for (dose, &p) in probabilities.iter().enumerate() {
            if !(p >= 0.0) {
                return Err(VaximError::invariant(
                    "dose_count_distribution",
                    format!("probability {p} for dose count {dose} is negative or NaN"),
                ));
            }
        }
        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > tolerances.sum_tolerance {
            return Err(VaximError::invariant(
                "dose_count_distribution",
                format!("probabilities sum to {total}, expected 1"),
            ));
        }
        Ok(DoseCountDistribution { probabilities })
    }

    /// Probability of having received exactly `dose_count` doses.
    ///
    /// Dose counts beyond the model's maximum carry zero mass.
    pub fn probability(&self, dose_count: usize) -> f64 {
        self.probabilities.get(dose_count).copied().unwrap_or(0.0)
    }

    /// The maximum dose count carried by this distribution (k).
    pub fn max_dose_count(&self) -> usize {
        self.probabilities.len() - 1
    }

    /// Number of entries (k + 1).
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Probability of having received at least one dose.
    pub fn at_least_one(&self) -> f64 {
        1.0 - self.probabilities[0]
    }

    /// Positional view of the probabilities, index = dose count.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Iterator over (dose_count, probability) pairs in dose-count order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.probabilities.iter().copied().enumerate()
    }
}

/// Shape parameters of a Beta distribution fitted to observed coverage.
///
/// Produced by the fitter, consumed by Monte Carlo propagation of coverage
/// uncertainty into the dose engines. Invariant: both shapes > 0 and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    pub shape1: f64,
    pub shape2: f64,
}

impl BetaParams {
    pub fn new(shape1: f64, shape2: f64) -> Result<Self> {
        if !(shape1 > 0.0 && shape1.is_finite() && shape2 > 0.0 && shape2.is_finite()) {
            return Err(VaximError::invalid_argument(format!(
                "beta shapes must be finite and positive, got ({shape1}, {shape2})"
            )));
        }
        Ok(BetaParams { shape1, shape2 })
    }

    /// Mean of the distribution: a / (a + b).
    pub fn mean(&self) -> f64 {
        self.shape1 / (self.shape1 + self.shape2)
    }

    /// Variance of the distribution: ab / ((a+b)^2 (a+b+1)).
    pub fn variance(&self) -> f64 {
        let s = self.shape1 + self.shape2;
        self.shape1 * self.shape2 / (s * s * (s + 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coverage_bounds() {
        assert!(Coverage::new(0.0).is_ok());
        assert!(Coverage::new(1.0).is_ok());
        assert!(Coverage::new(0.85).is_ok());
        assert!(Coverage::new(-0.01).is_err());
        assert!(Coverage::new(1.01).is_err());
        assert!(Coverage::new(f64::NAN).is_err());
    }

    #[test]
    fn test_distribution_invariants() {
        let tol = Tolerances::default();
        let dist = DoseCountDistribution::from_probabilities(vec![0.1, 0.1, 0.8], tol).unwrap();
        assert_eq!(dist.len(), 3);
        assert_eq!(dist.max_dose_count(), 2);
        assert_relative_eq!(dist.at_least_one(), 0.9);
        assert_eq!(dist.probability(2), 0.8);
        assert_eq!(dist.probability(7), 0.0);

        // Negative mass and drifted totals are defects, not valid outcomes.
        assert!(DoseCountDistribution::from_probabilities(vec![-0.1, 1.1], tol).is_err());
        assert!(DoseCountDistribution::from_probabilities(vec![0.5, 0.4], tol).is_err());
        assert!(DoseCountDistribution::from_probabilities(vec![], tol).is_err());
    }

    #[test]
    fn test_distribution_accepts_rounding_noise() {
        let tol = Tolerances::default();
        // One ulp of drift must pass; normalization upstream absorbs it.
        let dist =
            DoseCountDistribution::from_probabilities(vec![0.25, 0.25, 0.5 + 1e-16], tol).unwrap();
        assert_eq!(dist.len(), 3);
    }

    #[test]
    fn test_beta_params() {
        let params = BetaParams::new(2.0, 5.0).unwrap();
        assert_relative_eq!(params.mean(), 2.0 / 7.0);
        assert_relative_eq!(params.variance(), 10.0 / (49.0 * 8.0));
        assert!(BetaParams::new(0.0, 1.0).is_err());
        assert!(BetaParams::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let tol = Tolerances::default();
        let dist = DoseCountDistribution::from_probabilities(vec![0.2, 0.3, 0.5], tol).unwrap();
        let json = serde_json::to_string(&dist).unwrap();
        let back: DoseCountDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(dist, back);
    }
}
