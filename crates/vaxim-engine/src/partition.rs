//! Joint-outcome partition over binary dose-receipt events.
//!
//! Every model size in this library is the same shape: n binary events
//! (receive/miss each routine dose, and optionally the SIA) partition the
//! population into 2^n joint outcomes. Terms are keyed by a bitmask of the
//! positive events, built once per call, clamped against rounding artifacts,
//! normalized by the raw total Ω, and aggregated into dose-count buckets by
//! popcount. The two-dose, three-dose, and SIA-extended paths all run
//! through this one engine, so the sizes cannot drift apart.

use vaxim_core::{DoseCountDistribution, Result, Tolerances, VaximError};

/// Unnormalized partition of the outcome space into 2^n joint terms.
///
/// Term `m` is the expected probability of the outcome whose set bits in `m`
/// are exactly the events received. In exact arithmetic the terms sum to 1;
/// the piecewise formulas feeding this type can leave a few ulps of drift,
/// which [`normalized`](Self::normalized) absorbs.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomePartition {
    terms: Vec<f64>,
    n_events: u32,
}

impl OutcomePartition {
    /// Builds a partition from the full 2^n term table, mask-indexed.
    pub fn from_terms(terms: Vec<f64>) -> Result<Self> {
        let n_events = match terms.len() {
            4 => 2,
            8 => 3,
            16 => 4,
            other => {
                return Err(VaximError::invariant(
                    "outcome_partition",
                    format!("term table of length {other} is not a supported 2^n"),
                ))
            }
        };
        Ok(OutcomePartition { terms, n_events })
    }

    /// Number of binary events (n).
    pub fn n_events(&self) -> u32 {
        self.n_events
    }

    /// The joint term for one receive/miss pattern.
    pub fn term(&self, mask: usize) -> f64 {
        self.terms[mask]
    }

    /// Raw total Ω of all joint terms.
    pub fn omega(&self) -> f64 {
        self.terms.iter().sum()
    }

    /// Extends the partition by one binary event, splitting every term into
    /// a received branch (`p * receive_prob(mask)`) and a missed branch.
    ///
    /// The new event occupies the next-higher bit, so mask ordering of the
    /// existing events is preserved. The total is unchanged: each split
    /// multiplies by `r + (1 - r) = 1`.
    pub fn extend_event<F>(self, receive_prob: F) -> Result<Self>
    where
        F: Fn(usize) -> f64,
    {
        let new_bit = 1usize << self.n_events;
        let mut extended = vec![0.0; self.terms.len() * 2];
        for (mask, &p) in self.terms.iter().enumerate() {
            let r = receive_prob(mask);
            if !(0.0..=1.0).contains(&r) {
                return Err(VaximError::invariant(
                    "extend_event",
                    format!("receipt probability {r} for pattern {mask:#b} outside [0,1]"),
                ));
            }
            extended[mask | new_bit] += p * r;
            extended[mask] += p * (1.0 - r);
        }
        OutcomePartition::from_terms(extended)
    }

    /// Clamps sub-epsilon negative artifacts to 0, then divides every term
    /// by Ω so the partition sums to exactly 1.
    ///
    /// A term below `-epsilon` is a genuine negative — a defect in the case
    /// tables, not rounding — and fails hard.
    pub fn normalized(mut self, tolerances: Tolerances) -> Result<Self> {
        for (mask, term) in self.terms.iter_mut().enumerate() {
            if *term < 0.0 {
                if *term < -tolerances.epsilon {
                    return Err(VaximError::invariant(
                        "normalize",
                        format!("joint term {term} for pattern {mask:#b} below zero"),
                    ));
                }
                log::warn!(
                    "clamping joint term {} for pattern {:#b} to 0",
                    *term,
                    mask
                );
                *term = 0.0;
            }
        }
        let omega = self.omega();
        if !(omega > 0.0) {
            return Err(VaximError::invariant(
                "normalize",
                format!("sample space total omega = {omega}"),
            ));
        }
        for term in &mut self.terms {
            *term /= omega;
        }
        Ok(self)
    }

    /// Aggregates the joint terms into a dose-count distribution of length
    /// n + 1 by counting positive events per pattern.
    ///
    /// The grouping is fixed by each term's bitmask, so no outcome can be
    /// counted in two buckets.
    pub fn aggregate(&self, tolerances: Tolerances) -> Result<DoseCountDistribution> {
        let mut buckets = vec![0.0; self.n_events as usize + 1];
        for (mask, &p) in self.terms.iter().enumerate() {
            buckets[mask.count_ones() as usize] += p;
        }
        DoseCountDistribution::from_probabilities(buckets, tolerances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_non_power_of_two() {
        assert!(OutcomePartition::from_terms(vec![0.5, 0.5]).is_err());
        assert!(OutcomePartition::from_terms(vec![0.2; 5]).is_err());
    }

    #[test]
    fn test_aggregate_by_popcount() {
        let tol = Tolerances::default();
        // masks: 00 -> 0 doses, 01/10 -> 1 dose, 11 -> 2 doses
        let partition = OutcomePartition::from_terms(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let dist = partition.aggregate(tol).unwrap();
        assert_relative_eq!(dist.probability(0), 0.1);
        assert_relative_eq!(dist.probability(1), 0.5);
        assert_relative_eq!(dist.probability(2), 0.4);
    }

    #[test]
    fn test_extend_preserves_total() {
        let partition = OutcomePartition::from_terms(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let extended = partition.extend_event(|mask| if mask == 0b11 { 0.9 } else { 0.25 }).unwrap();
        assert_eq!(extended.n_events(), 3);
        assert_relative_eq!(extended.omega(), 1.0, max_relative = 1e-12);
        // The received branch of the full pattern lands on mask 0b111.
        assert_relative_eq!(extended.term(0b111), 0.4 * 0.9);
        assert_relative_eq!(extended.term(0b011), 0.4 * 0.1, max_relative = 1e-12);
        assert_relative_eq!(extended.term(0b101), 0.2 * 0.25);
    }

    #[test]
    fn test_extend_rejects_bad_receipt_probability() {
        let partition = OutcomePartition::from_terms(vec![0.25; 4]).unwrap();
        assert!(partition.clone().extend_event(|_| 1.5).is_err());
        assert!(partition.extend_event(|_| -0.1).is_err());
    }

    #[test]
    fn test_normalize_clamps_artifacts() {
        let tol = Tolerances::default();
        let partition = OutcomePartition::from_terms(vec![-1e-16, 0.3, 0.3, 0.4]).unwrap();
        let normalized = partition.normalized(tol).unwrap();
        assert_eq!(normalized.term(0), 0.0);
        assert_relative_eq!(normalized.omega(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_normalize_rejects_genuine_negative() {
        let tol = Tolerances::default();
        let partition = OutcomePartition::from_terms(vec![-0.05, 0.35, 0.3, 0.4]).unwrap();
        let err = partition.normalized(tol).unwrap_err();
        assert!(err.is_defect());
    }

    #[test]
    fn test_normalize_absorbs_drift() {
        let tol = Tolerances::default();
        let partition = OutcomePartition::from_terms(vec![0.1, 0.2, 0.3, 0.4 + 1e-13]).unwrap();
        let dist = partition.normalized(tol).unwrap().aggregate(tol).unwrap();
        let total: f64 = dist.probabilities().iter().sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-12);
    }
}
