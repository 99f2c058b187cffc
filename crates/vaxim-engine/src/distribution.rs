//! Dose-count distributions from routine coverage, with optional SIA.
//!
//! # Theory
//!
//! Independently measured coverage proportions v1, v2 (and optionally v3)
//! say nothing directly about how dose-receipt events overlap in the
//! population. The engine imposes the dropout model: everyone who received
//! dose k is eligible for dose k+1, a dropout fraction of them misses it,
//! and any later coverage in excess of its reference ("surplus") is
//! redistributed to those who missed the earlier dose. That fixes the full
//! joint distribution over receive/miss patterns, which aggregates by count
//! of received doses into the per-dose-count probabilities.
//!
//! Two case splits drive the piecewise formulas, evaluated once per call:
//! whether v2 exceeds v1, and whether v3 exceeds the probability of having
//! received both earlier doses. All dropout and surplus rates are recomputed
//! fresh per call; there is no shared state to leak between branches.
//!
//! # References
//!
//! - WHO (2018) "Working together: an integration resource guide for
//!   immunization services" — routine dropout-rate monitoring
//! - Cutts et al. (2013) "Measuring coverage in MNCH: design, implementation,
//!   and interpretation challenges" PLoS Med 10:e1001404

use vaxim_core::{Coverage, DoseCountDistribution, Result, Tolerances, VaximError};

use crate::dropout::{dropout_between, surplus_over};
use crate::partition::OutcomePartition;

// Bit assignments for the joint-outcome masks.
const DOSE1: usize = 1 << 0;
const DOSE2: usize = 1 << 1;

/// Relative orderings of the coverage inputs, evaluated once per call and
/// threaded through term construction so all 2^n terms branch consistently.
#[derive(Debug, Clone, Copy)]
struct CaseSplit {
    /// v2 > v1: dose-2 surplus spills over to those who missed dose 1.
    second_exceeds_first: bool,
    /// v3 > Pr(dose1 ∧ dose2): dose-3 surplus reaches those outside the
    /// fully-covered pair group.
    third_exceeds_prior_pair: bool,
}

/// Dose-accounting engine with configurable numeric tolerances.
///
/// Stateless apart from the tolerances; every computation is deterministic
/// and safe to run concurrently from many call sites.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoseEngine {
    tolerances: Tolerances,
}

impl DoseEngine {
    pub fn new(tolerances: Tolerances) -> Result<Self> {
        tolerances.validate()?;
        Ok(DoseEngine { tolerances })
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Probability distribution over the number of routine doses received.
    ///
    /// Two coverages give a length-3 distribution (0, 1, or 2 doses); a
    /// third coverage extends it to length 4. Inputs outside [0,1] are
    /// rejected before any computation.
    pub fn dose_distribution(
        &self,
        v1: f64,
        v2: f64,
        v3: Option<f64>,
    ) -> Result<DoseCountDistribution> {
        let partition = self.routine_partition(v1, v2, v3)?;
        partition.aggregate(self.tolerances)
    }

    /// As [`dose_distribution`](Self::dose_distribution), extended by one
    /// supplemental immunization activity with coverage `sia`.
    ///
    /// The SIA receipt probability is conditioned on having received at
    /// least one routine dose: `1 - dropout(p_prior, sia)` applied uniformly
    /// across the routine partition. When no one received a routine dose the
    /// campaign reaches the raw `sia` fraction directly. The result is one
    /// dose-count longer than the routine-only distribution.
    pub fn dose_distribution_with_sia(
        &self,
        v1: f64,
        v2: f64,
        v3: Option<f64>,
        sia: f64,
    ) -> Result<DoseCountDistribution> {
        let sia = Coverage::new(sia)?;
        let partition = self.routine_partition(v1, v2, v3)?;

        let p_prior = self.tolerances.snap_unit(1.0 - partition.term(0));
        let receipt = if p_prior <= 0.0 {
            sia.value()
        } else {
            1.0 - dropout_between(p_prior, sia.value(), self.tolerances)
        };
        log::debug!(
            "SIA extension: p_prior = {p_prior}, coverage = {}, receipt = {receipt}",
            sia.value()
        );

        partition
            .extend_event(|_| receipt)?
            .normalized(self.tolerances)?
            .aggregate(self.tolerances)
    }

    /// Normalized joint partition over the routine receive/miss patterns.
    fn routine_partition(&self, v1: f64, v2: f64, v3: Option<f64>) -> Result<OutcomePartition> {
        let v1 = Coverage::new(v1)?;
        let v2 = Coverage::new(v2)?;
        let v3 = v3.map(Coverage::new).transpose()?;

        // Pr(dose1 ∧ dose2) collapses to min(v1, v2) under the dropout
        // policy, so both predicates are known before any term is built.
        let case = CaseSplit {
            second_exceeds_first: v2 > v1,
            third_exceeds_prior_pair: v3.is_some_and(|v3| v3.value() > v1.value().min(v2.value())),
        };

        let partition = self.two_dose_terms(v1, v2, case)?;
        let partition = match v3 {
            None => partition,
            Some(v3) => self.extend_third_dose(partition, v3, case)?,
        };
        partition.normalized(self.tolerances)
    }

    /// The four joint terms over {receive/miss dose1} × {receive/miss dose2}.
    fn two_dose_terms(
        &self,
        v1: Coverage,
        v2: Coverage,
        case: CaseSplit,
    ) -> Result<OutcomePartition> {
        let (v1, v2) = (v1.value(), v2.value());
        let d12 = dropout_between(v1, v2, self.tolerances);

        let both = v1 * (1.0 - d12);
        let first_only = v1 * d12;
        let (second_only, neither) = if case.second_exceeds_first {
            // Dose-2 surplus reaches a (v2 - v1) fraction of dose-1 missers.
            let s12 = surplus_over(v1, v2, self.tolerances);
            ((1.0 - v1) * s12, (1.0 - v1) * (1.0 - s12))
        } else {
            (0.0, 1.0 - v1)
        };

        let mut terms = vec![0.0; 4];
        terms[0] = neither;
        terms[DOSE1] = first_only;
        terms[DOSE2] = second_only;
        terms[DOSE1 | DOSE2] = both;
        OutcomePartition::from_terms(terms)
    }

    /// Extends the two-dose partition by the third routine dose.
    ///
    /// The dropout reference for dose 3 is `p12 = Pr(dose1 ∧ dose2)`; its
    /// surplus, when v3 exceeds p12, is the conditional receipt probability
    /// for every pattern outside the fully-covered pair group (both the
    /// missed-dose-2 and missed-dose-1 branches).
    fn extend_third_dose(
        &self,
        partition: OutcomePartition,
        v3: Coverage,
        case: CaseSplit,
    ) -> Result<OutcomePartition> {
        let v3 = v3.value();
        let p12 = partition.term(DOSE1 | DOSE2);

        let d23 = dropout_between(p12, v3, self.tolerances);
        let s23 = if case.third_exceeds_prior_pair {
            surplus_over(p12, v3, self.tolerances)
        } else {
            0.0
        };

        partition.extend_event(|mask| {
            if mask == (DOSE1 | DOSE2) {
                1.0 - d23
            } else {
                s23
            }
        })
    }
}

/// Convenience wrapper over [`DoseEngine::dose_distribution`] with default
/// tolerances.
pub fn dose_distribution(v1: f64, v2: f64, v3: Option<f64>) -> Result<DoseCountDistribution> {
    DoseEngine::default().dose_distribution(v1, v2, v3)
}

/// Convenience wrapper over [`DoseEngine::dose_distribution_with_sia`] with
/// default tolerances.
pub fn dose_distribution_with_sia(
    v1: f64,
    v2: f64,
    v3: Option<f64>,
    sia: f64,
) -> Result<DoseCountDistribution> {
    DoseEngine::default().dose_distribution_with_sia(v1, v2, v3, sia)
}

/// Rejects a coverage list whose length is not a supported model shape.
pub(crate) fn check_routine_len(coverage: &[f64]) -> Result<()> {
    match coverage.len() {
        2 | 3 => Ok(()),
        n => Err(VaximError::configuration(format!(
            "expected 2 or 3 routine dose coverages, got {n}"
        ))),
    }
}
