//! Proportion-immune aggregation.
//!
//! Two aggregation modes over the same inputs:
//! - **Dependence**: run the dose engine, then take the dot product of the
//!   dose-count distribution (counts >= 1) with per-dose-count
//!   effectiveness. This respects the statistical dependence between
//!   successive dose-receipt events.
//! - **Independence**: treat every activity as an independent Bernoulli
//!   shot at immunity, `1 - Π (1 - e_j · v_j)`, bypassing the dose engine
//!   entirely.
//!
//! Effectiveness values are taken as supplied (the caller owns their
//! provenance); only lengths are checked. Dose count 0 always carries zero
//! effectiveness, so effectiveness vectors exclude it.

use vaxim_core::{Coverage, DoseCountDistribution, Result, VaximError};

use crate::distribution::{check_routine_len, DoseEngine};

/// Proportion immune from routine coverage alone.
///
/// `coverage` holds 2 or 3 routine dose coverages. In dependence mode
/// (`independent = false`) `effectiveness[d - 1]` is the probability that
/// exactly `d` doses confer immunity; in independence mode
/// `effectiveness[j]` belongs to activity `j`. Both modes need
/// `effectiveness.len() == coverage.len()`.
pub fn proportion_immune(
    coverage: &[f64],
    effectiveness: &[f64],
    independent: bool,
) -> Result<f64> {
    check_routine_len(coverage)?;
    if independent {
        independent_immunity(coverage, None, effectiveness)
    } else {
        let dist = routine_distribution(coverage)?;
        proportion_immune_from_distribution(&dist, effectiveness)
    }
}

/// Proportion immune from routine coverage plus one SIA campaign.
///
/// The SIA contributes the final effectiveness entry in both modes, so
/// `effectiveness.len() == coverage.len() + 1`.
pub fn proportion_immune_with_sia(
    coverage: &[f64],
    sia: f64,
    effectiveness: &[f64],
    independent: bool,
) -> Result<f64> {
    check_routine_len(coverage)?;
    if independent {
        independent_immunity(coverage, Some(sia), effectiveness)
    } else {
        let engine = DoseEngine::default();
        let dist = match coverage {
            [v1, v2] => engine.dose_distribution_with_sia(*v1, *v2, None, sia)?,
            [v1, v2, v3] => engine.dose_distribution_with_sia(*v1, *v2, Some(*v3), sia)?,
            _ => unreachable!("length checked above"),
        };
        proportion_immune_from_distribution(&dist, effectiveness)
    }
}

fn routine_distribution(coverage: &[f64]) -> Result<DoseCountDistribution> {
    let engine = DoseEngine::default();
    match coverage {
        [v1, v2] => engine.dose_distribution(*v1, *v2, None),
        [v1, v2, v3] => engine.dose_distribution(*v1, *v2, Some(*v3)),
        _ => unreachable!("length checked by caller"),
    }
}

/// Dependence-mode aggregation over an already-computed distribution:
/// `Σ_{d >= 1} effectiveness[d - 1] · P(d)`.
pub fn proportion_immune_from_distribution(
    distribution: &DoseCountDistribution,
    effectiveness: &[f64],
) -> Result<f64> {
    if effectiveness.len() != distribution.len() - 1 {
        return Err(VaximError::invalid_argument(format!(
            "effectiveness length {} does not match {} non-zero dose counts",
            effectiveness.len(),
            distribution.len() - 1
        )));
    }
    Ok(effectiveness
        .iter()
        .zip(distribution.probabilities()[1..].iter())
        .map(|(e, p)| e * p)
        .sum())
}

/// Independence-mode aggregation: `1 - Π (1 - e_j · v_j)` over routine
/// doses and, when present, the SIA.
fn independent_immunity(
    coverage: &[f64],
    sia: Option<f64>,
    effectiveness: &[f64],
) -> Result<f64> {
    let n_activities = coverage.len() + usize::from(sia.is_some());
    if effectiveness.len() != n_activities {
        return Err(VaximError::invalid_argument(format!(
            "effectiveness length {} does not match {n_activities} activities",
            effectiveness.len()
        )));
    }
    let mut escape = 1.0;
    for (&v, &e) in coverage.iter().chain(sia.as_ref()).zip(effectiveness) {
        let v = Coverage::new(v)?;
        escape *= 1.0 - e * v.value();
    }
    Ok(1.0 - escape)
}
