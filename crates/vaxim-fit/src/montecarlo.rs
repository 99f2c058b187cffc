//! Monte Carlo propagation of coverage uncertainty.
//!
//! Each iteration draws one coverage value per activity from its fitted Beta
//! prior and pushes the draw through the immunity aggregation. The engine
//! calls are stateless, so callers wanting parallelism can shard iterations
//! across threads with independent seeds.

use rand::Rng;
use rand_distr::Distribution;
use vaxim_core::{BetaParams, Result, VaximError};
use vaxim_engine::{proportion_immune, proportion_immune_with_sia};

/// One Beta prior per vaccination activity.
#[derive(Debug, Clone, PartialEq)]
pub struct CoveragePriors {
    /// Routine doses, in dose order (2 or 3 entries).
    pub routine: Vec<BetaParams>,
    /// Optional SIA campaign.
    pub sia: Option<BetaParams>,
}

impl CoveragePriors {
    pub fn validate(&self) -> Result<()> {
        match self.routine.len() {
            2 | 3 => Ok(()),
            n => Err(VaximError::configuration(format!(
                "expected priors for 2 or 3 routine doses, got {n}"
            ))),
        }
    }

    /// Number of activities, counting the SIA when present.
    pub fn n_activities(&self) -> usize {
        self.routine.len() + usize::from(self.sia.is_some())
    }
}

/// Draws one coverage proportion from a fitted Beta prior.
pub fn draw_coverage<R: Rng + ?Sized>(params: &BetaParams, rng: &mut R) -> Result<f64> {
    let dist = rand_distr::Beta::new(params.shape1, params.shape2)
        .map_err(|e| VaximError::numerical(format!("invalid Beta shapes for sampling: {e}")))?;
    Ok(dist.sample(rng))
}

/// Proportion-immune samples under coverage uncertainty.
///
/// Runs `n_samples` independent draws of every activity's coverage and
/// returns the resulting proportion-immune values. `effectiveness` follows
/// the same length rules as the underlying aggregation
/// (`priors.n_activities()` entries).
pub fn immunity_samples<R: Rng + ?Sized>(
    priors: &CoveragePriors,
    effectiveness: &[f64],
    independent: bool,
    n_samples: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    priors.validate()?;
    let mut samples = Vec::with_capacity(n_samples);
    let mut coverage = vec![0.0; priors.routine.len()];
    for _ in 0..n_samples {
        for (slot, prior) in coverage.iter_mut().zip(&priors.routine) {
            *slot = draw_coverage(prior, rng)?;
        }
        let immune = match &priors.sia {
            None => proportion_immune(&coverage, effectiveness, independent)?,
            Some(sia_prior) => {
                let sia = draw_coverage(sia_prior, rng)?;
                proportion_immune_with_sia(&coverage, sia, effectiveness, independent)?
            }
        };
        samples.push(immune);
    }
    log::debug!(
        "drew {n_samples} immunity samples over {} activities",
        priors.n_activities()
    );
    Ok(samples)
}
