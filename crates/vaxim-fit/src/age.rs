//! Age-binned coverage summaries.
//!
//! Groups individual-level vaccination indicators into age bins, summarizes
//! each bin as a proportion with its standard error, and attaches a
//! method-of-moments Beta fit where one exists. Age handling lives entirely
//! here; the dose engines are age-agnostic.

use serde::{Deserialize, Serialize};
use vaxim_core::{BetaParams, Result, VaximError};

use crate::beta::fit_beta_moments;

/// Summary of one age bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroupSummary {
    /// Half-open bin label, e.g. `[1,5)`; the last bin closes at the top.
    pub label: String,
    /// Individuals falling in the bin.
    pub n: usize,
    /// Observed vaccinated proportion (0 when the bin is empty).
    pub mu: f64,
    /// Standard error of the proportion (0 when the bin is empty).
    pub sigma: f64,
    /// Beta fit to (mu, sigma); `None` for empty or degenerate bins
    /// (mu at exactly 0 or 1 admits no Beta).
    pub beta: Option<BetaParams>,
}

/// Bins individuals by age and summarizes coverage per bin.
///
/// `breaks` defines the bin edges: `breaks[i] <= age < breaks[i+1]`, with
/// the final bin including its upper edge. Ages outside the break range are
/// ignored. `ages` and `vaccinated` must be the same length; breaks must be
/// finite and strictly increasing with at least two edges.
pub fn smooth_by_age(
    ages: &[f64],
    vaccinated: &[bool],
    breaks: &[f64],
) -> Result<Vec<AgeGroupSummary>> {
    if ages.len() != vaccinated.len() {
        return Err(VaximError::invalid_argument(format!(
            "{} ages but {} vaccination indicators",
            ages.len(),
            vaccinated.len()
        )));
    }
    if breaks.len() < 2 {
        return Err(VaximError::configuration(
            "age binning needs at least two break points",
        ));
    }
    for pair in breaks.windows(2) {
        if !(pair[0].is_finite() && pair[1].is_finite() && pair[0] < pair[1]) {
            return Err(VaximError::configuration(format!(
                "breaks must be finite and strictly increasing, got {:?}",
                pair
            )));
        }
    }

    let n_bins = breaks.len() - 1;
    let mut counts = vec![0usize; n_bins];
    let mut positives = vec![0usize; n_bins];
    for (&age, &flag) in ages.iter().zip(vaccinated) {
        if let Some(bin) = bin_index(age, breaks) {
            counts[bin] += 1;
            positives[bin] += usize::from(flag);
        }
    }

    let mut summaries = Vec::with_capacity(n_bins);
    for bin in 0..n_bins {
        let label = if bin + 1 == n_bins {
            format!("[{},{}]", breaks[bin], breaks[bin + 1])
        } else {
            format!("[{},{})", breaks[bin], breaks[bin + 1])
        };
        let n = counts[bin];
        let (mu, sigma) = if n == 0 {
            (0.0, 0.0)
        } else {
            let mu = positives[bin] as f64 / n as f64;
            (mu, (mu * (1.0 - mu) / n as f64).sqrt())
        };
        let beta = if n == 0 {
            None
        } else {
            fit_beta_moments(mu, sigma).ok()
        };
        if beta.is_none() {
            log::debug!("age bin {label}: no Beta fit (n = {n}, mu = {mu})");
        }
        summaries.push(AgeGroupSummary {
            label,
            n,
            mu,
            sigma,
            beta,
        });
    }
    Ok(summaries)
}

fn bin_index(age: f64, breaks: &[f64]) -> Option<usize> {
    let last = breaks.len() - 1;
    if age == breaks[last] {
        return Some(last - 1);
    }
    breaks
        .windows(2)
        .position(|pair| pair[0] <= age && age < pair[1])
}
