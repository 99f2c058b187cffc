//! # vaxim-fit
//!
//! Beta-distribution fitting for observed vaccination coverage, and Monte
//! Carlo propagation of the fitted uncertainty through the dose engines.
//!
//! The dose engines in `vaxim-engine` take point coverages; real coverage
//! data arrives as survey estimates with uncertainty. This crate turns that
//! data into [`BetaParams`](vaxim_core::BetaParams) — from summary moments,
//! reported quantiles, or raw sample proportions, optionally binned by age —
//! and samples from the fitted distributions to produce immunity estimates
//! with uncertainty attached.

pub mod age;
pub mod beta;
pub mod montecarlo;

mod optim;

// Re-export the library surface
pub use age::{smooth_by_age, AgeGroupSummary};
pub use beta::{fit_beta_mle, fit_beta_moments, fit_beta_quantiles};
pub use montecarlo::{draw_coverage, immunity_samples, CoveragePriors};
