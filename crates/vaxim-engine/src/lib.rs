//! # vaxim-engine
//!
//! Conditional-probability dose-accounting engines: given independently
//! measured vaccination coverage proportions, estimate the probability
//! distribution over the number of doses an individual has received, and
//! aggregate it into a single proportion-immune figure.
//!
//! The engines account for the statistical dependence between successive
//! dose-receipt events through a dropout model: coverage shortfall between
//! sequential activities is dropout among the previously covered, coverage
//! surplus is redistributed to the previously missed. An optional
//! supplemental immunization activity (SIA) extends the routine model by one
//! dose.
//!
//! All computations are pure and deterministic: no I/O, no shared mutable
//! state, safe to call concurrently from Monte Carlo loops.

pub mod distribution;
pub mod dropout;
pub mod immunity;
pub mod partition;

// Re-export the library surface
pub use distribution::{dose_distribution, dose_distribution_with_sia, DoseEngine};
pub use dropout::dropout_rate;
pub use immunity::{
    proportion_immune, proportion_immune_from_distribution, proportion_immune_with_sia,
};
pub use partition::OutcomePartition;
