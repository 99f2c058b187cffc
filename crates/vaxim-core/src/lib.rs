//! # vaxim-core
//!
//! Core types, errors, and numeric tolerances for the vaxim dose-coverage
//! library.
//!
//! This crate defines the fundamental abstractions used across all vaxim
//! components:
//! - **Types**: validated coverage proportions, dose-count distributions,
//!   Beta shape parameters
//! - **Errors**: unified error handling with [`VaximError`]
//! - **Tolerances**: the epsilon/sum-drift policy the engines use to absorb
//!   floating-point noise without masking defects
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  vaxim-core  │  ← types / errors / tolerances
//! └──────────────┘
//!         ▲
//!    ┌────┴─────────────┐
//!    │                  │
//! ┌──▼───────────┐  ┌───▼────────┐
//! │ vaxim-engine │  │ vaxim-fit  │
//! └──────────────┘  └────────────┘
//! ```

pub mod errors;
pub mod tolerances;
pub mod types;

// Re-export commonly used items
pub use errors::{Result, VaximError};
pub use tolerances::Tolerances;
pub use types::{BetaParams, Coverage, DoseCountDistribution, DropoutRate};
