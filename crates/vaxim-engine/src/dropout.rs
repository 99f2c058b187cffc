//! Dropout and surplus rates between sequential vaccination activities.
//!
//! The dropout policy: someone who received an earlier activity fails to
//! receive a later one only when the later activity's coverage falls short of
//! the reference it is conditioned on. When the later coverage meets or
//! exceeds the reference, dropout is zero and the excess ("surplus") is
//! redistributed to those who missed the earlier activity.
//!
//! Both rates are recomputed fresh on every call; nothing here holds state.

use vaxim_core::{Coverage, DropoutRate, Result, Tolerances};

/// Dropout rate between a reference coverage and a later coverage.
///
/// `later >= reference` gives 0. Otherwise `(reference - later) / reference`.
/// A zero reference also gives 0: nobody can drop out of an activity nobody
/// reached (this also keeps the division well-defined).
pub fn dropout_rate(reference: Coverage, later: Coverage) -> Result<DropoutRate> {
    let rate = dropout_between(reference.value(), later.value(), Tolerances::default());
    DropoutRate::new(rate)
}

/// Raw dropout computation on already-validated values in [0,1].
pub(crate) fn dropout_between(reference: f64, later: f64, tolerances: Tolerances) -> f64 {
    if reference <= 0.0 || later >= reference {
        return 0.0;
    }
    tolerances.snap_unit((reference - later) / reference)
}

/// Surplus of a later activity over its reference, as a conditional receipt
/// probability for those who missed the reference activity.
///
/// Zero when the later coverage does not exceed the reference.
pub(crate) fn surplus_over(reference: f64, later: f64, tolerances: Tolerances) -> f64 {
    if later <= reference {
        return 0.0;
    }
    tolerances.snap_unit(later - reference)
}
