//! Minimal two-dimensional Nelder–Mead minimizer.
//!
//! Both Beta-fitting objectives here are smooth, two-parameter, and cheap to
//! evaluate, so a derivative-free simplex search is enough; no need for an
//! optimization crate. Standard coefficients: reflection 1, expansion 2,
//! contraction 0.5, shrink 0.5.

use vaxim_core::{Result, VaximError};

pub(crate) struct Minimum {
    pub point: [f64; 2],
    pub value: f64,
}

/// Minimizes `f` starting from `start`, with an initial simplex step of
/// `step` in each coordinate.
///
/// Converges when the simplex's function-value spread falls below `f_tol`.
/// Fails with a numerical error if `max_iter` iterations do not get there.
pub(crate) fn nelder_mead_2d<F>(
    f: F,
    start: [f64; 2],
    step: f64,
    max_iter: usize,
    f_tol: f64,
) -> Result<Minimum>
where
    F: Fn([f64; 2]) -> f64,
{
    let mut simplex = [
        start,
        [start[0] + step, start[1]],
        [start[0], start[1] + step],
    ];
    let mut values = [f(simplex[0]), f(simplex[1]), f(simplex[2])];

    for iteration in 0..max_iter {
        // Order: simplex[0] best, simplex[2] worst.
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = [simplex[order[0]], simplex[order[1]], simplex[order[2]]];
        values = [values[order[0]], values[order[1]], values[order[2]]];

        if (values[2] - values[0]).abs() < f_tol && values[0].is_finite() {
            log::trace!("nelder-mead converged after {iteration} iterations");
            return Ok(Minimum {
                point: simplex[0],
                value: values[0],
            });
        }

        let centroid = [
            (simplex[0][0] + simplex[1][0]) / 2.0,
            (simplex[0][1] + simplex[1][1]) / 2.0,
        ];
        let reflected = [
            centroid[0] + (centroid[0] - simplex[2][0]),
            centroid[1] + (centroid[1] - simplex[2][1]),
        ];
        let f_reflected = f(reflected);

        if f_reflected < values[0] {
            let expanded = [
                centroid[0] + 2.0 * (centroid[0] - simplex[2][0]),
                centroid[1] + 2.0 * (centroid[1] - simplex[2][1]),
            ];
            let f_expanded = f(expanded);
            if f_expanded < f_reflected {
                simplex[2] = expanded;
                values[2] = f_expanded;
            } else {
                simplex[2] = reflected;
                values[2] = f_reflected;
            }
        } else if f_reflected < values[1] {
            simplex[2] = reflected;
            values[2] = f_reflected;
        } else {
            let contracted = [
                centroid[0] + 0.5 * (simplex[2][0] - centroid[0]),
                centroid[1] + 0.5 * (simplex[2][1] - centroid[1]),
            ];
            let f_contracted = f(contracted);
            if f_contracted < values[2] {
                simplex[2] = contracted;
                values[2] = f_contracted;
            } else {
                // Shrink toward the best vertex.
                for i in 1..3 {
                    simplex[i] = [
                        simplex[0][0] + 0.5 * (simplex[i][0] - simplex[0][0]),
                        simplex[0][1] + 0.5 * (simplex[i][1] - simplex[0][1]),
                    ];
                    values[i] = f(simplex[i]);
                }
            }
        }
    }

    Err(VaximError::numerical(format!(
        "nelder-mead did not converge within {max_iter} iterations"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_minimizes_quadratic_bowl() {
        let f = |p: [f64; 2]| (p[0] - 1.5).powi(2) + 2.0 * (p[1] + 0.5).powi(2);
        let min = nelder_mead_2d(f, [0.0, 0.0], 0.5, 500, 1e-14).unwrap();
        assert_abs_diff_eq!(min.point[0], 1.5, epsilon = 1e-5);
        assert_abs_diff_eq!(min.point[1], -0.5, epsilon = 1e-5);
        assert!(min.value < 1e-9);
    }

    #[test]
    fn test_minimizes_rosenbrock() {
        let f = |p: [f64; 2]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let min = nelder_mead_2d(f, [-1.2, 1.0], 0.5, 5000, 1e-12).unwrap();
        assert_abs_diff_eq!(min.point[0], 1.0, epsilon = 5e-3);
        assert_abs_diff_eq!(min.point[1], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_reports_non_convergence() {
        // A drifting objective never settles.
        let f = |p: [f64; 2]| -p[0];
        assert!(nelder_mead_2d(f, [0.0, 0.0], 1.0, 50, 1e-14).is_err());
    }
}
