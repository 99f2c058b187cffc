//! Beta-distribution fits to observed coverage.
//!
//! Three entry points, matching how coverage data usually arrives:
//! - summary moments (a survey's point estimate and standard error) →
//!   analytic method of moments,
//! - reported quantiles (an interval estimate) → least-squares match of the
//!   Beta CDF at those points,
//! - raw sample proportions (cluster-level coverages) → maximum likelihood.
//!
//! The two iterative fits run a Nelder–Mead search in log-parameter space so
//! the shape constraints a, b > 0 hold by construction, seeded from the
//! method-of-moments estimate whenever one exists.

use statrs::distribution::{Beta, ContinuousCDF};
use statrs::function::gamma::ln_gamma;
use vaxim_core::{BetaParams, Result, VaximError};

use crate::optim::nelder_mead_2d;

const MAX_ITER: usize = 2000;
const F_TOL: f64 = 1e-13;

/// Analytic method-of-moments fit from a mean and standard deviation.
///
/// Requires `0 < mu < 1` and `sigma^2 < mu(1 - mu)`; outside that region no
/// Beta distribution has the requested moments.
pub fn fit_beta_moments(mu: f64, sigma: f64) -> Result<BetaParams> {
    if !(0.0 < mu && mu < 1.0) {
        return Err(VaximError::invalid_argument(format!(
            "mean must be strictly inside (0,1), got {mu}"
        )));
    }
    if !(sigma > 0.0 && sigma.is_finite()) {
        return Err(VaximError::invalid_argument(format!(
            "standard deviation must be finite and positive, got {sigma}"
        )));
    }
    let variance = sigma * sigma;
    let bound = mu * (1.0 - mu);
    if variance >= bound {
        return Err(VaximError::numerical(format!(
            "variance {variance} >= mu(1-mu) = {bound}; no Beta has these moments"
        )));
    }
    let nu = bound / variance - 1.0;
    BetaParams::new(mu * nu, (1.0 - mu) * nu)
}

/// Least-squares fit to reported quantiles.
///
/// `quantiles[i]` is the coverage value at cumulative probability
/// `probs[i]`. At least two points are required; the fit minimizes the sum
/// of squared CDF residuals at the given points.
pub fn fit_beta_quantiles(quantiles: &[f64], probs: &[f64]) -> Result<BetaParams> {
    if quantiles.len() != probs.len() {
        return Err(VaximError::invalid_argument(format!(
            "{} quantiles but {} probabilities",
            quantiles.len(),
            probs.len()
        )));
    }
    if quantiles.len() < 2 {
        return Err(VaximError::configuration(
            "quantile fit needs at least two points",
        ));
    }
    for (&q, &p) in quantiles.iter().zip(probs) {
        if !(0.0..=1.0).contains(&q) || !(0.0..=1.0).contains(&p) {
            return Err(VaximError::invalid_argument(format!(
                "quantile point ({q}, {p}) outside the unit square"
            )));
        }
    }

    let objective = |log_shapes: [f64; 2]| {
        let (a, b) = (log_shapes[0].exp(), log_shapes[1].exp());
        match Beta::new(a, b) {
            Ok(dist) => quantiles
                .iter()
                .zip(probs)
                .map(|(&q, &p)| {
                    let r = dist.cdf(q) - p;
                    r * r
                })
                .sum(),
            Err(_) => f64::INFINITY,
        }
    };

    let start = quantile_start(quantiles, probs);
    let min = nelder_mead_2d(objective, start, 0.5, MAX_ITER, F_TOL)?;
    if !min.value.is_finite() {
        return Err(VaximError::numerical(
            "quantile objective never became finite",
        ));
    }
    log::debug!(
        "quantile fit residual {} at log-shapes {:?}",
        min.value,
        min.point
    );
    BetaParams::new(min.point[0].exp(), min.point[1].exp())
}

/// Maximum-likelihood fit to observed sample proportions.
///
/// Proportions must lie strictly inside (0,1); at exactly 0 or 1 the Beta
/// log-likelihood is undefined and the sample is rejected rather than
/// nudged.
pub fn fit_beta_mle(samples: &[f64]) -> Result<BetaParams> {
    if samples.len() < 2 {
        return Err(VaximError::configuration(
            "maximum-likelihood fit needs at least two samples",
        ));
    }
    for &x in samples {
        if !(0.0 < x && x < 1.0) {
            return Err(VaximError::invalid_argument(format!(
                "sample proportion {x} must be strictly inside (0,1)"
            )));
        }
    }

    let n = samples.len() as f64;
    let sum_ln: f64 = samples.iter().map(|&x| x.ln()).sum();
    let sum_ln1: f64 = samples.iter().map(|&x| (1.0 - x).ln()).sum();

    let nll = |log_shapes: [f64; 2]| {
        let (a, b) = (log_shapes[0].exp(), log_shapes[1].exp());
        if !(a.is_finite() && b.is_finite()) {
            return f64::INFINITY;
        }
        n * (ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b))
            - (a - 1.0) * sum_ln
            - (b - 1.0) * sum_ln1
    };

    let start = sample_moments_start(samples)?;
    let min = nelder_mead_2d(nll, start, 0.25, MAX_ITER, F_TOL)?;
    BetaParams::new(min.point[0].exp(), min.point[1].exp())
}

/// Start point for the quantile fit: a crude location/spread read off the
/// supplied points, mapped through the moments formulas when they admit a
/// Beta, else the flat prior (1,1).
fn quantile_start(quantiles: &[f64], probs: &[f64]) -> [f64; 2] {
    let mu = interpolate_median(quantiles, probs);
    let (lo, hi) = quantiles
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &q| (lo.min(q), hi.max(q)));
    let sigma = ((hi - lo) / 2.0).max(1e-3);
    match fit_beta_moments(mu, sigma) {
        Ok(params) => [params.shape1.ln(), params.shape2.ln()],
        Err(_) => [0.0, 0.0],
    }
}

fn interpolate_median(quantiles: &[f64], probs: &[f64]) -> f64 {
    for (p, q) in probs.windows(2).zip(quantiles.windows(2)) {
        if p[0] <= 0.5 && 0.5 <= p[1] && p[1] > p[0] {
            return q[0] + (q[1] - q[0]) * (0.5 - p[0]) / (p[1] - p[0]);
        }
    }
    let mean = quantiles.iter().sum::<f64>() / quantiles.len() as f64;
    mean.clamp(1e-3, 1.0 - 1e-3)
}

/// Moments start for the MLE, with a degenerate-variance guard: an
/// all-identical sample has an unbounded likelihood and no finite optimum.
fn sample_moments_start(samples: &[f64]) -> Result<[f64; 2]> {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    if variance < 1e-12 {
        return Err(VaximError::numerical(
            "sample variance is degenerate; likelihood has no finite maximum",
        ));
    }
    let params = fit_beta_moments(mean, variance.sqrt())?;
    Ok([params.shape1.ln(), params.shape2.ln()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_moments_round_trip() {
        let truth = BetaParams::new(2.0, 5.0).unwrap();
        let fitted = fit_beta_moments(truth.mean(), truth.variance().sqrt()).unwrap();
        assert_relative_eq!(fitted.shape1, 2.0, max_relative = 1e-9);
        assert_relative_eq!(fitted.shape2, 5.0, max_relative = 1e-9);
    }

    #[test]
    fn test_moments_rejects_impossible_inputs() {
        assert!(fit_beta_moments(0.0, 0.1).is_err());
        assert!(fit_beta_moments(1.0, 0.1).is_err());
        assert!(fit_beta_moments(0.5, 0.0).is_err());
        // variance 0.25 == mu(1-mu): Bernoulli limit, not a Beta.
        assert!(fit_beta_moments(0.5, 0.5).is_err());
    }

    #[test]
    fn test_quantile_fit_recovers_cdf() {
        let truth = Beta::new(2.0, 3.0).unwrap();
        let probs = [0.1, 0.25, 0.5, 0.75, 0.9];
        let quantiles: Vec<f64> = probs.iter().map(|&p| truth.inverse_cdf(p)).collect();

        let fitted = fit_beta_quantiles(&quantiles, &probs).unwrap();
        let fitted_dist = Beta::new(fitted.shape1, fitted.shape2).unwrap();
        for (&q, &p) in quantiles.iter().zip(&probs) {
            assert_abs_diff_eq!(fitted_dist.cdf(q), p, epsilon = 5e-3);
        }
    }

    #[test]
    fn test_quantile_fit_input_validation() {
        assert!(fit_beta_quantiles(&[0.3, 0.6], &[0.25]).is_err());
        assert!(fit_beta_quantiles(&[0.3], &[0.5]).is_err());
        assert!(fit_beta_quantiles(&[0.3, 1.4], &[0.25, 0.75]).is_err());
    }

    #[test]
    fn test_mle_recovers_shapes_from_plug_in_sample() {
        // A quantile-spaced "perfect sample" from Beta(3, 2).
        let truth = Beta::new(3.0, 2.0).unwrap();
        let n = 200;
        let samples: Vec<f64> = (0..n)
            .map(|i| truth.inverse_cdf((i as f64 + 0.5) / n as f64))
            .collect();

        let fitted = fit_beta_mle(&samples).unwrap();
        assert_relative_eq!(fitted.shape1, 3.0, max_relative = 0.1);
        assert_relative_eq!(fitted.shape2, 2.0, max_relative = 0.1);
    }

    #[test]
    fn test_mle_input_validation() {
        assert!(fit_beta_mle(&[]).is_err());
        assert!(fit_beta_mle(&[0.4]).is_err());
        assert!(fit_beta_mle(&[0.4, 0.0]).is_err());
        assert!(fit_beta_mle(&[0.4, 1.0]).is_err());
        // Identical samples: no finite optimum.
        assert!(fit_beta_mle(&[0.6, 0.6, 0.6]).is_err());
    }
}
