//! End-to-end uncertainty propagation: survey data -> Beta fits -> Monte
//! Carlo immunity samples.

use rand::rngs::StdRng;
use rand::SeedableRng;
use vaxim_fit::{fit_beta_moments, immunity_samples, smooth_by_age, CoveragePriors};

#[test]
fn test_survey_to_immunity_pipeline() {
    env_logger::try_init().ok();

    // Cluster-survey style point estimates with standard errors.
    let dose1 = fit_beta_moments(0.9, 0.03).expect("dose-1 fit failed");
    let dose2 = fit_beta_moments(0.8, 0.04).expect("dose-2 fit failed");
    let sia = fit_beta_moments(0.5, 0.05).expect("SIA fit failed");

    let priors = CoveragePriors {
        routine: vec![dose1, dose2],
        sia: Some(sia),
    };

    let mut rng = StdRng::seed_from_u64(2024);
    let samples = immunity_samples(&priors, &[0.84, 0.941, 0.95], false, 1000, &mut rng)
        .expect("propagation failed");

    assert_eq!(samples.len(), 1000);
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    println!("immunity mean = {mean:.4}, sd = {:.4}", var.sqrt());

    // Coverage uncertainty must show up as immunity spread, and the mean
    // must stay inside the plausible band for these priors.
    assert!(var > 0.0);
    assert!((0.8..0.95).contains(&mean), "mean {mean} outside band");
}

#[test]
fn test_age_binned_fits_feed_priors() {
    env_logger::try_init().ok();

    // Younger children better covered than older ones.
    let mut ages = Vec::new();
    let mut flags = Vec::new();
    for i in 0..400 {
        let age = (i % 10) as f64;
        ages.push(age);
        flags.push(if age < 5.0 { i % 10 != 0 } else { i % 3 != 0 });
    }

    let summaries = smooth_by_age(&ages, &flags, &[0.0, 5.0, 10.0]).unwrap();
    assert_eq!(summaries.len(), 2);
    assert!(summaries[0].mu > summaries[1].mu);

    // Any bin with a Beta fit can seed a Monte Carlo run directly.
    let young = summaries[0].beta.expect("young bin should admit a fit");
    let old = summaries[1].beta.expect("old bin should admit a fit");
    let priors = CoveragePriors {
        routine: vec![young, old],
        sia: None,
    };
    let mut rng = StdRng::seed_from_u64(77);
    let samples = immunity_samples(&priors, &[0.84, 0.941], false, 200, &mut rng).unwrap();
    assert_eq!(samples.len(), 200);
}
