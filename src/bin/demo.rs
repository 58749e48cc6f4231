//! Draws from a truncated standard normal by inverse-transform sampling and
//! estimates a Gaussian integral by importance sampling, then prints summaries.
//!
//! Set `RUST_LOG=debug` for per-call diagnostics.

use mini_montecarlo::core::Sampler;
use mini_montecarlo::grid::trapezoid;
use mini_montecarlo::importance::{ImportanceSampler, ProposalDraws};
use mini_montecarlo::inversion::InverseTransformSampler;
use mini_montecarlo::stats;

use log::info;
use ndarray::Array1;
use std::error::Error;
use std::f64::consts::PI;

#[cfg(feature = "csv")]
use mini_montecarlo::io::csv::save_samples_csv;

/// Runs both samplers and prints summary statistics.
fn main() -> Result<(), Box<dyn Error>> {
    const GRID_POINTS: usize = 10_000;
    const SAMPLE_SIZE: usize = 5_000;
    const WEIGHTED_SAMPLE_SIZE: usize = 100_000;
    const BINS: usize = 100;
    const SEED: u64 = 42;

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    // Inverse-transform sampling of N(0, 1) restricted to [-3, 3].
    let x: Vec<f64> = Array1::linspace(-3.0, 3.0, GRID_POINTS).to_vec();
    let y: Vec<f64> = x
        .iter()
        .map(|x| (-0.5 * x * x).exp() / (2.0 * PI).sqrt())
        .collect();
    let mut inversion = InverseTransformSampler::new(&x, &y)?.set_seed(SEED);
    let samples = inversion.sample(SAMPLE_SIZE)?;
    info!("drew {} inverse-transform samples", samples.len());

    if let Some((mean, var)) = stats::mean_and_variance(&samples) {
        println!("Inversion: mean {mean:.4}, variance {var:.4}");
    }
    let hist = stats::histogram(&samples, None, BINS, Some((-3.0, 3.0)), true)?;
    let max_gap = hist
        .centers()
        .iter()
        .zip(hist.values.iter())
        .map(|(c, h)| (h - (-0.5 * c * c).exp() / (2.0 * PI).sqrt()).abs())
        .fold(0.0, f64::max);
    println!("Inversion: largest histogram gap to the normal density {max_gap:.4}");

    // Importance sampling of exp(-x²/2) against the ramp 1 - x.
    let x: Vec<f64> = Array1::linspace(-3.0, 0.9999, GRID_POINTS).to_vec();
    let f: Vec<f64> = x.iter().map(|x| (-0.5 * x * x).exp()).collect();
    let w: Vec<f64> = x.iter().map(|x| 1.0 - x).collect();
    let target_integral = trapezoid(&f, &x);

    for mode in [ProposalDraws::Uniform, ProposalDraws::Proposal] {
        let mut sampler = ImportanceSampler::new(&x, &f, &w)?
            .with_draws(mode)?
            .set_seed(SEED);
        let weighted = sampler.sample(WEIGHTED_SAMPLE_SIZE)?;
        println!(
            "Importance ({mode:?} draws): mean weight {:.4} (∫f = {target_integral:.4}), ESS {:.0}",
            weighted.mean_weight(),
            stats::effective_sample_size(&weighted.weights)
        );

        #[cfg(feature = "csv")]
        {
            let path = format!("importance_{mode:?}.csv").to_lowercase();
            save_samples_csv(&weighted.samples, Some(&weighted.weights), &path)?;
            println!("Saved weighted samples in file {path}.");
        }
    }

    #[cfg(feature = "csv")]
    {
        save_samples_csv(&samples, None, "inversion.csv")?;
        println!("Saved samples in file inversion.csv.");
    }

    Ok(())
}

#[test]
fn test_main() {
    main().expect("Expected main to not return an error.");
}
