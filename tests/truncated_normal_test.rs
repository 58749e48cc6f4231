//! Checks that inverse-transform sampling of a tabulated standard normal on
//! [-3, 3] reproduces the truncated normal distribution.

use mini_montecarlo::core::Sampler;
use mini_montecarlo::inversion::{
    inverse_transform_sample, CumulativeTable, InverseTransformSampler,
};
use mini_montecarlo::ks_test::{one_sample_ks_test, two_sample_ks_test};
use mini_montecarlo::stats;
use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

#[cfg(test)]
mod tests {
    use super::*;

    const LO: f64 = -3.0;
    const HI: f64 = 3.0;
    const SEED: u64 = 42;

    fn standard_normal() -> Normal {
        Normal::new(0.0, 1.0).unwrap()
    }

    fn normal_pdf(x: f64) -> f64 {
        standard_normal().pdf(x)
    }

    fn truncated_cdf(x: f64) -> f64 {
        let normal = standard_normal();
        let x = x.clamp(LO, HI);
        (normal.cdf(x) - normal.cdf(LO)) / (normal.cdf(HI) - normal.cdf(LO))
    }

    fn grid() -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = Array1::linspace(LO, HI, 10_000).to_vec();
        let y = x.iter().map(|&x| normal_pdf(x)).collect();
        (x, y)
    }

    /// The 10 000-point / 5000-sample scenario: every draw in [-3, 3] and a
    /// 100-bin normalized histogram close to the density.
    #[test]
    fn test_scenario_histogram() {
        let (x, y) = grid();
        let mut rng = SmallRng::seed_from_u64(SEED);
        let samples = inverse_transform_sample(&mut rng, &x, &y, 5_000).unwrap();

        assert_eq!(samples.len(), 5_000);
        assert!(samples.iter().all(|s| (LO..=HI).contains(s)));

        let hist = stats::histogram(&samples, None, 100, Some((LO, HI)), true).unwrap();
        let mass = standard_normal().cdf(HI) - standard_normal().cdf(LO);
        let centers = hist.centers();
        // Each bin holds about 5000 * 0.06 * 0.4 = 120 draws at the mode, so
        // bins deviate by roughly 10% there; compare the smoothed profile.
        let mut max_gap: f64 = 0.0;
        for k in (0..100).step_by(10) {
            let observed: f64 = hist.values.slice(ndarray::s![k..k + 10]).mean().unwrap();
            let expected: f64 = centers
                .slice(ndarray::s![k..k + 10])
                .iter()
                .map(|&c| normal_pdf(c) / mass)
                .sum::<f64>()
                / 10.0;
            max_gap = max_gap.max((observed - expected).abs());
        }
        assert!(max_gap < 0.05, "Histogram deviates from the density by {max_gap}.");
    }

    /// One-sample KS test of 50 000 draws against the analytic truncated CDF.
    #[test]
    fn test_truncated_normal_accept() {
        let (x, y) = grid();
        let mut sampler = InverseTransformSampler::new(&x, &y).unwrap().set_seed(SEED);
        let mut samples = sampler.sample(50_000).unwrap();

        let result = one_sample_ks_test(&mut samples, truncated_cdf, 0.001).unwrap();
        assert!(
            result.statistic < 0.012,
            "KS statistic too large: {:?}",
            result
        );
    }

    /// A shifted density must be told apart from the truncated normal.
    #[test]
    fn test_shifted_normal_reject() {
        let x: Vec<f64> = Array1::linspace(LO, HI, 10_000).to_vec();
        let y: Vec<f64> = x.iter().map(|&x| normal_pdf(x - 0.3)).collect();
        let mut sampler = InverseTransformSampler::new(&x, &y).unwrap().set_seed(SEED);
        let mut samples = sampler.sample(10_000).unwrap();

        let result = one_sample_ks_test(&mut samples, truncated_cdf, 0.01).unwrap();
        assert!(result.is_rejected, "Expected rejection, got {:?}", result);
    }

    /// Two-sample KS test against rejection-sampled normals on [-3, 3], and a
    /// cross-check of the statistic against the `kolmogorov_smirnov` crate.
    #[test]
    fn test_against_rejection_sampled_normals() {
        let (x, y) = grid();
        let mut sampler = InverseTransformSampler::new(&x, &y).unwrap().set_seed(SEED);
        let mut samples = sampler.sample(2_000).unwrap();

        let mut rng = SmallRng::seed_from_u64(SEED + 1);
        let mut reference: Vec<f64> =
            std::iter::repeat_with(|| rng.sample::<f64, _>(StandardNormal))
                .filter(|z| (LO..=HI).contains(z))
                .take(2_000)
                .collect();

        let expected = kolmogorov_smirnov::test_f64(&samples, &reference, 0.95);
        let result = two_sample_ks_test(&mut samples, &mut reference, 0.001).unwrap();
        assert!(
            (result.statistic - expected.statistic).abs() < 1e-9,
            "Statistic {} differs from reference implementation {}.",
            result.statistic,
            expected.statistic
        );
        assert!(result.statistic < 0.07, "KS statistic too large: {:?}", result);
    }

    #[test]
    fn test_cumulative_table_properties() {
        let (x, y) = grid();
        let table = CumulativeTable::from_density(&y).unwrap();
        let values = table.values();
        assert!(values[0] >= 0.0);
        assert!(values.windows(2).all(|p| p[0] <= p[1]));
        assert_eq!(*values.last().unwrap(), 1.0);
        // Median of a symmetric density maps to the center of the grid.
        assert!(table.invert(0.5, &x).abs() < 1e-3);
    }
}
