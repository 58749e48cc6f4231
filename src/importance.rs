/*!
# Weighted Importance Sampling

Draws raw samples over the domain of a tabulated proposal density `w` and
attaches to each draw `x_k` the weight

```text
weight_k = Z * f(x_k) / w(x_k),        Z = ∫ w(x) dx  (trapezoidal rule)
```

where `f` is the tabulated target density and both tables are linearly
interpolated at `x_k`. The weighted sample set `(x_k, weight_k)` is what a
weighted histogram consumes downstream.

## Where raw draws come from

By default ([`ProposalDraws::Uniform`]) the raw draws are uniform over
`[x[0], x[m - 1]]`. The weight formula above, however, is the textbook one for
draws distributed as `w / Z`, so with a non-uniform `w` the default weighted
histogram is biased: `(1/n) Σ weight_k` tends to `Z / (b - a) ∫ f / w`, not to
`∫ f`. The default is kept because it is the behaviour callers of the plain
[`importance_sample`] function rely on.

[`ProposalDraws::Proposal`] draws raw samples from `w` itself (through the
inverse-transform sampler), which turns the same weights into the unbiased
estimator `(1/n) Σ weight_k g(x_k) → ∫ f g`.

## Example Usage

```rust
use mini_montecarlo::core::Sampler;
use mini_montecarlo::importance::{ImportanceSampler, ProposalDraws};
use ndarray::Array1;

let x: Vec<f64> = Array1::linspace(-3.0, 0.9999, 10_000).to_vec();
let f: Vec<f64> = x.iter().map(|x| (-0.5 * x * x).exp()).collect();
let w: Vec<f64> = x.iter().map(|x| 1.0 - x).collect();

let mut sampler = ImportanceSampler::new(&x, &f, &w)
    .unwrap()
    .draws(ProposalDraws::Proposal)
    .set_seed(42);
let weighted = sampler.sample(1_000).unwrap();

assert_eq!(weighted.samples.len(), 1_000);
assert_eq!(weighted.weights.len(), 1_000);
assert!(weighted.weights.iter().all(|w| w.is_finite() && *w >= 0.0));
```
*/

use log::{debug, warn};
use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use crate::core::{SampleSet, Sampler};
use crate::error::{check_sample_count, Result, SamplingError};
use crate::grid::{interp, trapezoid, validate_grid, validate_values};
use crate::inversion::CumulativeTable;

/// Distribution the raw (unweighted) draws are taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProposalDraws {
    /// Uniform over the grid's support. Matches the weighting only when the
    /// proposal density is itself uniform.
    #[default]
    Uniform,
    /// Inverse-transform draws from the proposal density.
    Proposal,
}

/// Draw positions with their parallel importance weights.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeightedSamples {
    pub samples: Vec<f64>,
    pub weights: Vec<f64>,
}

impl WeightedSamples {
    /// Iterates over `(sample, weight)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().copied().zip(self.weights.iter().copied())
    }

    /// `(1/n) Σ weight_k`, the estimate of `∫ f` over the grid.
    pub fn mean_weight(&self) -> f64 {
        if self.weights.is_empty() {
            return 0.0;
        }
        self.weights.iter().sum::<f64>() / self.weights.len() as f64
    }
}

impl SampleSet for WeightedSamples {
    fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
            weights: Vec::with_capacity(n),
        }
    }

    fn append(&mut self, mut other: Self) {
        self.samples.append(&mut other.samples);
        self.weights.append(&mut other.weights);
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// Validated target/proposal pair on a shared grid.
#[derive(Debug, Clone)]
struct Tables {
    x: Vec<f64>,
    f: Vec<f64>,
    w: Vec<f64>,
    z: f64,
}

impl Tables {
    fn new(x: &[f64], f: &[f64], w: &[f64]) -> Result<Self> {
        validate_grid(x)?;
        validate_values("f", x, f)?;
        validate_values("w", x, w)?;
        let z = trapezoid(w, x);
        if !z.is_finite() {
            return Err(SamplingError::DegenerateDistribution(format!(
                "proposal integral overflows ({z})"
            )));
        }
        Ok(Self {
            x: x.to_vec(),
            f: f.to_vec(),
            w: w.to_vec(),
            z,
        })
    }

    fn support(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// `Z * f(at) / w(at)`; zero where both densities vanish. A weight that
    /// is not finite (zero or vanishingly small `w` under target mass) fails.
    fn weight_at(&self, at: f64) -> Result<f64> {
        let f_at = interp(at, &self.x, &self.f);
        let w_at = interp(at, &self.x, &self.w);
        if f_at == 0.0 {
            return Ok(0.0);
        }
        let weight = self.z * f_at / w_at;
        if w_at > 0.0 && weight.is_finite() {
            Ok(weight)
        } else {
            Err(SamplingError::DegenerateWeight { position: at })
        }
    }

    fn weigh(&self, samples: Vec<f64>) -> Result<WeightedSamples> {
        let weights = samples
            .iter()
            .map(|&s| self.weight_at(s))
            .collect::<Result<Vec<f64>>>()?;
        if weights.iter().all(|&w| w == 0.0) {
            warn!(
                "all {} importance weights are zero; the target has no mass where samples were drawn",
                weights.len()
            );
        }
        Ok(WeightedSamples { samples, weights })
    }
}

/// Where raw draws come from, prepared once.
#[derive(Debug, Clone)]
enum RawDraws {
    Uniform(Uniform<f64>),
    Proposal(CumulativeTable),
}

impl RawDraws {
    fn new(tables: &Tables, mode: ProposalDraws) -> Result<Self> {
        match mode {
            ProposalDraws::Uniform => {
                let (lo, hi) = tables.support();
                Ok(RawDraws::Uniform(Uniform::new(lo, hi)))
            }
            ProposalDraws::Proposal => CumulativeTable::from_density(&tables.w)
                .map(RawDraws::Proposal)
                .map_err(|_| {
                    SamplingError::DegenerateDistribution(
                        "proposal density sums to zero, so it cannot be sampled".into(),
                    )
                }),
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, x: &[f64], n: usize) -> Vec<f64> {
        match self {
            RawDraws::Uniform(uniform) => (0..n).map(|_| uniform.sample(rng)).collect(),
            RawDraws::Proposal(table) => (0..n)
                .map(|_| table.invert(rng.gen::<f64>(), x))
                .collect(),
        }
    }
}

/**
Draws `n` samples uniformly over `[x[0], x[m - 1]]` and weights each by
`Z * f(x_k) / w(x_k)` with `Z` the trapezoidal integral of `w`.

See the [module documentation](self) for why uniform raw draws only match the
weighting when `w` is uniform, and [`importance_sample_with`] for drawing from
`w` instead.

# Errors

- [`SamplingError::InvalidArgument`] for an invalid grid, mismatched lengths,
  negative or non-finite density values, or `n == 0`.
- [`SamplingError::DegenerateDistribution`] if the trapezoidal integral of `w`
  overflows.
- [`SamplingError::DegenerateWeight`] if a draw lands where `w` is zero (or so
  small that the weight overflows) and `f` is not.

# Examples

```rust
use mini_montecarlo::importance::importance_sample;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let x = [0.0, 1.0, 2.0];
let f = [1.0, 2.0, 1.0];
let w = [1.0, 1.0, 1.0];
let mut rng = SmallRng::seed_from_u64(42);
let weighted = importance_sample(&mut rng, &x, &f, &w, 100).unwrap();
assert_eq!(weighted.samples.len(), 100);
```
*/
pub fn importance_sample<R: Rng + ?Sized>(
    rng: &mut R,
    x: &[f64],
    f: &[f64],
    w: &[f64],
    n: usize,
) -> Result<WeightedSamples> {
    importance_sample_with(rng, x, f, w, n, ProposalDraws::Uniform)
}

/// [`importance_sample`] with an explicit choice of where raw draws come from.
pub fn importance_sample_with<R: Rng + ?Sized>(
    rng: &mut R,
    x: &[f64],
    f: &[f64],
    w: &[f64],
    n: usize,
    draws: ProposalDraws,
) -> Result<WeightedSamples> {
    let tables = Tables::new(x, f, w)?;
    check_sample_count(n)?;
    let raw = RawDraws::new(&tables, draws)?;
    debug!(
        "importance sampling {n} draws ({draws:?}) over {} grid points, Z = {}",
        x.len(),
        tables.z
    );
    tables.weigh(raw.draw(rng, &tables.x, n))
}

/// Importance sampler over fixed target and proposal tables with its own generator.
#[derive(Debug, Clone)]
pub struct ImportanceSampler {
    tables: Tables,
    raw: RawDraws,
    mode: ProposalDraws,
    /// The seed `rng` was initialized with.
    pub seed: u64,
    /// The random number generator consumed by [`Sampler::sample`].
    pub rng: SmallRng,
}

impl ImportanceSampler {
    /// Validates the tables and computes `Z`. Raw draws default to
    /// [`ProposalDraws::Uniform`]; the generator is seeded randomly.
    pub fn new(x: &[f64], f: &[f64], w: &[f64]) -> Result<Self> {
        let tables = Tables::new(x, f, w)?;
        let raw = RawDraws::new(&tables, ProposalDraws::Uniform)?;
        let seed = thread_rng().gen::<u64>();
        Ok(Self {
            tables,
            raw,
            mode: ProposalDraws::Uniform,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    /**
    Selects where raw draws come from.

    # Errors

    [`SamplingError::DegenerateDistribution`] when switching to
    [`ProposalDraws::Proposal`] with a proposal that sums to zero.
    */
    pub fn with_draws(mut self, mode: ProposalDraws) -> Result<Self> {
        self.raw = RawDraws::new(&self.tables, mode)?;
        self.mode = mode;
        Ok(self)
    }

    /// Infallible variant of [`with_draws`](Self::with_draws) for proposals
    /// already known to carry mass. A proposal that sums to zero keeps the
    /// previous mode and logs a warning.
    pub fn draws(mut self, mode: ProposalDraws) -> Self {
        match RawDraws::new(&self.tables, mode) {
            Ok(raw) => {
                self.raw = raw;
                self.mode = mode;
            }
            Err(err) => warn!("keeping {:?} raw draws: {err}", self.mode),
        }
        self
    }

    pub fn mode(&self) -> ProposalDraws {
        self.mode
    }

    /// Trapezoidal integral of the proposal density.
    pub fn proposal_integral(&self) -> f64 {
        self.tables.z
    }
}

impl Sampler for ImportanceSampler {
    type Output = WeightedSamples;

    fn sample(&mut self, n: usize) -> Result<WeightedSamples> {
        check_sample_count(n)?;
        let samples = self.raw.draw(&mut self.rng, &self.tables.x, n);
        self.tables.weigh(samples)
    }

    fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    fn gaussian_vs_ramp(hi: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = Array1::linspace(-3.0, hi, 10_000).to_vec();
        let f = x.iter().map(|x| (-0.5 * x * x).exp()).collect();
        let w = x.iter().map(|x| 1.0 - x).collect();
        (x, f, w)
    }

    #[test]
    fn weights_follow_ratio_formula() {
        let (x, f, w) = gaussian_vs_ramp(0.9999);
        let mut rng = SmallRng::seed_from_u64(1);
        let weighted = importance_sample(&mut rng, &x, &f, &w, 2_000).unwrap();
        let z = trapezoid(&w, &x);
        for (s, wt) in weighted.iter() {
            let expected = z * interp(s, &x, &f) / interp(s, &x, &w);
            assert_abs_diff_eq!(wt, expected, epsilon = 1e-9 * expected.max(1.0));
        }
    }

    #[test]
    fn uniform_draws_cover_support() {
        let (x, f, w) = gaussian_vs_ramp(0.9999);
        let mut rng = SmallRng::seed_from_u64(2);
        let weighted = importance_sample(&mut rng, &x, &f, &w, 10_000).unwrap();
        assert!(weighted.samples.iter().all(|s| (-3.0..=0.9999).contains(s)));
        let mean = weighted.samples.iter().sum::<f64>() / 10_000.0;
        // Uniform over [-3, 0.9999] has mean about -1.
        assert_abs_diff_eq!(mean, -1.0, epsilon = 0.05);
    }

    #[test]
    fn uniform_proposal_recovers_target_integral() {
        // With a flat proposal the uniform draws are the proposal draws.
        let x: Vec<f64> = Array1::linspace(-3.0, 3.0, 2_001).to_vec();
        let f: Vec<f64> = x.iter().map(|x| (-0.5 * x * x).exp()).collect();
        let w = vec![0.5; x.len()];
        let mut rng = SmallRng::seed_from_u64(3);
        let weighted = importance_sample(&mut rng, &x, &f, &w, 100_000).unwrap();
        assert_abs_diff_eq!(weighted.mean_weight(), trapezoid(&f, &x), epsilon = 0.03);
    }

    #[test]
    fn zero_proposal_under_target_mass_is_degenerate() {
        let x = [0.0, 1.0, 2.0];
        let f = [1.0, 1.0, 1.0];
        let w = [0.0, 0.0, 0.0];
        let mut rng = SmallRng::seed_from_u64(4);
        let err = importance_sample(&mut rng, &x, &f, &w, 5).unwrap_err();
        assert!(matches!(err, SamplingError::DegenerateWeight { .. }), "{err:?}");
    }

    #[test]
    fn overflowing_weight_is_degenerate() {
        // The proposal drops to subnormal values on [1, 2].
        let x = [0.0, 1.0, 2.0];
        let f = [1.0, 1.0, 1.0];
        let w = [1e300, 1e-320, 1e-320];
        let tables = Tables::new(&x, &f, &w).unwrap();
        match tables.weight_at(1.5) {
            Err(SamplingError::DegenerateWeight { position }) => assert_eq!(position, 1.5),
            other => panic!("Expected DegenerateWeight, got {other:?}"),
        }
        assert!(tables.weight_at(0.5).unwrap().is_finite());

        let mut rng = SmallRng::seed_from_u64(4);
        let err = importance_sample(&mut rng, &x, &f, &w, 50).unwrap_err();
        assert!(matches!(err, SamplingError::DegenerateWeight { .. }), "{err:?}");
    }

    #[test]
    fn overflowing_proposal_integral_is_rejected() {
        let x = [0.0, 1e308];
        let f = [1.0, 1.0];
        let w = [1e10, 1e10];
        let mut rng = SmallRng::seed_from_u64(4);
        let err = importance_sample(&mut rng, &x, &f, &w, 5).unwrap_err();
        assert!(matches!(err, SamplingError::DegenerateDistribution(_)), "{err:?}");
        assert!(ImportanceSampler::new(&x, &f, &w).is_err());
    }

    #[test]
    fn zero_proposal_and_zero_target_gives_zero_weight() {
        // Proposal and target both vanish on [1, 2].
        let x = [0.0, 1.0, 2.0];
        let f = [1.0, 0.0, 0.0];
        let w = [1.0, 0.0, 0.0];
        let tables = Tables::new(&x, &f, &w).unwrap();
        assert_eq!(tables.weight_at(1.5).unwrap(), 0.0);
        assert_eq!(tables.weight_at(2.0).unwrap(), 0.0);
        assert!(tables.weight_at(0.5).unwrap() > 0.0);
    }

    #[test]
    fn degenerate_weight_reports_position() {
        let x = [0.0, 1.0];
        let f = [1.0, 1.0];
        let w = [1.0, 0.0];
        let tables = Tables::new(&x, &f, &w).unwrap();
        match tables.weight_at(1.0) {
            Err(SamplingError::DegenerateWeight { position }) => assert_eq!(position, 1.0),
            other => panic!("Expected DegenerateWeight, got {other:?}"),
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let mut rng = SmallRng::seed_from_u64(5);
        let x = [0.0, 1.0, 2.0];
        let ok = [1.0, 1.0, 1.0];
        let short = [1.0, 1.0];
        let negative = [1.0, -1.0, 1.0];
        assert!(importance_sample(&mut rng, &x, &short, &ok, 5).is_err());
        assert!(importance_sample(&mut rng, &x, &ok, &short, 5).is_err());
        assert!(importance_sample(&mut rng, &x, &ok, &negative, 5).is_err());
        assert!(importance_sample(&mut rng, &[0.0, 0.0, 1.0], &ok, &ok, 5).is_err());
        let err = importance_sample(&mut rng, &x, &ok, &ok, 0).unwrap_err();
        assert!(matches!(err, SamplingError::InvalidArgument(_)), "{err:?}");
    }

    #[test]
    fn proposal_mode_needs_proposal_mass() {
        let x = [0.0, 1.0, 2.0];
        let f = [0.0, 0.0, 0.0];
        let w = [0.0, 0.0, 0.0];
        let sampler = ImportanceSampler::new(&x, &f, &w).unwrap();
        let err = sampler.clone().with_draws(ProposalDraws::Proposal).unwrap_err();
        assert!(matches!(err, SamplingError::DegenerateDistribution(_)), "{err:?}");
        assert_eq!(sampler.draws(ProposalDraws::Proposal).mode(), ProposalDraws::Uniform);
    }

    #[test]
    fn sampler_matches_free_function() {
        let (x, f, w) = gaussian_vs_ramp(0.9999);
        for mode in [ProposalDraws::Uniform, ProposalDraws::Proposal] {
            let expected = importance_sample_with(
                &mut SmallRng::seed_from_u64(8),
                &x,
                &f,
                &w,
                500,
                mode,
            )
            .unwrap();
            let mut sampler = ImportanceSampler::new(&x, &f, &w)
                .unwrap()
                .draws(mode)
                .set_seed(8);
            assert_eq!(sampler.sample(500).unwrap(), expected);
        }
    }

    #[test]
    fn proposal_draws_follow_proposal_density() {
        let (x, f, w) = gaussian_vs_ramp(0.9999);
        let mut sampler = ImportanceSampler::new(&x, &f, &w)
            .unwrap()
            .draws(ProposalDraws::Proposal)
            .set_seed(6);
        let weighted = sampler.sample(50_000).unwrap();
        let mean = weighted.samples.iter().sum::<f64>() / 50_000.0;
        // Mean of the density (1 - x) / 8 on [-3, 1] is -5/3.
        assert_abs_diff_eq!(mean, -5.0 / 3.0, epsilon = 0.03);
    }

    #[test]
    fn proposal_integral_of_ramp() {
        let (x, f, w) = gaussian_vs_ramp(0.9999);
        let sampler = ImportanceSampler::new(&x, &f, &w).unwrap();
        let exact = (0.9999 - 0.5 * 0.9999 * 0.9999) - (-3.0 - 4.5);
        assert_abs_diff_eq!(sampler.proposal_integral(), exact, epsilon = 1e-9);
    }
}
