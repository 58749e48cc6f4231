/*!
# Inverse-Transform Sampling

Samples from a tabulated density by pushing uniform draws through the inverse
of its cumulative table.

The cumulative table is the running sum of the density values divided by its
last entry. Each uniform draw `u ∈ [0, 1)` is mapped back to a grid position by
linear interpolation between the two table entries bracketing `u`. Draws below
the first entry map to `x[0]`.

Two entry points are provided:

- [`inverse_transform_sample`], a free function taking the generator
  explicitly, which builds the table on every call.
- [`InverseTransformSampler`], which validates the input and builds the table
  once, owns a seeded [`SmallRng`] and implements [`Sampler`].

## Example Usage

```rust
use mini_montecarlo::core::Sampler;
use mini_montecarlo::inversion::InverseTransformSampler;
use ndarray::Array1;

let x: Vec<f64> = Array1::linspace(-3.0, 3.0, 10_000).to_vec();
let y: Vec<f64> = x
    .iter()
    .map(|x| (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt())
    .collect();

let mut sampler = InverseTransformSampler::new(&x, &y).unwrap().set_seed(42);
let samples = sampler.sample(5_000).unwrap();

assert_eq!(samples.len(), 5_000);
assert!(samples.iter().all(|s| (-3.0..=3.0).contains(s)));
```
*/

use log::debug;
use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};

use crate::core::Sampler;
use crate::error::{check_sample_count, Result, SamplingError};
use crate::grid::{interp, TabulatedDensity};

/// Normalized running sum of a tabulated density.
///
/// Non-decreasing, first entry `>= 0`, last entry exactly `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeTable {
    values: Vec<f64>,
}

impl CumulativeTable {
    /// Builds the table from density values `y`.
    ///
    /// Fails with [`SamplingError::DegenerateDistribution`] if `y` sums to zero.
    /// `y` is expected to be validated already (finite, non-negative).
    pub fn from_density(y: &[f64]) -> Result<Self> {
        // Summing y / max(y) keeps the running sum below y.len() for any finite y.
        let peak = y.iter().copied().fold(0.0, f64::max);
        if peak.is_nan() || peak <= 0.0 {
            return Err(SamplingError::DegenerateDistribution(
                "tabulated density sums to zero".into(),
            ));
        }
        let mut values: Vec<f64> = y
            .iter()
            .scan(0.0, |acc, &v| {
                *acc += v / peak;
                Some(*acc)
            })
            .collect();

        let total = values.last().copied().unwrap_or(0.0);
        if !total.is_finite() || total <= 0.0 {
            return Err(SamplingError::DegenerateDistribution(format!(
                "tabulated density has no finite positive total ({total})"
            )));
        }
        values.iter_mut().for_each(|v| *v /= total);
        // Division can leave the last entry one ulp away from 1.
        if let Some(last) = values.last_mut() {
            *last = 1.0;
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Maps `u ∈ [0, 1)` to a position on the grid `x` (same length as the table).
    pub fn invert(&self, u: f64, x: &[f64]) -> f64 {
        interp(u, &self.values, x)
    }

    /// Draws `n` uniform values from `rng` and inverts each of them.
    fn draw<R: Rng + ?Sized>(&self, rng: &mut R, x: &[f64], n: usize) -> Vec<f64> {
        (0..n).map(|_| self.invert(rng.gen::<f64>(), x)).collect()
    }
}

/**
Draws `n` samples distributed (approximately) according to the density
proportional to `y` on the grid `x`.

The output is left in draw order; sort it if a presentation needs that.
Exactly `n` values are consumed from `rng`.

# Errors

- [`SamplingError::InvalidArgument`] if `x` has fewer than two points, is not
  strictly increasing, `y` has a different length or holds negative or
  non-finite values, or `n == 0`.
- [`SamplingError::DegenerateDistribution`] if `y` is identically zero.

# Examples

```rust
use mini_montecarlo::inversion::inverse_transform_sample;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let x = [0.0, 1.0, 2.0];
let y = [1.0, 1.0, 1.0];
let mut rng = SmallRng::seed_from_u64(42);
let samples = inverse_transform_sample(&mut rng, &x, &y, 100).unwrap();
assert!(samples.iter().all(|s| (0.0..=2.0).contains(s)));
```
*/
pub fn inverse_transform_sample<R: Rng + ?Sized>(
    rng: &mut R,
    x: &[f64],
    y: &[f64],
    n: usize,
) -> Result<Vec<f64>> {
    let density = TabulatedDensity::new(x, y)?;
    check_sample_count(n)?;
    let table = CumulativeTable::from_density(density.y())?;
    debug!("inverse-transform sampling {n} draws over {} grid points", x.len());
    Ok(table.draw(rng, density.x(), n))
}

/// Inverse-transform sampler over a fixed tabulated density with its own generator.
#[derive(Debug, Clone)]
pub struct InverseTransformSampler {
    density: TabulatedDensity,
    table: CumulativeTable,
    /// The seed `rng` was initialized with.
    pub seed: u64,
    /// The random number generator consumed by [`Sampler::sample`].
    pub rng: SmallRng,
}

impl InverseTransformSampler {
    /// Validates the density and builds its cumulative table. The generator is
    /// seeded randomly; call [`Sampler::set_seed`] for reproducible output.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        Self::from_density(TabulatedDensity::new(x, y)?)
    }

    pub fn from_density(density: TabulatedDensity) -> Result<Self> {
        let table = CumulativeTable::from_density(density.y())?;
        let seed = thread_rng().gen::<u64>();
        Ok(Self {
            density,
            table,
            seed,
            rng: SmallRng::seed_from_u64(seed),
        })
    }

    pub fn density(&self) -> &TabulatedDensity {
        &self.density
    }

    pub fn table(&self) -> &CumulativeTable {
        &self.table
    }
}

impl Sampler for InverseTransformSampler {
    type Output = Vec<f64>;

    fn sample(&mut self, n: usize) -> Result<Vec<f64>> {
        check_sample_count(n)?;
        Ok(self.table.draw(&mut self.rng, self.density.x(), n))
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
