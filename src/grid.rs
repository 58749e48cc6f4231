/*!
Tabulated densities and the numerical kernels the samplers share: piecewise
linear interpolation and trapezoidal quadrature.

A tabulated density is a strictly increasing grid `x` together with
non-negative values `y` of the same length. It does not have to integrate to
one.

# Examples

```rust
use mini_montecarlo::grid::TabulatedDensity;
use ndarray::Array1;

let x: Vec<f64> = Array1::linspace(-3.0, 3.0, 601).to_vec();
let density = TabulatedDensity::from_fn(&x, |x| (-0.5 * x * x).exp()).unwrap();
assert_eq!(density.support(), (-3.0, 3.0));
assert!((density.eval(0.0) - 1.0).abs() < 1e-12);
```
*/

use num_traits::Float;

use crate::error::{Result, SamplingError};

/// A density evaluated on a strictly increasing grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedDensity {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl TabulatedDensity {
    /// Validates and copies the grid and its values.
    ///
    /// Fails with [`SamplingError::InvalidArgument`] if the grid has fewer than
    /// two points, is not strictly increasing, the lengths differ, or any value
    /// is negative or non-finite.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        validate_grid(x)?;
        validate_values("y", x, y)?;
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
        })
    }

    /// Tabulates a closed-form density on the given grid.
    pub fn from_fn<F: Fn(f64) -> f64>(x: &[f64], density: F) -> Result<Self> {
        let y: Vec<f64> = x.iter().map(|&xi| density(xi)).collect();
        Self::new(x, &y)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x[0], x[m - 1])`.
    pub fn support(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Linearly interpolated density at `at`, clamped to the end values
    /// outside the grid.
    pub fn eval(&self, at: f64) -> f64 {
        interp(at, &self.x, &self.y)
    }

    /// Trapezoidal integral over the grid.
    pub fn integral(&self) -> f64 {
        trapezoid(&self.y, &self.x)
    }
}

/// Checks that `x` has at least two finite, strictly increasing entries.
pub fn validate_grid(x: &[f64]) -> Result<()> {
    if x.len() < 2 {
        return Err(SamplingError::InvalidArgument(format!(
            "expected a grid with at least 2 points, got {}",
            x.len()
        )));
    }
    if let Some(bad) = x.iter().position(|v| !v.is_finite()) {
        return Err(SamplingError::InvalidArgument(format!(
            "grid value x[{bad}] = {} is not finite",
            x[bad]
        )));
    }
    if let Some(i) = x.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(SamplingError::InvalidArgument(format!(
            "grid must be strictly increasing, but x[{}] = {} >= x[{}] = {}",
            i,
            x[i],
            i + 1,
            x[i + 1]
        )));
    }
    Ok(())
}

/// Checks that `values` matches the grid length and holds finite,
/// non-negative numbers. `name` is only used in the error message.
pub fn validate_values(name: &str, x: &[f64], values: &[f64]) -> Result<()> {
    if values.len() != x.len() {
        return Err(SamplingError::InvalidArgument(format!(
            "length mismatch: x has {} points but {name} has {}",
            x.len(),
            values.len()
        )));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
        return Err(SamplingError::InvalidArgument(format!(
            "{name}[{i}] = {} must be finite and non-negative",
            values[i]
        )));
    }
    Ok(())
}

/// Piecewise linear interpolation of the table `(xp, fp)` at `at`.
///
/// `xp` must be non-decreasing and non-empty, and `fp` must have the same
/// length. Below `xp[0]` the result is `fp[0]`; at or above the last entry it
/// is the last value of `fp`. Inside the table the bracketing index is the
/// right-most one with `xp[lo] <= at`, so flat runs in `xp` never cause a
/// division by zero.
pub fn interp<T: Float>(at: T, xp: &[T], fp: &[T]) -> T {
    debug_assert!(!xp.is_empty() && xp.len() == fp.len());
    let last = xp.len() - 1;
    if at <= xp[0] {
        return fp[0];
    }
    if at >= xp[last] {
        return fp[last];
    }
    // xp[0] < at < xp[last], so hi lies in 1..=last.
    let hi = xp.partition_point(|&v| v <= at);
    let lo = hi - 1;
    let t = (at - xp[lo]) / (xp[hi] - xp[lo]);
    fp[lo] + t * (fp[hi] - fp[lo])
}

/// Trapezoidal rule for `∫ y dx` over the grid `x`.
pub fn trapezoid<T: Float>(y: &[T], x: &[T]) -> T {
    let half = T::one() / (T::one() + T::one());
    x.windows(2)
        .zip(y.windows(2))
        .fold(T::zero(), |acc, (xs, ys)| {
            acc + (xs[1] - xs[0]) * (ys[0] + ys[1]) * half
        })
}
