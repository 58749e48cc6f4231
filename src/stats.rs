//! Summaries of plain and weighted sample sets: moments, importance-sampling
//! estimates, effective sample size and (weighted) histograms.

use ndarray::prelude::*;
use ndarray_stats::QuantileExt;

use crate::error::{Result, SamplingError};

/// Returns a sorted copy of `samples`, NaNs last.
pub fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut out = samples.to_vec();
    out.sort_unstable_by(|a, b| a.total_cmp(b));
    out
}

/// Sample mean and unbiased sample variance. `None` for fewer than two samples.
pub fn mean_and_variance(samples: &[f64]) -> Option<(f64, f64)> {
    if samples.len() < 2 {
        return None;
    }
    let view = ArrayView1::from(samples);
    Some((view.mean()?, view.var(1.0)))
}

fn check_parallel(samples: &[f64], weights: &[f64]) -> Result<()> {
    if samples.len() != weights.len() {
        return Err(SamplingError::InvalidArgument(format!(
            "length mismatch: {} samples but {} weights",
            samples.len(),
            weights.len()
        )));
    }
    if samples.is_empty() {
        return Err(SamplingError::InvalidArgument("expected at least one sample".into()));
    }
    Ok(())
}

/// Self-normalized weighted mean `Σ w_k x_k / Σ w_k`.
pub fn weighted_mean(samples: &[f64], weights: &[f64]) -> Result<f64> {
    check_parallel(samples, weights)?;
    let x = ArrayView1::from(samples);
    let w = ArrayView1::from(weights);
    let total = w.sum();
    if total <= 0.0 {
        return Err(SamplingError::InvalidArgument(
            "weights must have a positive sum".into(),
        ));
    }
    Ok(x.dot(&w) / total)
}

/// Importance-sampling estimate `(1/n) Σ w_k g(x_k)` of `∫ f g`.
pub fn importance_estimate<G: Fn(f64) -> f64>(
    samples: &[f64],
    weights: &[f64],
    g: G,
) -> Result<f64> {
    check_parallel(samples, weights)?;
    let total: f64 = samples.iter().zip(weights).map(|(&x, &w)| w * g(x)).sum();
    Ok(total / samples.len() as f64)
}

/// Kish effective sample size `(Σ w)² / Σ w²`. Zero for empty or all-zero weights.
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    let w = ArrayView1::from(weights);
    let sum_sq = w.dot(&w);
    if sum_sq == 0.0 {
        return 0.0;
    }
    w.sum().powi(2) / sum_sq
}

/// Bin edges and per-bin values of a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` increasing edges.
    pub edges: Array1<f64>,
    /// Counts (or summed weights), or a density if requested.
    pub values: Array1<f64>,
}

impl Histogram {
    pub fn centers(&self) -> Array1<f64> {
        let n = self.values.len();
        (&self.edges.slice(s![..n]) + &self.edges.slice(s![1..])) * 0.5
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }
}

/**
Histogram of `samples` over `bins` equal-width bins.

- `weights`: optional per-sample weights (importance sampling); each sample
  contributes its weight instead of one.
- `range`: `(lo, hi)`; defaults to the sample minimum and maximum. Samples
  outside are ignored and `hi` itself falls in the last bin.
- `density`: divide by total contribution times bin width so the histogram
  integrates to one.

# Errors

[`SamplingError::InvalidArgument`] for zero bins, empty input, mismatched
weights, an empty range, or a density request with zero total contribution.
*/
pub fn histogram(
    samples: &[f64],
    weights: Option<&[f64]>,
    bins: usize,
    range: Option<(f64, f64)>,
    density: bool,
) -> Result<Histogram> {
    if bins == 0 {
        return Err(SamplingError::InvalidArgument("expected at least one bin".into()));
    }
    if let Some(w) = weights {
        check_parallel(samples, w)?;
    } else if samples.is_empty() {
        return Err(SamplingError::InvalidArgument("expected at least one sample".into()));
    }

    let (lo, hi) = match range {
        Some(r) => r,
        None => {
            let view = ArrayView1::from(samples);
            let lo = *view
                .min()
                .map_err(|e| SamplingError::InvalidArgument(format!("sample range: {e}")))?;
            let hi = *view
                .max()
                .map_err(|e| SamplingError::InvalidArgument(format!("sample range: {e}")))?;
            (lo, hi)
        }
    };
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(SamplingError::InvalidArgument(format!(
            "histogram range ({lo}, {hi}) is empty or not finite"
        )));
    }

    let width = (hi - lo) / bins as f64;
    let mut values = Array1::<f64>::zeros(bins);
    for (k, &x) in samples.iter().enumerate() {
        if !(lo..=hi).contains(&x) {
            continue;
        }
        let bin = (((x - lo) / width) as usize).min(bins - 1);
        values[bin] += weights.map_or(1.0, |w| w[k]);
    }

    if density {
        let total = values.sum();
        if total <= 0.0 {
            return Err(SamplingError::InvalidArgument(
                "cannot normalize a histogram with zero total".into(),
            ));
        }
        values /= total * width;
    }

    Ok(Histogram {
        edges: Array1::linspace(lo, hi, bins + 1),
        values,
    })
}
