//! Common sampler interface and helpers for running independent replicates in parallel.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::error::{check_sample_count, Result};

/// Draws per progress-bar tick in [`run_replicates_progress`].
const CHUNK_SIZE: usize = 1024;

/// Output of one sampling call that can be built up chunk by chunk.
pub trait SampleSet: Send + Sized {
    fn with_capacity(n: usize) -> Self;

    /// Appends `other` after the current samples.
    fn append(&mut self, other: Self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SampleSet for Vec<f64> {
    fn with_capacity(n: usize) -> Self {
        Vec::with_capacity(n)
    }

    fn append(&mut self, mut other: Self) {
        Vec::append(self, &mut other);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

/// A sampler that owns its random number generator.
///
/// Every draw consumes the sampler's own generator, so two samplers seeded
/// with the same value and fed the same sequence of calls produce the same
/// output. Drawing `n` samples in one call or in several consecutive calls
/// whose sizes add up to `n` yields identical samples.
pub trait Sampler: Send {
    type Output: SampleSet;

    /// Draws `n > 0` samples.
    fn sample(&mut self, n: usize) -> Result<Self::Output>;

    /// Returns the sampler with its generator reseeded with `seed`.
    fn set_seed(self, seed: u64) -> Self
    where
        Self: Sized;

    /// The seed the generator was last initialized with.
    fn seed(&self) -> u64;
}

/// Runs `n_replicates` independent copies of `sampler` in parallel, each drawing
/// `n` samples. Replicate `i` is seeded with `seed + i`, which makes the result
/// independent of thread scheduling.
pub fn run_replicates<S>(
    sampler: &S,
    seed: u64,
    n_replicates: usize,
    n: usize,
) -> Result<Vec<S::Output>>
where
    S: Sampler + Clone + Sync,
{
    (0..n_replicates)
        .into_par_iter()
        .map(|i| {
            let mut replicate = sampler.clone().set_seed(seed.wrapping_add(i as u64));
            replicate.sample(n)
        })
        .collect()
}

/// Draws `n` samples in chunks, advancing `pb` once per chunk.
pub fn sample_with_progress<S: Sampler>(
    sampler: &mut S,
    n: usize,
    pb: &ProgressBar,
) -> Result<S::Output> {
    check_sample_count(n)?;
    pb.set_length(n as u64);
    let mut out = S::Output::with_capacity(n);
    let mut remaining = n;
    while remaining > 0 {
        let chunk = remaining.min(CHUNK_SIZE);
        out.append(sampler.sample(chunk)?);
        remaining -= chunk;
        pb.inc(chunk as u64);
    }
    Ok(out)
}

/// Same as [`run_replicates`], with one progress bar per replicate.
pub fn run_replicates_progress<S>(
    sampler: &S,
    seed: u64,
    n_replicates: usize,
    n: usize,
) -> Result<Vec<S::Output>>
where
    S: Sampler + Clone + Sync,
{
    let multi = MultiProgress::new();
    let pb_style = ProgressStyle::default_bar()
        .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    (0..n_replicates)
        .into_par_iter()
        .map(|i| {
            let pb = multi.add(ProgressBar::new(n as u64));
            pb.set_prefix(format!("Replicate {i}"));
            pb.set_style(pb_style.clone());

            let mut replicate = sampler.clone().set_seed(seed.wrapping_add(i as u64));
            let samples = sample_with_progress(&mut replicate, n, &pb)?;

            pb.finish_with_message("Done!");
            Ok(samples)
        })
        .collect()
}
