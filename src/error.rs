//! Error type shared by the samplers and the statistics helpers.

use thiserror::Error;

/// Everything that can go wrong while tabulating, sampling or summarizing.
#[derive(Debug, Error)]
pub enum SamplingError {
    /// Input-contract violation detected before any random draw is made:
    /// a non-increasing grid, mismatched lengths, negative or non-finite
    /// density values, or a zero sample count.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The tabulated density sums (or integrates) to zero, so it cannot be
    /// normalized into a distribution.
    #[error("degenerate distribution: {0}")]
    DegenerateDistribution(String),

    /// The proposal density vanishes at a drawn position where the target
    /// density does not, which would make the importance weight infinite.
    #[error("degenerate weight: proposal density is zero at x = {position} but the target is not")]
    DegenerateWeight { position: f64 },

    /// Invalid input to one of the Kolmogorov–Smirnov helpers.
    #[error("KS test: {0}")]
    KsTest(String),

    #[cfg(feature = "csv")]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SamplingError>;

/// Rejects a zero sample count.
pub(crate) fn check_sample_count(n: usize) -> Result<()> {
    if n == 0 {
        return Err(SamplingError::InvalidArgument(
            "expected a positive sample count, got 0".into(),
        ));
    }
    Ok(())
}
