//! Export of sample sets for external plotting and analysis tools.

#[cfg(feature = "csv")]
pub mod csv;
