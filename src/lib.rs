pub mod core;
pub mod error;
pub mod grid;
pub mod importance;
pub mod inversion;
pub mod io;
pub mod stats;
