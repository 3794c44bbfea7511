//! Benchmark support crate for relnet.
//!
//! Provides synthetic topology sources and parameter types used by
//! Criterion benchmarks for the two measured paths: Monte-Carlo
//! reliability estimation and the percolation sweep.

pub mod error;
pub mod params;
pub mod source;
