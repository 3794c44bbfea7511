//! Benchmark parameter types.
//!
//! Groups related benchmark parameters into structs so that benchmark
//! helper functions stay under the Clippy `too-many-arguments` threshold.

use std::fmt;

/// Parameters for a reliability estimation benchmark run.
#[derive(Clone, Debug)]
pub struct EstimateBenchParams {
    /// Number of nodes in the generated topology.
    pub node_count: usize,
    /// Number of Monte-Carlo trials per estimate.
    pub trials: usize,
}

impl fmt::Display for EstimateBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},t={}", self.node_count, self.trials,)
    }
}

/// Parameters for a percolation sweep benchmark run.
#[derive(Clone, Debug)]
pub struct SweepBenchParams {
    /// Number of nodes in the generated topology.
    pub node_count: usize,
}

impl fmt::Display for SweepBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}", self.node_count)
    }
}
