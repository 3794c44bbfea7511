//! Benchmark setup error type.
//!
//! Aggregates the error types that may arise during benchmark data
//! preparation so that setup functions can propagate failures with `?`
//! instead of using `.expect()`.

use crate::source::SyntheticError;
use relnet_core::{EstimateError, TopologyError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic topology generation failed.
    #[error("synthetic topology generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Topology construction or mutation failed.
    #[error("topology operation failed: {0}")]
    Topology(#[from] TopologyError),
    /// Estimator configuration or execution failed.
    #[error("estimation failed: {0}")]
    Estimate(#[from] EstimateError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// A description of the parameter that was unexpectedly zero.
        context: &'static str,
    },
}
