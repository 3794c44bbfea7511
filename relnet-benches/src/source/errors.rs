//! Error types for synthetic benchmark topology generation.

use relnet_core::TopologyError;

/// Errors that may occur while preparing benchmark topologies.
#[derive(Debug, thiserror::Error)]
pub enum SyntheticError {
    /// The requested ring had too few nodes.
    #[error("ring topologies need at least three nodes (got {node_count})")]
    RingTooSmall {
        /// Number of nodes requested.
        node_count: usize,
    },
    /// The requested edge reliability was outside the unit interval.
    #[error("edge reliability must lie in [0.0, 1.0] (got {got})")]
    InvalidReliability {
        /// The rejected reliability value.
        got: f64,
    },
    /// Assembling the generated description failed.
    #[error("topology assembly failed: {0}")]
    Topology(#[from] TopologyError),
}
