//! Synthetic benchmark topologies.
//!
//! Provides a seeded ring-with-chords generator so benchmarks can measure
//! estimation cost on connected networks of controlled size without
//! shipping fixture files.

mod errors;

pub use errors::SyntheticError;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use relnet_core::{Topology, TopologyBuilder};

/// Smallest node count that forms a ring rather than a parallel pair.
const MIN_RING_NODES: usize = 3;

/// Configuration for ring-with-chords topology generation.
#[derive(Clone, Debug)]
pub struct RingConfig {
    /// Number of nodes in the ring.
    pub node_count: usize,
    /// Number of random chord edges added across the ring.
    pub chord_count: usize,
    /// Survival probability assigned to every edge.
    pub reliability: f64,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Generates a ring of `node_count` nodes with `chord_count` random chords.
///
/// Every node joins its two ring neighbours, then each chord connects a
/// uniformly drawn distinct node pair, so the result is connected by
/// construction and owns exactly `node_count + chord_count` edges. The
/// terminals are node `0` and the node halfway around the ring.
///
/// # Errors
/// Returns [`SyntheticError`] when the configuration is invalid.
pub fn ring_with_chords(config: &RingConfig) -> Result<Topology, SyntheticError> {
    validate_ring_config(config)?;

    let mut builder = TopologyBuilder::new()
        .with_name(format!(
            "ring-{}+{}",
            config.node_count, config.chord_count
        ))
        .with_terminals(0, ring_midpoint(config.node_count));
    for node in 1..config.node_count {
        builder = builder.with_edge(node - 1, node, config.reliability);
    }
    builder = builder.with_edge(config.node_count - 1, 0, config.reliability);

    let mut rng = SmallRng::seed_from_u64(config.seed);
    for _ in 0..config.chord_count {
        let (first, second) = distinct_pair(config.node_count, &mut rng);
        builder = builder.with_edge(first, second, config.reliability);
    }

    Ok(builder.build()?)
}

const fn validate_ring_config(config: &RingConfig) -> Result<(), SyntheticError> {
    if config.node_count < MIN_RING_NODES {
        return Err(SyntheticError::RingTooSmall {
            node_count: config.node_count,
        });
    }
    if config.reliability >= 0.0 && config.reliability <= 1.0 {
        Ok(())
    } else {
        Err(SyntheticError::InvalidReliability {
            got: config.reliability,
        })
    }
}

#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "the ring midpoint is the node farthest from the source terminal"
)]
const fn ring_midpoint(node_count: usize) -> usize {
    node_count / 2
}

/// Draws a uniformly random pair of distinct node ids by rejection.
fn distinct_pair(node_count: usize, rng: &mut SmallRng) -> (usize, usize) {
    loop {
        let first = rng.gen_range(0..node_count);
        let second = rng.gen_range(0..node_count);
        if first != second {
            return (first, second);
        }
    }
}

#[cfg(test)]
mod tests;
