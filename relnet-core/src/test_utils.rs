//! Shared test utilities for `relnet-core`.

use proptest::test_runner::Config as ProptestConfig;
use rand::{Rng, SeedableRng, rngs::SmallRng, seq::SliceRandom};

use crate::topology::{Topology, TopologyBuilder};

/// Builds a standard proptest configuration for this crate's property
/// suites. Case counts stay overridable through `PROPTEST_CASES`.
#[must_use]
pub(crate) fn suite_proptest_config(cases: u32) -> ProptestConfig {
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

/// Builds a connected topology: a random spanning tree over `node_count`
/// nodes plus a handful of chord edges, every edge at `reliability`.
/// Terminals are node `0` and the highest node id.
pub(crate) fn connected_topology(
    node_count: usize,
    reliability: f64,
    rng: &mut SmallRng,
) -> Topology {
    assert!(node_count >= 2, "a connected fixture needs two nodes");
    let mut order: Vec<usize> = (0..node_count).collect();
    order.shuffle(rng);

    let mut builder = TopologyBuilder::new()
        .with_name("connected-fixture")
        .with_terminals(0, node_count - 1);
    for window in order.windows(2) {
        builder = builder.with_edge(window[0], window[1], reliability);
    }

    let chords = rng.gen_range(0..=node_count / 2);
    for _ in 0..chords {
        let first = rng.gen_range(0..node_count);
        let second = rng.gen_range(0..node_count);
        if first != second {
            builder = builder.with_edge(first, second, reliability);
        }
    }

    builder.build().expect("generated edges are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connected_fixture_spans_every_node() {
        let mut rng = SmallRng::seed_from_u64(1);
        for nodes in [2, 5, 17] {
            let topology = connected_topology(nodes, 1.0, &mut rng);
            let mut visited = vec![false; topology.node_count()];
            crate::traversal::mark_reachable(&topology, 0, &mut visited);
            assert!(visited.iter().all(|&marked| marked), "{nodes} nodes");
        }
    }
}
