//! Unit tests for the synthetic topology generator.

use super::{RingConfig, SyntheticError, ring_with_chords};
use relnet_core::mark_reachable;
use rstest::{fixture, rstest};

#[fixture]
fn ring_config() -> RingConfig {
    RingConfig {
        node_count: 16,
        chord_count: 8,
        reliability: 0.9,
        seed: 7,
    }
}

#[rstest]
#[case::minimal(3, 0, 1)]
#[case::medium(8, 4, 4)]
#[case::larger(32, 16, 16)]
fn ring_generator_respects_shape(
    #[case] node_count: usize,
    #[case] chord_count: usize,
    #[case] expected_sink: usize,
) {
    let topology = ring_with_chords(&RingConfig {
        node_count,
        chord_count,
        reliability: 0.9,
        seed: 5,
    })
    .expect("ring generation should succeed");

    assert_eq!(topology.node_count(), node_count);
    assert_eq!(topology.edge_count(), node_count + chord_count);
    assert_eq!(topology.source(), 0);
    assert_eq!(topology.sink(), expected_sink);
}

#[rstest]
fn ring_generator_spans_every_node(ring_config: RingConfig) {
    let topology = ring_with_chords(&ring_config).expect("ring generation should succeed");

    let mut visited = vec![false; topology.node_count()];
    mark_reachable(&topology, topology.source(), &mut visited);

    assert!(visited.iter().all(|&marked| marked));
}

#[rstest]
fn ring_generator_is_deterministic(ring_config: RingConfig) {
    let left = ring_with_chords(&ring_config).expect("first generation should succeed");
    let right = ring_with_chords(&ring_config).expect("second generation should succeed");

    let left_edges: Vec<_> = left.edges().iter().map(|edge| edge.endpoints()).collect();
    let right_edges: Vec<_> = right.edges().iter().map(|edge| edge.endpoints()).collect();
    assert_eq!(left_edges, right_edges);
}

#[rstest]
fn ring_generator_rejects_small_rings(ring_config: RingConfig) {
    let error = ring_with_chords(&RingConfig {
        node_count: 2,
        ..ring_config
    })
    .expect_err("two nodes cannot form a ring");

    assert!(matches!(error, SyntheticError::RingTooSmall { node_count: 2 }));
}

#[rstest]
#[case::above_one(1.5)]
#[case::negative(-0.25)]
#[case::nan(f64::NAN)]
fn ring_generator_rejects_invalid_reliability(
    ring_config: RingConfig,
    #[case] reliability: f64,
) {
    let error = ring_with_chords(&RingConfig {
        reliability,
        ..ring_config
    })
    .expect_err("reliability outside the unit interval must fail");

    assert!(matches!(error, SyntheticError::InvalidReliability { .. }));
}

#[rstest]
fn chord_endpoints_stay_distinct(ring_config: RingConfig) {
    let topology = ring_with_chords(&RingConfig {
        chord_count: 64,
        ..ring_config
    })
    .expect("dense chord generation should succeed");

    for edge in topology.edges() {
        let (first, second) = edge.endpoints();
        assert_ne!(first, second);
    }
}
