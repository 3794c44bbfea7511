use rand::{SeedableRng, rngs::SmallRng};
use rstest::rstest;

use super::*;
use crate::error::TopologyErrorCode;

fn path_topology(edges: usize) -> Topology {
    let mut builder = TopologyBuilder::new().with_terminals(0, edges);
    for node in 0..edges {
        builder = builder.with_edge(node, node + 1, 0.5);
    }
    builder.build().expect("path topology")
}

#[test]
fn builder_indexes_every_edge_under_both_endpoints() {
    let topology = TopologyBuilder::new()
        .with_edge(0, 1, 0.9)
        .with_edge(1, 2, 0.9)
        .with_edge(2, 0, 0.9)
        .build()
        .expect("triangle");
    assert_eq!(topology.adjacent(0), &[0, 2]);
    assert_eq!(topology.adjacent(1), &[0, 1]);
    assert_eq!(topology.adjacent(2), &[1, 2]);
}

#[test]
fn builder_widens_node_range_for_declared_nodes() {
    let topology = TopologyBuilder::new()
        .with_node_count(5)
        .with_edge(0, 1, 0.5)
        .build()
        .expect("topology");
    assert_eq!(topology.node_count(), 5);
    assert_eq!(topology.adjacent(4), &[] as &[usize]);
}

#[test]
fn builder_reports_the_first_invalid_edge() {
    let result = TopologyBuilder::new()
        .with_edge(0, 1, 0.5)
        .with_edge(2, 2, 0.5)
        .build();
    assert!(matches!(result, Err(TopologyError::SelfLoop { node: 2 })));
}

#[test]
fn from_reader_parses_complete_description() {
    let text = "type: edges\nstart: 0\nend: 3\nprob: 0.8\n\n0 1\n1 2\n2 3\n";
    let topology = Topology::from_reader("line", text.as_bytes()).expect("valid description");
    assert_eq!(topology.name(), "line");
    assert_eq!(topology.source(), 0);
    assert_eq!(topology.sink(), 3);
    assert_eq!(topology.edge_count(), 3);
    assert_eq!(topology.node_count(), 4);
    assert!(
        topology
            .edges()
            .iter()
            .all(|edge| (edge.reliability() - 0.8).abs() < f64::EPSILON)
    );
}

#[rstest]
#[case::empty_input("", TopologyErrorCode::MissingTypeHeader)]
#[case::no_type_key("start: 0\n", TopologyErrorCode::MissingTypeHeader)]
#[case::unknown_format(
    "type: mesh\nstart: 0\nend: 1\nprob: 0.5\n0 1\n",
    TopologyErrorCode::UnsupportedFormat
)]
#[case::missing_start("type: edges\nend: 1\n", TopologyErrorCode::MissingField)]
#[case::missing_prob("type: edges\nstart: 0\nend: 1\n", TopologyErrorCode::MissingField)]
#[case::garbled_start(
    "type: edges\nstart: zero\nend: 1\nprob: 0.5\n0 1\n",
    TopologyErrorCode::MalformedHeaderValue
)]
#[case::garbled_prob(
    "type: edges\nstart: 0\nend: 1\nprob: often\n0 1\n",
    TopologyErrorCode::MalformedHeaderValue
)]
#[case::prob_out_of_range(
    "type: edges\nstart: 0\nend: 1\nprob: 1.5\n0 1\n",
    TopologyErrorCode::InvalidReliability
)]
#[case::one_token_edge(
    "type: edges\nstart: 0\nend: 1\nprob: 0.5\n7\n",
    TopologyErrorCode::MalformedEdgeLine
)]
#[case::three_token_edge(
    "type: edges\nstart: 0\nend: 1\nprob: 0.5\n0 1 2\n",
    TopologyErrorCode::MalformedEdgeLine
)]
#[case::textual_edge(
    "type: edges\nstart: 0\nend: 1\nprob: 0.5\na b\n",
    TopologyErrorCode::MalformedEdgeLine
)]
#[case::negative_node(
    "type: edges\nstart: 0\nend: 1\nprob: 0.5\n-1 2\n",
    TopologyErrorCode::MalformedEdgeLine
)]
#[case::self_loop_edge(
    "type: edges\nstart: 0\nend: 1\nprob: 0.5\n3 3\n",
    TopologyErrorCode::SelfLoop
)]
#[case::no_edges("type: edges\nstart: 0\nend: 1\nprob: 0.5\n", TopologyErrorCode::EmptyTopology)]
fn from_reader_rejects_malformed_descriptions(
    #[case] text: &str,
    #[case] expected: TopologyErrorCode,
) {
    let error = Topology::from_reader("bad", text.as_bytes()).expect_err("description is invalid");
    assert_eq!(error.code(), expected);
}

#[test]
fn malformed_edge_error_names_the_offending_line() {
    let text = "type: edges\nstart: 0\nend: 1\nprob: 0.5\n0 1\n\nbroken line\n";
    let error = Topology::from_reader("bad", text.as_bytes()).expect_err("line is malformed");
    assert!(matches!(
        error,
        TopologyError::MalformedEdgeLine { line: 7, .. }
    ));
}

#[test]
fn disable_fraction_removes_floor_of_requested_fraction() {
    let mut topology = path_topology(10);
    let mut rng = SmallRng::seed_from_u64(42);
    let removed = topology.disable_fraction(0.35, &mut rng);
    assert_eq!(removed, 3);
    let down = topology.edges().iter().filter(|e| e.is_removed()).count();
    assert_eq!(down, 3);
}

#[test]
fn disable_fraction_resets_failed_edges() {
    let mut topology = path_topology(4);
    let mut rng = SmallRng::seed_from_u64(7);
    topology.edges_mut()[1].set_working(false);
    let removed = topology.disable_fraction(0.0, &mut rng);
    assert_eq!(removed, 0);
    assert!(topology.edges().iter().all(Edge::is_working));
}

#[test]
fn disable_fraction_accumulates_until_hard_reset() {
    let mut topology = path_topology(10);
    let mut rng = SmallRng::seed_from_u64(9);
    topology.disable_fraction(0.3, &mut rng);
    topology.disable_fraction(0.3, &mut rng);
    let down = topology.edges().iter().filter(|e| e.is_removed()).count();
    assert_eq!(down, 6);
    topology.hard_reset_all();
    assert!(topology.edges().iter().all(Edge::is_working));
}

#[rstest]
#[case::negative(-1.0, 0)]
#[case::nan(f64::NAN, 0)]
#[case::above_one(3.0, 6)]
fn disable_fraction_clamps_the_fraction(#[case] fraction: f64, #[case] expected: usize) {
    let mut topology = path_topology(6);
    let mut rng = SmallRng::seed_from_u64(3);
    assert_eq!(topology.disable_fraction(fraction, &mut rng), expected);
}

#[test]
fn set_uniform_reliability_overwrites_every_edge() {
    let mut topology = path_topology(5);
    topology.set_uniform_reliability(0.25);
    assert!(
        topology
            .edges()
            .iter()
            .all(|edge| (edge.reliability() - 0.25).abs() < f64::EPSILON)
    );
}

#[test]
fn add_edge_rebuilds_the_index() {
    let mut topology = path_topology(2);
    topology.add_edge(2, 5, 0.5).expect("edge is valid");
    assert_eq!(topology.node_count(), 6);
    assert_eq!(topology.adjacent(5), &[2]);
    assert_eq!(topology.adjacent(2), &[1, 2]);
}

#[test]
fn add_edge_rejects_invalid_edges_without_modifying_the_topology() {
    let mut topology = path_topology(2);
    assert!(topology.add_edge(4, 4, 0.5).is_err());
    assert!(topology.add_edge(0, 1, 7.0).is_err());
    assert_eq!(topology.edge_count(), 2);
    assert_eq!(topology.node_count(), 3);
}

#[test]
fn clear_releases_edges_and_shrinks_the_range() {
    let mut topology = path_topology(4);
    topology.clear();
    assert_eq!(topology.edge_count(), 0);
    assert_eq!(topology.node_count(), 1);
    assert_eq!(topology.adjacent(0), &[] as &[usize]);
}

#[test]
fn adjacent_is_empty_outside_the_node_range() {
    let topology = path_topology(2);
    assert_eq!(topology.adjacent(99), &[] as &[usize]);
}
