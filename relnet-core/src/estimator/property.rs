//! Property-based tests for the Monte-Carlo estimator.
//!
//! Universally quantified checks over randomly generated connected
//! topologies: estimates stay inside the unit interval, certainty and
//! impossibility are exact at the reliability extremes, success counts
//! never exceed the trial budget, and parallel execution is deterministic
//! for a fixed seed. Traversal order-independence is checked by permuting
//! edge lists together with their working overlays.

use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};

use super::*;
use crate::{
    test_utils::{connected_topology, suite_proptest_config},
    topology::TopologyBuilder,
    traversal::mark_reachable_with,
};

fn estimator(trials: usize, execution: TrialExecution) -> Estimator {
    EstimatorBuilder::new()
        .with_trials(trials)
        .with_execution(execution)
        .build()
        .expect("estimator configuration")
}

/// Edge lists without self-loops over a small node universe.
fn edge_list() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec(
        (0usize..12, 0usize..12).prop_filter("no self-loops", |(first, second)| first != second),
        1..32,
    )
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn estimates_stay_within_the_unit_interval(
        seed in any::<u64>(),
        nodes in 2usize..20,
        reliability in 0.0f64..=1.0,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut topology = connected_topology(nodes, reliability, &mut rng);
        let estimate = estimator(200, TrialExecution::Sequential)
            .estimate(&mut topology, &mut rng)
            .expect("terminals are in range");
        prop_assert!((0.0..=1.0).contains(&estimate.two_terminal()));
        prop_assert!((0.0..=1.0).contains(&estimate.all_terminal()));
        // Reaching every node implies reaching the sink, trial by trial.
        prop_assert!(estimate.all_terminal_successes() <= estimate.two_terminal_successes());
    }

    #[test]
    fn certain_edges_make_connected_topologies_certain(
        seed in any::<u64>(),
        nodes in 2usize..20,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut topology = connected_topology(nodes, 1.0, &mut rng);
        let estimate = estimator(50, TrialExecution::Sequential)
            .estimate(&mut topology, &mut rng)
            .expect("terminals are in range");
        prop_assert_eq!(estimate.two_terminal(), 1.0);
        prop_assert_eq!(estimate.all_terminal(), 1.0);
    }

    #[test]
    fn dead_edges_never_connect_distinct_terminals(
        seed in any::<u64>(),
        nodes in 2usize..20,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut topology = connected_topology(nodes, 0.0, &mut rng);
        let estimate = estimator(50, TrialExecution::Sequential)
            .estimate(&mut topology, &mut rng)
            .expect("terminals are in range");
        prop_assert_eq!(estimate.two_terminal(), 0.0);
        prop_assert_eq!(estimate.all_terminal(), 0.0);
    }

    #[test]
    fn success_counts_never_exceed_the_trial_budget(
        seed in any::<u64>(),
        nodes in 2usize..12,
        reliability in 0.0f64..=1.0,
        trials in 1usize..400,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut topology = connected_topology(nodes, reliability, &mut rng);
        let estimate = estimator(trials, TrialExecution::Sequential)
            .estimate(&mut topology, &mut rng)
            .expect("terminals are in range");
        let budget = trials as u64;
        prop_assert!(estimate.two_terminal_successes() <= budget);
        prop_assert!(estimate.all_terminal_successes() <= budget);
    }

    #[test]
    fn parallel_estimation_is_deterministic_for_a_seed(
        seed in any::<u64>(),
        nodes in 2usize..12,
    ) {
        let run = || {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut topology = connected_topology(nodes, 0.6, &mut rng);
            estimator(400, TrialExecution::Parallel)
                .estimate(&mut topology, &mut rng)
                .expect("terminals are in range")
        };
        prop_assert_eq!(run(), run());
    }

    #[test]
    fn reachability_is_stable_under_edge_permutation(
        (edges, working, seed) in edge_list().prop_flat_map(|edges| {
            let len = edges.len();
            (
                Just(edges),
                prop::collection::vec(any::<bool>(), len),
                any::<u64>(),
            )
        }),
    ) {
        let build = |pairs: &[(usize, usize)]| {
            let mut builder = TopologyBuilder::new();
            for &(first, second) in pairs {
                builder = builder.with_edge(first, second, 0.5);
            }
            builder.build().expect("edges are valid")
        };
        let visit = |pairs: &[(usize, usize)], overlay: &[bool]| {
            let topology = build(pairs);
            let mut visited = vec![false; topology.node_count()];
            mark_reachable_with(&topology, overlay, 0, &mut visited);
            visited
        };

        let baseline = visit(&edges, &working);

        let mut permutation: Vec<usize> = (0..edges.len()).collect();
        permutation.shuffle(&mut SmallRng::seed_from_u64(seed));
        let permuted_edges: Vec<_> = permutation.iter().map(|&index| edges[index]).collect();
        let permuted_working: Vec<_> = permutation.iter().map(|&index| working[index]).collect();

        prop_assert_eq!(visit(&permuted_edges, &permuted_working), baseline);
    }
}
