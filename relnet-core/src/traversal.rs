//! Reachability traversal over working edges.
//!
//! Connectivity is flooded from a start node with an explicit work-list
//! stack, so traversal depth is bounded by memory rather than the call
//! stack. Failed and permanently removed edges are equally non-working; the
//! set of marked nodes never depends on the order edges are visited in.

use crate::topology::Topology;

/// Marks every node reachable from `start` through currently working edges.
///
/// `visited` is the caller's scratch buffer, sized to the topology's node
/// count and all `false` on entry; reachable nodes (including `start`) are
/// marked `true`. Nodes in disconnected components and isolated nodes stay
/// unmarked.
///
/// # Panics
/// Panics when `start` or an edge endpoint lies outside `visited`. Both are
/// internal-consistency faults: the estimator validates terminals before
/// traversing, and topology construction keeps endpoints inside the dense
/// node range.
pub fn mark_reachable(topology: &Topology, start: usize, visited: &mut [bool]) {
    flood(topology, start, visited, |index| {
        topology.edges()[index].is_working()
    });
}

/// As [`mark_reachable`], but consults a caller-supplied per-edge working
/// overlay instead of the shared edge state. Parallel estimation hands each
/// worker its own overlay so the topology itself stays read-only.
pub(crate) fn mark_reachable_with(
    topology: &Topology,
    working: &[bool],
    start: usize,
    visited: &mut [bool],
) {
    flood(topology, start, visited, |index| working[index]);
}

fn flood<F>(topology: &Topology, start: usize, visited: &mut [bool], edge_working: F)
where
    F: Fn(usize) -> bool,
{
    debug_assert_eq!(visited.len(), topology.node_count());
    visited[start] = true;
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        for &index in topology.adjacent(node) {
            if !edge_working(index) {
                continue;
            }
            // Nodes are marked before they are pushed, so each node enters
            // the stack at most once and cycles cannot loop.
            let (first, second) = topology.edges()[index].endpoints();
            if !visited[first] {
                visited[first] = true;
                stack.push(first);
            }
            if !visited[second] {
                visited[second] = true;
                stack.push(second);
            }
        }
    }
}
