//! Network topology: the owning edge collection and its adjacency index.
//!
//! A [`Topology`] owns every [`Edge`] in insertion order and keeps an index
//! from each node id to the edges touching it, so traversal never chases
//! ownership links. Node ids are dense: the range `[0, max_node_id]` is the
//! whole universe, and ids never mentioned by an edge are legal isolated
//! nodes. Mutation during estimation touches edge state only; the edge
//! vector itself is reallocated exclusively by [`Topology::add_edge`] and
//! [`Topology::clear`].

mod parse;
#[cfg(test)]
mod tests;

use std::io::BufRead;

use rand::{Rng, rngs::SmallRng};
use tracing::{debug, info};

use crate::{
    edge::{Edge, clamp_unit},
    error::TopologyError,
};

/// An undirected network whose edges fail independently.
///
/// # Examples
/// ```
/// use relnet_core::TopologyBuilder;
///
/// let topology = TopologyBuilder::new()
///     .with_terminals(0, 2)
///     .with_edge(0, 1, 0.9)
///     .with_edge(1, 2, 0.9)
///     .build()
///     .expect("valid topology");
/// assert_eq!(topology.edge_count(), 2);
/// assert_eq!(topology.node_count(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Topology {
    name: String,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<usize>>,
    max_node_id: usize,
    source: usize,
    sink: usize,
}

impl Topology {
    /// Loads a topology from its text description.
    ///
    /// The format is line oriented, in order: a `type: edges` header,
    /// `start:` and `end:` terminal ids, a `prob:` baseline reliability,
    /// then one edge per line as two whitespace-separated node ids. Blank
    /// lines are skipped. Terminals are accepted as written here and only
    /// validated against the node range when an estimate runs.
    ///
    /// # Errors
    /// Returns a [`TopologyError`] when the description is structurally
    /// invalid, declares no edges, or cannot be read. No partial topology
    /// escapes a failed load.
    ///
    /// # Examples
    /// ```
    /// use relnet_core::Topology;
    ///
    /// let text = "type: edges\nstart: 0\nend: 2\nprob: 0.9\n0 1\n1 2\n";
    /// let topology = Topology::from_reader("triangle", text.as_bytes())
    ///     .expect("valid description");
    /// assert_eq!(topology.source(), 0);
    /// assert_eq!(topology.sink(), 2);
    /// ```
    pub fn from_reader(
        name: impl Into<String>,
        reader: impl BufRead,
    ) -> Result<Self, TopologyError> {
        let parsed = parse::parse_topology(reader)?;
        let mut builder = Self::builder()
            .with_name(name)
            .with_terminals(parsed.source, parsed.sink);
        for (first, second) in parsed.edges {
            builder = builder.with_edge(first, second, parsed.reliability);
        }
        let topology = builder.build()?;
        info!(
            topology = %topology.name,
            edges = topology.edge_count(),
            nodes = topology.node_count(),
            "loaded topology"
        );
        Ok(topology)
    }

    /// Starts a programmatic topology description.
    #[must_use]
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::new()
    }

    /// Returns the display name used in spans and summaries.
    #[rustfmt::skip]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Returns how many edges the topology owns.
    #[rustfmt::skip]
    #[must_use]
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Returns the size of the dense node id range.
    #[rustfmt::skip]
    #[must_use]
    pub fn node_count(&self) -> usize { self.max_node_id + 1 }

    /// Returns the highest node id in the dense range.
    #[rustfmt::skip]
    #[must_use]
    pub fn max_node_id(&self) -> usize { self.max_node_id }

    /// Returns the source terminal for two-terminal reliability.
    #[rustfmt::skip]
    #[must_use]
    pub fn source(&self) -> usize { self.source }

    /// Returns the sink terminal for two-terminal reliability.
    #[rustfmt::skip]
    #[must_use]
    pub fn sink(&self) -> usize { self.sink }

    /// Returns the edges in insertion order; positions are the edge ids the
    /// adjacency index refers to.
    #[rustfmt::skip]
    #[must_use]
    pub fn edges(&self) -> &[Edge] { &self.edges }

    pub(crate) fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Returns the indices of the edges touching `node`, or an empty slice
    /// for ids outside the dense range.
    #[must_use]
    pub fn adjacent(&self, node: usize) -> &[usize] {
        self.adjacency.get(node).map_or(&[], Vec::as_slice)
    }

    /// Sets every edge's survival probability, clamped into `[0, 1]`.
    pub fn set_uniform_reliability(&mut self, reliability: f64) {
        for edge in &mut self.edges {
            edge.set_reliability(reliability);
        }
    }

    /// Permanently removes a fraction of the edges, chosen uniformly at
    /// random, and returns how many edges this call removed.
    ///
    /// All edges are reset first (previously removed edges stay removed and
    /// do not count towards this call's quota). The quota is
    /// `floor(fraction * edge_count)` after clamping `fraction` into
    /// `[0, 1]`; candidates are drawn by rejection, so fractions at or near
    /// one degenerate into long rejection runs. That behaviour is part of
    /// the percolation model this engine reproduces.
    pub fn disable_fraction(&mut self, fraction: f64, rng: &mut SmallRng) -> usize {
        self.reset_all();
        let edge_count = self.edges.len();
        if edge_count == 0 {
            return 0;
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss,
            reason = "clamped fraction times edge count fits usize"
        )]
        let quota = (clamp_unit(fraction) * edge_count as f64).floor() as usize;
        let mut removed = 0;
        while removed < quota {
            let candidate = rng.gen_range(0..edge_count);
            let edge = &mut self.edges[candidate];
            if !edge.is_removed() {
                edge.disable();
                removed += 1;
            }
        }
        debug!(requested = fraction, removed, "disabled edge fraction");
        removed
    }

    /// Resets every edge for the next trial; removed edges stay removed.
    pub fn reset_all(&mut self) {
        for edge in &mut self.edges {
            edge.reset();
        }
    }

    /// Returns every edge to its as-loaded condition, clearing removals.
    pub fn hard_reset_all(&mut self) {
        for edge in &mut self.edges {
            edge.hard_reset();
        }
    }

    /// Appends a validated edge and rebuilds the adjacency index.
    ///
    /// # Errors
    /// Returns [`TopologyError::SelfLoop`] or
    /// [`TopologyError::InvalidReliability`] without modifying the topology.
    pub fn add_edge(
        &mut self,
        first: usize,
        second: usize,
        reliability: f64,
    ) -> Result<(), TopologyError> {
        let edge = Edge::new(first, second, reliability)?;
        self.max_node_id = self.max_node_id.max(first).max(second);
        self.edges.push(edge);
        self.rebuild_adjacency();
        Ok(())
    }

    /// Releases every edge, discards the index, and shrinks the node range
    /// back to the single id `0`. Terminals are kept as configured.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.max_node_id = 0;
        self.rebuild_adjacency();
    }

    fn rebuild_adjacency(&mut self) {
        self.adjacency.clear();
        self.adjacency.resize(self.max_node_id + 1, Vec::new());
        for (index, edge) in self.edges.iter().enumerate() {
            let (first, second) = edge.endpoints();
            self.adjacency[first].push(index);
            self.adjacency[second].push(index);
        }
    }
}

/// Assembles a [`Topology`] from programmatic parts.
///
/// Edge arguments are recorded as given and validated in [`Self::build`],
/// so description chains stay infallible until the end.
///
/// # Examples
/// ```
/// use relnet_core::TopologyBuilder;
///
/// // Two declared nodes, no edges: a legal, permanently split network.
/// let topology = TopologyBuilder::new()
///     .with_node_count(2)
///     .with_terminals(0, 1)
///     .build()
///     .expect("valid topology");
/// assert_eq!(topology.edge_count(), 0);
/// assert_eq!(topology.node_count(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct TopologyBuilder {
    name: String,
    source: usize,
    sink: usize,
    node_count: usize,
    edges: Vec<EdgeSpec>,
}

#[derive(Clone, Copy, Debug)]
struct EdgeSpec {
    first: usize,
    second: usize,
    reliability: f64,
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self {
            name: String::from("topology"),
            source: 0,
            sink: 0,
            node_count: 0,
            edges: Vec::new(),
        }
    }
}

impl TopologyBuilder {
    /// Creates a builder with no edges, terminals at node `0`, and the
    /// default name `topology`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the source and sink terminals.
    #[must_use]
    pub fn with_terminals(mut self, source: usize, sink: usize) -> Self {
        self.source = source;
        self.sink = sink;
        self
    }

    /// Widens the dense node range to at least `node_count` ids, so isolated
    /// nodes and zero-edge networks are expressible.
    #[must_use]
    pub fn with_node_count(mut self, node_count: usize) -> Self {
        self.node_count = node_count;
        self
    }

    /// Records an edge between `first` and `second` with the given survival
    /// probability. Validation happens in [`Self::build`].
    #[must_use]
    pub fn with_edge(mut self, first: usize, second: usize, reliability: f64) -> Self {
        self.edges.push(EdgeSpec {
            first,
            second,
            reliability,
        });
        self
    }

    /// Validates the recorded description and assembles the topology.
    ///
    /// # Errors
    /// Returns [`TopologyError::SelfLoop`] or
    /// [`TopologyError::InvalidReliability`] for the first offending edge.
    pub fn build(self) -> Result<Topology, TopologyError> {
        let mut edges = Vec::with_capacity(self.edges.len());
        let mut max_node_id = self.node_count.saturating_sub(1);
        for spec in self.edges {
            let edge = Edge::new(spec.first, spec.second, spec.reliability)?;
            max_node_id = max_node_id.max(spec.first).max(spec.second);
            edges.push(edge);
        }
        let mut topology = Topology {
            name: self.name,
            edges,
            adjacency: Vec::new(),
            max_node_id,
            source: self.source,
            sink: self.sink,
        };
        topology.rebuild_adjacency();
        Ok(topology)
    }
}
