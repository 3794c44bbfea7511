//! Monte-Carlo reliability estimation.
//!
//! Provides the [`Estimator`] entry point: a configured batch of independent
//! trials producing two-terminal and all-terminal reliability in one pass.
//! Trials either run sequentially against shared edge state or are
//! partitioned across the rayon pool with worker-private scratch and
//! independently seeded generators.

#[cfg(test)]
mod property;

use std::num::NonZeroUsize;

use rand::{Rng, SeedableRng, distributions::Standard, rngs::SmallRng};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::{
    edge::Edge,
    error::{EstimateError, Result},
    topology::Topology,
    traversal::{mark_reachable, mark_reachable_with},
};

/// Trials below this stay sequential when execution resolves automatically.
const PARALLEL_TRIAL_THRESHOLD: usize = 10_000;

const WORKER_SEED_SPACING: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

/// Indicates how [`Estimator::estimate`] schedules its trials.
///
/// `Auto` resolves deterministically: trials run in parallel once the batch
/// is large enough to amortise worker startup and the rayon pool has more
/// than one thread, and sequentially otherwise.
///
/// # Examples
/// ```
/// use relnet_core::TrialExecution;
///
/// let execution = TrialExecution::Auto;
/// assert!(matches!(execution, TrialExecution::Auto));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialExecution {
    /// Pick sequential or parallel execution from the batch size and pool.
    Auto,
    /// Run every trial on the calling thread against shared edge state.
    Sequential,
    /// Partition trials across the rayon pool with worker-private state.
    Parallel,
}

/// Configures and constructs [`Estimator`] instances.
///
/// # Examples
/// ```
/// use relnet_core::{EstimatorBuilder, TrialExecution};
///
/// let estimator = EstimatorBuilder::new()
///     .with_trials(50_000)
///     .with_execution(TrialExecution::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(estimator.trials().get(), 50_000);
/// assert_eq!(estimator.execution(), TrialExecution::Sequential);
/// ```
#[derive(Debug, Clone)]
pub struct EstimatorBuilder {
    trials: usize,
    execution: TrialExecution,
}

impl Default for EstimatorBuilder {
    fn default() -> Self {
        Self {
            trials: 10_000,
            execution: TrialExecution::Auto,
        }
    }
}

impl EstimatorBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use relnet_core::{EstimatorBuilder, TrialExecution};
    ///
    /// let builder = EstimatorBuilder::new();
    /// assert_eq!(builder.trials(), 10_000);
    /// assert_eq!(builder.execution(), TrialExecution::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of trials per estimation batch.
    #[must_use]
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Returns the configured trial count.
    #[rustfmt::skip]
    #[must_use]
    pub fn trials(&self) -> usize { self.trials }

    /// Sets how trials are scheduled.
    #[must_use]
    pub fn with_execution(mut self, execution: TrialExecution) -> Self {
        self.execution = execution;
        self
    }

    /// Returns the configured execution mode.
    #[rustfmt::skip]
    #[must_use]
    pub fn execution(&self) -> TrialExecution { self.execution }

    /// Validates the configuration and constructs an [`Estimator`].
    ///
    /// # Errors
    /// Returns [`EstimateError::InvalidTrialCount`] when the trial count is
    /// zero.
    pub fn build(self) -> Result<Estimator> {
        let trials = NonZeroUsize::new(self.trials)
            .ok_or(EstimateError::InvalidTrialCount { got: self.trials })?;
        Ok(Estimator::new(trials, self.execution))
    }
}

/// Entry point for running reliability trials against a [`Topology`].
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use relnet_core::{EstimatorBuilder, TopologyBuilder};
///
/// let mut topology = TopologyBuilder::new()
///     .with_terminals(0, 1)
///     .with_edge(0, 1, 1.0)
///     .build()
///     .expect("topology is valid");
/// let estimator = EstimatorBuilder::new()
///     .with_trials(100)
///     .build()
///     .expect("configuration is valid");
/// let mut rng = SmallRng::seed_from_u64(1);
/// let estimate = estimator
///     .estimate(&mut topology, &mut rng)
///     .expect("terminals are in range");
/// assert_eq!(estimate.two_terminal(), 1.0);
/// assert_eq!(estimate.all_terminal(), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Estimator {
    trials: NonZeroUsize,
    execution: TrialExecution,
}

impl Estimator {
    pub(crate) fn new(trials: NonZeroUsize, execution: TrialExecution) -> Self {
        Self { trials, execution }
    }

    /// Returns the number of trials per estimation batch.
    #[must_use]
    pub fn trials(&self) -> NonZeroUsize {
        self.trials
    }

    /// Returns the configured execution mode.
    #[must_use]
    pub fn execution(&self) -> TrialExecution {
        self.execution
    }

    /// Runs one batch of trials and reports both reliability metrics.
    ///
    /// Each trial resets the edges (permanent removals stay in force), draws
    /// one uniform `[0, 1)` sample per edge, fails edges whose sample
    /// exceeds their reliability, and floods connectivity from the source.
    /// The trial counts towards two-terminal reliability when the sink is
    /// reached and towards all-terminal reliability when every node is.
    ///
    /// Sequential execution leaves working states as the final trial set
    /// them; parallel execution samples worker-private copies and leaves the
    /// shared edge state untouched. Removal markers always survive.
    ///
    /// # Errors
    /// Returns [`EstimateError::InvalidEndpoint`] before any trial runs when
    /// a terminal lies outside the dense node range.
    pub fn estimate(
        &self,
        topology: &mut Topology,
        rng: &mut SmallRng,
    ) -> Result<ReliabilityEstimate> {
        let edges = topology.edge_count();
        self.estimate_counted(topology, rng, edges)
    }

    #[instrument(
        name = "core.estimate",
        err,
        skip(self, topology, rng),
        fields(
            topology = %topology.name(),
            edges = edges,
            trials = %self.trials,
            execution = ?self.execution
        ),
    )]
    fn estimate_counted(
        &self,
        topology: &mut Topology,
        rng: &mut SmallRng,
        edges: usize,
    ) -> Result<ReliabilityEstimate> {
        validate_terminals(topology)?;
        if edges == 0 {
            warn!(
                topology = topology.name(),
                "topology has no edges, reporting degenerate estimate"
            );
            return Ok(ReliabilityEstimate::degenerate(self.trials, topology));
        }
        let counts = if self.resolve_parallel() {
            run_parallel(self.trials.get(), topology, rng)
        } else {
            run_sequential(self.trials.get(), topology, rng)
        };
        let estimate = ReliabilityEstimate::new(self.trials, counts);
        info!(
            two_terminal = estimate.two_terminal(),
            all_terminal = estimate.all_terminal(),
            "estimation completed"
        );
        Ok(estimate)
    }

    fn resolve_parallel(&self) -> bool {
        match self.execution {
            TrialExecution::Sequential => false,
            TrialExecution::Parallel => true,
            TrialExecution::Auto => {
                self.trials.get() >= PARALLEL_TRIAL_THRESHOLD
                    && rayon::current_num_threads() > 1
            }
        }
    }
}

/// Both reliability metrics from one batch of trials.
///
/// Success counts stay integral so merging parallel chunks is exact; the
/// ratios divide on demand and always lie in `[0, 1]`.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use relnet_core::{EstimatorBuilder, TopologyBuilder};
///
/// let mut topology = TopologyBuilder::new()
///     .with_terminals(0, 2)
///     .with_edge(0, 1, 0.9)
///     .with_edge(1, 2, 0.9)
///     .with_edge(2, 0, 0.9)
///     .build()
///     .expect("topology is valid");
/// let estimator = EstimatorBuilder::new().build().expect("configuration is valid");
/// let mut rng = SmallRng::seed_from_u64(7);
/// let estimate = estimator
///     .estimate(&mut topology, &mut rng)
///     .expect("terminals are in range");
/// assert!((0.0..=1.0).contains(&estimate.two_terminal()));
/// assert!(estimate.two_terminal() >= estimate.all_terminal());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReliabilityEstimate {
    trials: NonZeroUsize,
    two_terminal_successes: u64,
    all_terminal_successes: u64,
}

impl ReliabilityEstimate {
    fn new(trials: NonZeroUsize, counts: TrialCounts) -> Self {
        Self {
            trials,
            two_terminal_successes: counts.two_terminal,
            all_terminal_successes: counts.all_terminal,
        }
    }

    /// The zero-edge estimate: connectivity is a property of the node set
    /// alone, so no sampling happens.
    fn degenerate(trials: NonZeroUsize, topology: &Topology) -> Self {
        let full = trials.get() as u64;
        Self {
            trials,
            two_terminal_successes: if topology.source() == topology.sink() {
                full
            } else {
                0
            },
            all_terminal_successes: if topology.node_count() <= 1 { full } else { 0 },
        }
    }

    /// Returns how many trials produced this estimate.
    #[rustfmt::skip]
    #[must_use]
    pub fn trials(&self) -> NonZeroUsize { self.trials }

    /// Returns how many trials kept source and sink connected.
    #[rustfmt::skip]
    #[must_use]
    pub fn two_terminal_successes(&self) -> u64 { self.two_terminal_successes }

    /// Returns how many trials kept every node mutually reachable.
    #[rustfmt::skip]
    #[must_use]
    pub fn all_terminal_successes(&self) -> u64 { self.all_terminal_successes }

    /// Returns the estimated two-terminal reliability.
    #[must_use]
    pub fn two_terminal(&self) -> f64 {
        ratio(self.two_terminal_successes, self.trials)
    }

    /// Returns the estimated all-terminal reliability.
    #[must_use]
    pub fn all_terminal(&self) -> f64 {
        ratio(self.all_terminal_successes, self.trials)
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "trial counts stay far below 2^53"
)]
fn ratio(successes: u64, trials: NonZeroUsize) -> f64 {
    successes as f64 / trials.get() as f64
}

#[derive(Clone, Copy, Debug, Default)]
struct TrialCounts {
    two_terminal: u64,
    all_terminal: u64,
}

impl TrialCounts {
    fn record(&mut self, visited: &[bool], sink: usize) {
        if visited[sink] {
            self.two_terminal += 1;
        }
        if visited.iter().all(|&marked| marked) {
            self.all_terminal += 1;
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            two_terminal: self.two_terminal + other.two_terminal,
            all_terminal: self.all_terminal + other.all_terminal,
        }
    }
}

fn validate_terminals(topology: &Topology) -> Result<()> {
    let max_node_id = topology.max_node_id();
    for node in [topology.source(), topology.sink()] {
        if node > max_node_id {
            return Err(EstimateError::InvalidEndpoint { node, max_node_id });
        }
    }
    Ok(())
}

fn run_sequential(trials: usize, topology: &mut Topology, rng: &mut SmallRng) -> TrialCounts {
    let source = topology.source();
    let sink = topology.sink();
    let mut visited = vec![false; topology.node_count()];
    let mut counts = TrialCounts::default();
    for _ in 0..trials {
        topology.reset_all();
        for edge in topology.edges_mut() {
            let draw: f64 = rng.sample(Standard);
            if draw > edge.reliability() {
                edge.set_working(false);
            }
        }
        visited.fill(false);
        mark_reachable(topology, source, &mut visited);
        counts.record(&visited, sink);
    }
    counts
}

fn run_parallel(trials: usize, topology: &Topology, rng: &mut SmallRng) -> TrialCounts {
    let workers = rayon::current_num_threads().max(1);
    let base_seed: u64 = rng.sample(Standard);
    let removed: Vec<bool> = topology.edges().iter().map(Edge::is_removed).collect();
    let reliabilities: Vec<f64> = topology.edges().iter().map(Edge::reliability).collect();
    partition_trials(trials, workers)
        .into_par_iter()
        .enumerate()
        .map(|(worker, chunk)| {
            let mut chunk_rng = SmallRng::seed_from_u64(mix_worker_seed(base_seed, worker));
            run_chunk(topology, &removed, &reliabilities, chunk, &mut chunk_rng)
        })
        .reduce(TrialCounts::default, TrialCounts::merge)
}

fn run_chunk(
    topology: &Topology,
    removed: &[bool],
    reliabilities: &[f64],
    trials: usize,
    rng: &mut SmallRng,
) -> TrialCounts {
    let source = topology.source();
    let sink = topology.sink();
    let mut working = vec![false; reliabilities.len()];
    let mut visited = vec![false; topology.node_count()];
    let mut counts = TrialCounts::default();
    for _ in 0..trials {
        for (index, up) in working.iter_mut().enumerate() {
            // One draw per edge regardless of state, so the stream advances
            // identically whether or not removals are in force.
            let draw: f64 = rng.sample(Standard);
            *up = !removed[index] && draw <= reliabilities[index];
        }
        visited.fill(false);
        mark_reachable_with(topology, &working, source, &mut visited);
        counts.record(&visited, sink);
    }
    counts
}

/// Splits a trial batch into one contiguous chunk per worker; the first
/// `trials % workers` chunks carry the remainder.
fn partition_trials(trials: usize, workers: usize) -> Vec<usize> {
    let base = trials / workers;
    let extra = trials % workers;
    (0..workers)
        .map(|worker| base + usize::from(worker < extra))
        .collect()
}

/// Derives the seed for one worker's generator from the batch's base seed.
#[inline]
fn mix_worker_seed(base_seed: u64, worker_index: usize) -> u64 {
    splitmix64(base_seed ^ ((worker_index as u64 + 1).wrapping_mul(WORKER_SEED_SPACING)))
}

#[inline]
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(WORKER_SEED_SPACING);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}
