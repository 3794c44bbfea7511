//! Percolation sweep across forced removal and uniform reliability.
//!
//! A [`PercolationSweep`] walks a two-dimensional parameter grid: the
//! removal axis forces a growing fraction of edges out of the network for
//! good, and the reliability axis assigns every surviving edge the same
//! survival probability. Each grid cell averages the all-terminal estimate
//! of several independent estimator runs, which smooths the variance of the
//! random removal choice.

use std::num::NonZeroUsize;

use rand::rngs::SmallRng;
use tracing::{debug, info, instrument};

use crate::{
    error::{EstimateError, Result},
    estimator::Estimator,
    surface::{ReliabilitySurface, index_value},
    topology::Topology,
};


/// Sweeps reliability estimation over a removal-fraction and reliability
/// grid, producing a [`ReliabilitySurface`].
///
/// The removal axis always has one step per edge, so its increment is the
/// reciprocal of the edge count. The reliability axis covers `[0, 1)` in
/// increments of [`Self::reliability_step`].
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use relnet_core::{EstimatorBuilder, PercolationSweep, TopologyBuilder};
///
/// let mut topology = TopologyBuilder::new()
///     .with_terminals(0, 2)
///     .with_edge(0, 1, 0.9)
///     .with_edge(1, 2, 0.9)
///     .with_edge(0, 2, 0.9)
///     .build()?;
/// let estimator = EstimatorBuilder::new().with_trials(200).build()?;
/// let sweep = PercolationSweep::new(estimator)
///     .with_runs(NonZeroUsize::new(2).expect("run count is non-zero"))
///     .with_reliability_step(0.25);
/// let mut rng = SmallRng::seed_from_u64(7);
/// let surface = sweep.run(&mut topology, &mut rng)?;
/// assert_eq!(surface.removal_steps(), 3);
/// assert_eq!(surface.reliability_steps(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct PercolationSweep {
    estimator: Estimator,
    runs: NonZeroUsize,
    reliability_step: f64,
}

impl PercolationSweep {
    /// Default number of estimator runs averaged into each grid cell.
    pub const DEFAULT_RUNS: usize = 10;
    /// Default increment of the reliability axis.
    pub const DEFAULT_RELIABILITY_STEP: f64 = 0.05;

    /// Builds a sweep around an estimator with the default grid settings.
    #[must_use]
    pub fn new(estimator: Estimator) -> Self {
        let runs =
            NonZeroUsize::new(Self::DEFAULT_RUNS).expect("default run count must be non-zero");
        Self {
            estimator,
            runs,
            reliability_step: Self::DEFAULT_RELIABILITY_STEP,
        }
    }

    /// Sets how many estimator runs are averaged into each cell.
    #[must_use]
    pub fn with_runs(mut self, runs: NonZeroUsize) -> Self {
        self.runs = runs;
        self
    }

    /// Sets the reliability axis increment.
    ///
    /// The value is validated by [`Self::run`], which rejects steps outside
    /// `(0, 1]`.
    #[must_use]
    pub fn with_reliability_step(mut self, reliability_step: f64) -> Self {
        self.reliability_step = reliability_step;
        self
    }

    /// Returns the estimator used for every grid cell.
    #[rustfmt::skip]
    #[must_use]
    pub fn estimator(&self) -> &Estimator { &self.estimator }

    /// Returns how many estimator runs each cell averages.
    #[rustfmt::skip]
    #[must_use]
    pub fn runs(&self) -> NonZeroUsize { self.runs }

    /// Returns the configured reliability axis increment.
    #[rustfmt::skip]
    #[must_use]
    pub fn reliability_step(&self) -> f64 { self.reliability_step }

    /// Runs the full sweep over the topology.
    ///
    /// Every cell leaves the topology hard-reset, so after the sweep (or
    /// after a failed cell) the caller observes the topology in its
    /// as-loaded state.
    ///
    /// # Errors
    /// Returns [`EstimateError::InvalidReliabilityStep`] when the configured
    /// step lies outside `(0, 1]`, [`EstimateError::EmptyTopology`] when the
    /// topology has no edges to define the removal axis, and any error the
    /// underlying estimator reports for the topology.
    pub fn run(&self, topology: &mut Topology, rng: &mut SmallRng) -> Result<ReliabilitySurface> {
        validate_step(self.reliability_step)?;
        let edges = topology.edge_count();
        if edges == 0 {
            return Err(EstimateError::EmptyTopology);
        }
        let columns = axis_len(self.reliability_step);
        self.run_grid(topology, rng, edges, columns)
    }

    #[instrument(
        name = "core.percolate",
        err,
        skip(self, topology, rng),
        fields(
            topology = %topology.name(),
            removal_steps = edges,
            reliability_steps = columns,
            runs = %self.runs
        ),
    )]
    fn run_grid(
        &self,
        topology: &mut Topology,
        rng: &mut SmallRng,
        edges: usize,
        columns: usize,
    ) -> Result<ReliabilitySurface> {
        #[expect(clippy::cast_precision_loss, reason = "edge counts stay far below 2^53")]
        let removal_step = 1.0 / edges as f64;
        let mut values = Vec::with_capacity(edges * columns);
        for row in 0..edges {
            let removal_fraction = index_value(row, removal_step);
            for column in 0..columns {
                let reliability = index_value(column, self.reliability_step);
                values.push(self.cell_mean(topology, rng, removal_fraction, reliability)?);
            }
            debug!(row, removal_fraction, "removal row complete");
        }
        info!(cells = values.len(), "percolation sweep complete");
        Ok(ReliabilitySurface::from_values(
            values,
            columns,
            removal_step,
            self.reliability_step,
        ))
    }

    /// Averages the all-terminal estimate over the configured runs for one
    /// grid cell.
    fn cell_mean(
        &self,
        topology: &mut Topology,
        rng: &mut SmallRng,
        removal_fraction: f64,
        reliability: f64,
    ) -> Result<f64> {
        let mut total = 0.0;
        for _ in 0..self.runs.get() {
            topology.disable_fraction(removal_fraction, rng);
            topology.set_uniform_reliability(reliability);
            let outcome = self.estimator.estimate(topology, rng);
            // Reset on both success and error paths.
            topology.hard_reset_all();
            total += outcome?.all_terminal();
        }
        #[expect(clippy::cast_precision_loss, reason = "run counts stay far below 2^53")]
        Ok(total / self.runs.get() as f64)
    }
}

fn validate_step(step: f64) -> Result<()> {
    if step > 0.0 && step <= 1.0 {
        Ok(())
    } else {
        Err(EstimateError::InvalidReliabilityStep { got: step })
    }
}

/// Counts the axis indices whose value falls below one.
fn axis_len(step: f64) -> usize {
    let mut len = 0;
    while index_value(len, step) < 1.0 {
        len += 1;
    }
    len
}
