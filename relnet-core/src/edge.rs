//! Edge model for reliability estimation.
//!
//! An [`Edge`] joins two nodes and carries the probability that it survives a
//! single trial, together with a cost and a pheromone weight reserved for
//! route optimisation built on top of this engine. The working state is
//! tri-state so that a trial failure and a permanent percolation removal stay
//! distinguishable.

use crate::error::TopologyError;

/// Pheromone weight every edge starts with and returns to on reset.
pub const PHEROMONE_BASELINE: f64 = 1.0;

/// Cost assigned to edges whose description carries no explicit cost.
pub const DEFAULT_COST: f64 = 1.0;

/// Working state of an edge within the current trial.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LinkState {
    /// The edge conducts; traversal may cross it.
    Working,
    /// The edge failed its survival draw for this trial.
    Failed,
    /// The edge was permanently removed by a percolation step and stays down
    /// until a hard reset.
    Removed,
}

/// An undirected link between two nodes.
///
/// # Examples
/// ```
/// use relnet_core::Edge;
///
/// let edge = Edge::new(0, 1, 0.9).expect("valid edge");
/// assert_eq!(edge.endpoints(), (0, 1));
/// assert!(edge.is_working());
/// ```
#[derive(Clone, Debug)]
pub struct Edge {
    first: usize,
    second: usize,
    reliability: f64,
    baseline_reliability: f64,
    cost: f64,
    baseline_cost: f64,
    pheromone: f64,
    state: LinkState,
}

/// Clamps a probability into `[0, 1]`, mapping NaN to zero.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl Edge {
    /// Creates a working edge between two distinct nodes.
    ///
    /// # Errors
    /// Returns [`TopologyError::SelfLoop`] when both endpoints name the same
    /// node and [`TopologyError::InvalidReliability`] when the probability
    /// lies outside `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use relnet_core::{Edge, TopologyError};
    ///
    /// assert!(Edge::new(0, 1, 0.5).is_ok());
    /// assert!(matches!(Edge::new(2, 2, 0.5), Err(TopologyError::SelfLoop { node: 2 })));
    /// assert!(matches!(
    ///     Edge::new(0, 1, 1.5),
    ///     Err(TopologyError::InvalidReliability { .. })
    /// ));
    /// ```
    pub fn new(first: usize, second: usize, reliability: f64) -> Result<Self, TopologyError> {
        if first == second {
            return Err(TopologyError::SelfLoop { node: first });
        }
        if !(0.0..=1.0).contains(&reliability) {
            return Err(TopologyError::InvalidReliability { value: reliability });
        }
        Ok(Self {
            first,
            second,
            reliability,
            baseline_reliability: reliability,
            cost: DEFAULT_COST,
            baseline_cost: DEFAULT_COST,
            pheromone: PHEROMONE_BASELINE,
            state: LinkState::Working,
        })
    }

    /// Sets the carried cost, updating the baseline restored by resets.
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self.baseline_cost = cost;
        self
    }

    /// Prepares the edge for the next trial.
    ///
    /// Working state returns to [`LinkState::Working`] unless the edge is
    /// permanently removed; cost and pheromone return to their baselines.
    pub fn reset(&mut self) {
        if self.state != LinkState::Removed {
            self.state = LinkState::Working;
        }
        self.cost = self.baseline_cost;
        self.pheromone = PHEROMONE_BASELINE;
    }

    /// Returns the edge fully to its as-loaded condition, clearing any
    /// permanent removal and restoring the baseline reliability.
    pub fn hard_reset(&mut self) {
        self.state = LinkState::Working;
        self.reliability = self.baseline_reliability;
        self.cost = self.baseline_cost;
        self.pheromone = PHEROMONE_BASELINE;
    }

    /// Permanently removes the edge until the next [`Self::hard_reset`].
    pub fn disable(&mut self) {
        self.state = LinkState::Removed;
    }

    /// Records the outcome of this trial's survival draw.
    ///
    /// A removed edge stays removed; failure sampling never demotes the
    /// permanent marker to a transient one.
    pub fn set_working(&mut self, working: bool) {
        if self.state == LinkState::Removed {
            return;
        }
        self.state = if working {
            LinkState::Working
        } else {
            LinkState::Failed
        };
    }

    /// Reports whether traversal may cross this edge right now.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_working(&self) -> bool { self.state == LinkState::Working }

    /// Reports whether the edge is permanently removed.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_removed(&self) -> bool { self.state == LinkState::Removed }

    /// Returns the current working state.
    #[rustfmt::skip]
    #[must_use]
    pub fn state(&self) -> LinkState { self.state }

    /// Overwrites the survival probability, clamped into `[0, 1]`.
    ///
    /// The as-loaded baseline is untouched; [`Self::hard_reset`] restores it.
    pub fn set_reliability(&mut self, reliability: f64) {
        self.reliability = clamp_unit(reliability);
    }

    /// Returns the current survival probability.
    #[rustfmt::skip]
    #[must_use]
    pub fn reliability(&self) -> f64 { self.reliability }

    /// Returns the carried cost.
    #[rustfmt::skip]
    #[must_use]
    pub fn cost(&self) -> f64 { self.cost }

    /// Returns the pheromone weight.
    #[rustfmt::skip]
    #[must_use]
    pub fn pheromone(&self) -> f64 { self.pheromone }

    /// Overwrites the pheromone weight.
    pub fn set_pheromone(&mut self, pheromone: f64) {
        self.pheromone = pheromone;
    }

    /// Returns both endpoint node ids in construction order.
    #[rustfmt::skip]
    #[must_use]
    pub fn endpoints(&self) -> (usize, usize) { (self.first, self.second) }
}
