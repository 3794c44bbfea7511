//! Relnet core library.

mod edge;
mod error;
mod estimator;
mod surface;
mod sweep;
#[cfg(test)]
mod test_utils;
mod topology;
mod traversal;

pub use crate::{
    edge::{DEFAULT_COST, Edge, LinkState, PHEROMONE_BASELINE},
    error::{EstimateError, EstimateErrorCode, Result, TopologyError, TopologyErrorCode},
    estimator::{Estimator, EstimatorBuilder, ReliabilityEstimate, TrialExecution},
    surface::{ReliabilitySurface, SurfaceShapeError},
    sweep::PercolationSweep,
    topology::{Topology, TopologyBuilder},
    traversal::mark_reachable,
};
