//! Command-line interface orchestration for the relnet estimator.
//!
//! The CLI offers an `estimate` command that reports both reliability
//! metrics for one topology, and a `percolate` command that sweeps a removal
//! and reliability grid into a surface.

mod commands;

pub use commands::{
    Cli, CliError, Command, EstimateCommand, EstimateSummary, ExecutionMode, ExecutionSummary,
    PercolateCommand, SurfaceSummary, render_summary, render_surface, run_cli,
};
