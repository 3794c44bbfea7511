//! Command implementations and argument parsing for the relnet CLI.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::{SeedableRng, rngs::SmallRng};
use relnet_core::{
    EstimateError, EstimatorBuilder, PercolationSweep, ReliabilityEstimate, ReliabilitySurface,
    Topology, TopologyError, TrialExecution,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_TRIALS: usize = 10_000;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "relnet", about = "Estimate network reliability with Monte Carlo trials.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Estimate two-terminal and all-terminal reliability for one topology.
    Estimate(EstimateCommand),
    /// Sweep estimation over a removal-fraction and reliability grid.
    Percolate(PercolateCommand),
}

/// Options accepted by the `estimate` command.
#[derive(Debug, Args, Clone)]
pub struct EstimateCommand {
    /// Path to the topology description file.
    pub topology: PathBuf,

    /// Number of Monte Carlo trials behind the estimate.
    #[arg(
        long,
        default_value_t = DEFAULT_TRIALS,
        value_parser = clap::value_parser!(usize),
    )]
    pub trials: usize,

    /// Seed for the random generator (a fresh one is drawn when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Trial scheduling strategy.
    #[arg(long, value_enum, default_value_t = ExecutionMode::Auto)]
    pub execution: ExecutionMode,

    /// Override every edge's reliability with one probability in [0, 1].
    #[arg(long, value_parser = parse_probability)]
    pub reliability: Option<f64>,
}

/// Options accepted by the `percolate` command.
#[derive(Debug, Args, Clone)]
pub struct PercolateCommand {
    /// Path to the topology description file.
    pub topology: PathBuf,

    /// Number of Monte Carlo trials behind each estimate.
    #[arg(
        long,
        default_value_t = DEFAULT_TRIALS,
        value_parser = clap::value_parser!(usize),
    )]
    pub trials: usize,

    /// Seed for the random generator (a fresh one is drawn when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Estimator runs averaged into each grid cell.
    #[arg(
        long,
        default_value = "10",
        value_parser = clap::value_parser!(NonZeroUsize),
    )]
    pub runs: NonZeroUsize,

    /// Increment of the reliability axis, in (0, 1].
    #[arg(
        long = "reliability-step",
        default_value_t = PercolationSweep::DEFAULT_RELIABILITY_STEP,
        value_parser = clap::value_parser!(f64),
    )]
    pub reliability_step: f64,

    /// Write the surface to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Trial scheduling strategy.
    #[arg(long, value_enum, default_value_t = ExecutionMode::Auto)]
    pub execution: ExecutionMode,
}

/// Trial scheduling strategies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExecutionMode {
    /// Choose sequential or parallel execution from the batch size.
    Auto,
    /// Run every trial on the calling thread.
    Sequential,
    /// Partition trials across the rayon worker pool.
    Parallel,
}

impl From<ExecutionMode> for TrialExecution {
    fn from(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Auto => Self::Auto,
            ExecutionMode::Sequential => Self::Sequential,
            ExecutionMode::Parallel => Self::Parallel,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input source.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Writing the surface output file failed.
    #[error("failed to write `{path}`: {source}")]
    Output {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Loading the topology description failed.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// Configuring or running the estimation failed.
    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

impl CliError {
    /// Stable machine-readable code for variants backed by library errors.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Topology(error) => Some(error.code().as_str()),
            Self::Estimate(error) => Some(error.code().as_str()),
            Self::Io { .. } | Self::Output { .. } => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Outcome of the `estimate` command.
    Estimate(EstimateSummary),
    /// Outcome of the `percolate` command.
    Surface(SurfaceSummary),
}

/// Reliability metrics reported by the `estimate` command.
#[derive(Debug, Clone)]
pub struct EstimateSummary {
    /// Name derived from the topology file.
    pub topology: String,
    /// Number of edges in the loaded topology.
    pub edges: usize,
    /// Number of nodes in the loaded topology.
    pub nodes: usize,
    /// Trials behind the estimate.
    pub trials: usize,
    /// Estimated reliability metrics.
    pub estimate: ReliabilityEstimate,
}

/// Surface produced by the `percolate` command.
#[derive(Debug, Clone)]
pub struct SurfaceSummary {
    /// Name derived from the topology file.
    pub topology: String,
    /// The estimated reliability surface.
    pub surface: ReliabilitySurface,
    /// Where the surface was written, when `--output` was given.
    pub output: Option<PathBuf>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading or estimation fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use relnet_cli::cli::{Cli, Command, EstimateCommand, ExecutionMode, ExecutionSummary, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "type: edges\nstart: 0\nend: 1\nprob: 1.0\n0 1\n")?;
/// let cli = Cli {
///     command: Command::Estimate(EstimateCommand {
///         topology: file.path().to_path_buf(),
///         trials: 100,
///         seed: Some(7),
///         execution: ExecutionMode::Sequential,
///         reliability: None,
///     }),
/// };
/// let ExecutionSummary::Estimate(summary) = run_cli(cli)? else {
///     unreachable!("estimate commands produce estimate summaries");
/// };
/// assert_eq!(summary.estimate.two_terminal(), 1.0);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Estimate(command) => {
            Span::current().record("command", field::display("estimate"));
            run_estimate(command)
        }
        Command::Percolate(command) => {
            Span::current().record("command", field::display("percolate"));
            run_percolate(command)
        }
    }
}

#[instrument(
    name = "cli.estimate",
    err,
    skip(command),
    fields(path = field::Empty, trials = field::Empty, execution = field::Empty),
)]
pub(super) fn run_estimate(command: EstimateCommand) -> Result<ExecutionSummary, CliError> {
    let EstimateCommand {
        topology: path,
        trials,
        seed,
        execution,
        reliability,
    } = command;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("trials", field::display(trials));
    span.record("execution", field::debug(execution));

    let estimator = EstimatorBuilder::new()
        .with_trials(trials)
        .with_execution(execution.into())
        .build()?;
    let mut topology = load_topology(&path)?;
    if let Some(reliability) = reliability {
        topology.set_uniform_reliability(reliability);
    }
    let mut rng = build_rng(seed);
    let estimate = estimator.estimate(&mut topology, &mut rng)?;
    info!(
        topology = topology.name(),
        two_terminal = estimate.two_terminal(),
        all_terminal = estimate.all_terminal(),
        "estimate completed"
    );
    Ok(ExecutionSummary::Estimate(EstimateSummary {
        topology: topology.name().to_owned(),
        edges: topology.edge_count(),
        nodes: topology.node_count(),
        trials,
        estimate,
    }))
}

#[instrument(
    name = "cli.percolate",
    err,
    skip(command),
    fields(path = field::Empty, trials = field::Empty, runs = field::Empty),
)]
pub(super) fn run_percolate(command: PercolateCommand) -> Result<ExecutionSummary, CliError> {
    let PercolateCommand {
        topology: path,
        trials,
        seed,
        runs,
        reliability_step,
        output,
        execution,
    } = command;
    let span = Span::current();
    span.record("path", field::display(path.display()));
    span.record("trials", field::display(trials));
    span.record("runs", field::display(runs));

    let estimator = EstimatorBuilder::new()
        .with_trials(trials)
        .with_execution(execution.into())
        .build()?;
    let sweep = PercolationSweep::new(estimator)
        .with_runs(runs)
        .with_reliability_step(reliability_step);
    let mut topology = load_topology(&path)?;
    let mut rng = build_rng(seed);
    let surface = sweep.run(&mut topology, &mut rng)?;
    if let Some(path) = &output {
        write_surface(path, &surface)?;
    }
    info!(
        topology = topology.name(),
        rows = surface.removal_steps(),
        columns = surface.reliability_steps(),
        "percolation completed"
    );
    Ok(ExecutionSummary::Surface(SurfaceSummary {
        topology: topology.name().to_owned(),
        surface,
        output,
    }))
}

#[instrument(name = "cli.load_topology", err, fields(path = field::Empty))]
pub(super) fn load_topology(path: &Path) -> Result<Topology, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let topology = Topology::from_reader(derive_topology_name(path), BufReader::new(file))?;
    Ok(topology)
}

#[instrument(name = "cli.write_surface", err, skip(surface), fields(path = field::Empty))]
pub(super) fn write_surface(path: &Path, surface: &ReliabilitySurface) -> Result<(), CliError> {
    Span::current().record("path", field::display(path.display()));
    let map_write = |source| CliError::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(map_write)?;
    let mut writer = BufWriter::new(file);
    render_surface(surface, &mut writer).map_err(map_write)?;
    writer.flush().map_err(map_write)?;
    info!(
        path = %path.display(),
        rows = surface.removal_steps(),
        "surface written"
    );
    Ok(())
}

pub(super) fn derive_topology_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "topology".to_owned())
}

fn build_rng(seed: Option<u64>) -> SmallRng {
    seed.map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64)
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside [0, 1]"))
    }
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Estimate summaries render as labelled lines; surface summaries render the
/// grid unless the sweep already wrote it to a file, in which case a single
/// confirmation line is emitted.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::io::Cursor;
/// # use rand::{SeedableRng, rngs::SmallRng};
/// # use relnet_cli::cli::{EstimateSummary, ExecutionSummary, render_summary};
/// # use relnet_core::{EstimatorBuilder, TopologyBuilder};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let mut topology = TopologyBuilder::new()
///     .with_terminals(0, 1)
///     .with_edge(0, 1, 1.0)
///     .build()?;
/// let estimator = EstimatorBuilder::new().with_trials(10).build()?;
/// let mut rng = SmallRng::seed_from_u64(1);
/// let estimate = estimator.estimate(&mut topology, &mut rng)?;
/// let summary = ExecutionSummary::Estimate(EstimateSummary {
///     topology: "demo".into(),
///     edges: 1,
///     nodes: 2,
///     trials: 10,
///     estimate,
/// });
/// let mut buffer = Cursor::new(Vec::new());
/// render_summary(&summary, &mut buffer)?;
/// let text = String::from_utf8(buffer.into_inner())?;
/// assert!(text.contains("two-terminal: 1.000000"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Estimate(summary) => {
            writeln!(writer, "topology: {}", summary.topology)?;
            writeln!(writer, "edges: {}", summary.edges)?;
            writeln!(writer, "nodes: {}", summary.nodes)?;
            writeln!(writer, "trials: {}", summary.trials)?;
            writeln!(writer, "two-terminal: {:.6}", summary.estimate.two_terminal())?;
            writeln!(writer, "all-terminal: {:.6}", summary.estimate.all_terminal())?;
            Ok(())
        }
        ExecutionSummary::Surface(summary) => match &summary.output {
            Some(path) => writeln!(writer, "surface written to {}", path.display()),
            None => render_surface(&summary.surface, writer),
        },
    }
}

/// Renders the surface as one line per removal step, cells separated by
/// single spaces.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_surface(surface: &ReliabilitySurface, mut writer: impl Write) -> io::Result<()> {
    for row in surface.rows() {
        for (index, cell) in row.iter().enumerate() {
            if index > 0 {
                write!(writer, " ")?;
            }
            write!(writer, "{cell:.6}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
