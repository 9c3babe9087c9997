//! Command implementations and argument parsing for the topospine CLI.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use thiserror::Error;
use topospine_core::{
    DistanceMetric, GridShape, NeighborhoodPolicy, Polarity, SampleSet, SampleSetError, Stencil,
    TopoSpine, TopoSpineBuilder, TopoSpineError, TopologyReport,
};
use tracing::{Span, field, info, instrument};

const DEFAULT_RADIUS: usize = 1;
const DEFAULT_POINT_NEIGHBOURS: usize = 8;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "topospine", about = "Topological spines of sampled scalar fields.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Classify, simplify and lay out a scalar field.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Grid stencil radius; ignored when `--knn` is given.
    #[arg(long, default_value_t = DEFAULT_RADIUS)]
    pub radius: usize,

    /// Grid stencil shape.
    #[arg(long, value_enum, default_value_t = StencilArg::Box)]
    pub stencil: StencilArg,

    /// Use a k-nearest-neighbour graph with this many neighbours. Point
    /// sources default to 8.
    #[arg(long)]
    pub knn: Option<usize>,

    /// Distance metric for k-nearest-neighbour graphs.
    #[arg(long, value_enum, default_value_t = MetricArg::Euclidean)]
    pub metric: MetricArg,

    /// Cancel saddles with persistence strictly below this value.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Stop simplifying once at most this many extrema survive.
    #[arg(long)]
    pub target: Option<usize>,

    /// Which extrema to simplify.
    #[arg(long, value_enum, default_value_t = PolarityArg::Maxima)]
    pub polarity: PolarityArg,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Sample source.
    #[command(subcommand)]
    pub source: RunSource,
}

/// Input sources supported by `run`.
#[derive(Debug, Subcommand, Clone)]
pub enum RunSource {
    /// Whitespace-delimited rows of coordinates followed by the scalar value.
    Points(PointsArgs),
    /// Whitespace-delimited scalar values of a regular grid, first axis
    /// fastest.
    Grid(GridArgs),
}

/// Point file arguments.
#[derive(Debug, Args, Clone)]
pub struct PointsArgs {
    /// Path to the point file.
    pub path: PathBuf,

    /// Override name for the sample set (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Grid file arguments.
#[derive(Debug, Args, Clone)]
pub struct GridArgs {
    /// Path to the value file.
    pub path: PathBuf,

    /// Grid extents, first axis first (for example `--extents 64,48`).
    #[arg(long, value_delimiter = ',', required = true)]
    pub extents: Vec<usize>,

    /// Override name for the sample set (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Grid stencil choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StencilArg {
    /// Every cell within the radius on each axis.
    Box,
    /// Cells within the radius in Manhattan distance.
    Cross,
}

/// Distance metric choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Straight-line distance.
    Euclidean,
    /// Sum of absolute axis differences.
    Manhattan,
    /// Largest absolute axis difference.
    Chebyshev,
}

/// Polarity choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolarityArg {
    /// Simplify maxima (join tree).
    Maxima,
    /// Simplify minima (split tree).
    Minima,
}

/// Report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Summary,
    /// Landscape document plus segmentation as JSON.
    Json,
}

impl From<StencilArg> for Stencil {
    fn from(value: StencilArg) -> Self {
        match value {
            StencilArg::Box => Self::Box,
            StencilArg::Cross => Self::Cross,
        }
    }
}

impl From<MetricArg> for DistanceMetric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Euclidean => Self::Euclidean,
            MetricArg::Manhattan => Self::Manhattan,
            MetricArg::Chebyshev => Self::Chebyshev,
        }
    }
}

impl From<PolarityArg> for Polarity {
    fn from(value: PolarityArg) -> Self {
        match value {
            PolarityArg::Maxima => Self::Maxima,
            PolarityArg::Minima => Self::Minima,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading an input file failed.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An input file held a malformed row or value.
    #[error("{path}:{line}: {message}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },
    /// The parsed samples did not form a valid sample set.
    #[error(transparent)]
    SampleSet(#[from] SampleSetError),
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] TopoSpineError),
}

/// Outcome of a `run` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name of the analysed sample set.
    pub sample_set: String,
    /// Format requested for rendering.
    pub format: OutputFormat,
    /// Full pipeline output.
    pub report: TopologyReport,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading the input or running the pipeline
/// fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use topospine_cli::cli::Cli;
/// # use topospine_cli::cli::run_cli;
/// # use clap::Parser;
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0 5 1 6 2 7 0\n")?;
/// let path = file.path().to_str().ok_or("temp path is not UTF-8")?;
/// let cli = Cli::try_parse_from([
///     "topospine", "run", "--target", "2", "grid", path, "--extents", "7",
/// ])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.report.extremum_graph().surviving_count(), 2);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(source = field::Empty, neighbourhood = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    let (samples, point_source) = match &command.source {
        RunSource::Points(args) => {
            span.record("source", field::display("points"));
            (load_points(args)?, true)
        }
        RunSource::Grid(args) => {
            span.record("source", field::display("grid"));
            (load_grid(args)?, false)
        }
    };
    let policy = neighbourhood_policy(&command, point_source);
    span.record("neighbourhood", field::debug(&policy));

    let topospine = configure(&command, policy)?;
    let report = topospine.run(&samples)?;
    info!(
        sample_set = samples.name(),
        surviving = report.extremum_graph().surviving_count(),
        "command completed"
    );
    Ok(ExecutionSummary {
        sample_set: samples.name().to_owned(),
        format: command.format,
        report,
    })
}

pub(super) fn neighbourhood_policy(command: &RunCommand, point_source: bool) -> NeighborhoodPolicy {
    let knn = command
        .knn
        .or_else(|| point_source.then_some(DEFAULT_POINT_NEIGHBOURS));
    match knn {
        Some(k) => NeighborhoodPolicy::Knn {
            k,
            metric: command.metric.into(),
        },
        None => NeighborhoodPolicy::Grid {
            radius: command.radius,
            stencil: command.stencil.into(),
        },
    }
}

fn configure(command: &RunCommand, policy: NeighborhoodPolicy) -> Result<TopoSpine, CliError> {
    Ok(TopoSpineBuilder::new()
        .with_neighborhood(policy)
        .with_simplification_threshold(command.threshold)
        .with_target_extrema(command.target)
        .with_polarity(command.polarity.into())
        .build()?)
}

fn read_input(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Yields `(line number, fields)` for every non-blank, non-comment line.
fn data_rows(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(idx, line)| {
        let content = line.split('#').next().unwrap_or_default().trim();
        (!content.is_empty()).then(|| (idx + 1, content.split_whitespace().collect()))
    })
}

fn parse_number(path: &Path, line: usize, raw: &str) -> Result<f64, CliError> {
    raw.parse::<f64>().map_err(|error| CliError::Parse {
        path: path.to_path_buf(),
        line,
        message: format!("`{raw}` is not a number: {error}"),
    })
}

#[instrument(name = "cli.load_points", err, skip(args), fields(path = %args.path.display()))]
pub(super) fn load_points(args: &PointsArgs) -> Result<SampleSet, CliError> {
    let text = read_input(&args.path)?;
    let mut columns = None;
    let mut coordinates = Vec::new();
    let mut values = Vec::new();
    for (line, fields) in data_rows(&text) {
        let width = *columns.get_or_insert(fields.len());
        if width < 2 || fields.len() != width {
            return Err(CliError::Parse {
                path: args.path.clone(),
                line,
                message: format!("expected {} columns, found {}", width.max(2), fields.len()),
            });
        }
        let (value, coords) = fields.split_last().ok_or_else(|| CliError::Parse {
            path: args.path.clone(),
            line,
            message: "empty row".to_owned(),
        })?;
        for raw in coords {
            coordinates.push(parse_number(&args.path, line, raw)?);
        }
        values.push(parse_number(&args.path, line, value)?);
    }
    let dimension = columns.map_or(0, |width| width - 1);
    let name = sample_set_name(&args.path, args.name.as_deref());
    Ok(SampleSet::from_points(name, dimension, coordinates, values)?)
}

#[instrument(name = "cli.load_grid", err, skip(args), fields(path = %args.path.display()))]
pub(super) fn load_grid(args: &GridArgs) -> Result<SampleSet, CliError> {
    let text = read_input(&args.path)?;
    let mut values = Vec::new();
    for (line, fields) in data_rows(&text) {
        for raw in fields {
            values.push(parse_number(&args.path, line, raw)?);
        }
    }
    let name = sample_set_name(&args.path, args.name.as_deref());
    Ok(SampleSet::from_grid(
        name,
        GridShape::new(args.extents.clone()),
        values,
    )?)
}

pub(super) fn sample_set_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }
    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "samples".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer` in the format it was requested in.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` fails.
pub fn render(summary: &ExecutionSummary, writer: impl Write) -> io::Result<()> {
    match summary.format {
        OutputFormat::Summary => render_summary(summary, writer),
        OutputFormat::Json => render_json(summary, writer),
    }
}

/// Renders `summary` as human-readable text.
///
/// # Errors
/// Returns [`io::Error`] if writing to `writer` fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let report = &summary.report;
    let graph = report.extremum_graph();
    let diagnostics = report.diagnostics();
    writeln!(writer, "sample set: {}", summary.sample_set)?;
    writeln!(
        writer,
        "critical points: {} minima, {} maxima, {} saddles",
        diagnostics.counts.minima, diagnostics.counts.maxima, diagnostics.counts.saddles
    )?;
    writeln!(
        writer,
        "excluded: {} non-finite, {} isolated",
        diagnostics.non_finite.len(),
        diagnostics.isolated.len()
    )?;
    writeln!(
        writer,
        "{}: {} of {} surviving after {} merges",
        graph.polarity(),
        graph.surviving_count(),
        graph.extrema().len(),
        graph.cancellations().len()
    )?;
    let sizes = report.segmentation().basin_sizes();
    for node in graph.nodes() {
        let size = sizes.get(&node.sample).copied().unwrap_or_default();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            node.sample, node.value, node.persistence, size
        )?;
    }
    Ok(())
}

/// Renders `summary` as a JSON document holding the landscape view and the
/// per-sample segmentation.
///
/// # Errors
/// Returns [`io::Error`] if serialisation or writing fails.
pub fn render_json(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let report = &summary.report;
    let document = json!({
        "sampleSet": summary.sample_set,
        "polarity": report.extremum_graph().polarity(),
        "landscape": report.spine().to_landscape(),
        "segmentation": report.segmentation().labels(),
        "mergeLog": report.extremum_graph().merge_log(),
    });
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writeln!(writer)
}
