//! Unit tests for the CLI commands and input loaders.

use super::commands::{
    load_grid, load_points, neighbourhood_policy, run_command, sample_set_name,
};
use super::{
    Cli, CliError, Command, GridArgs, OutputFormat, PointsArgs, RunCommand, RunSource, render,
    run_cli,
};

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use topospine_core::{DistanceMetric, NeighborhoodPolicy, SampleSetError, Stencil, TopoSpineError};
use topospine_test_support::tracing::record;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const RIDGE_VALUES: &str = "# ridge\n0 5 1 6\n2 7 0\n";

#[fixture]
fn dir() -> TempDir {
    TempDir::new().expect("temp dir must be created")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture file must be written");
    path
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("topospine").chain(args.iter().copied()))
        .expect("arguments must parse")
}

fn run_args(cli: Cli) -> RunCommand {
    match cli.command {
        Command::Run(run) => run,
    }
}

#[rstest]
#[case::override_name("/tmp/field.txt", Some("override"), "override")]
#[case::stem_with_extension("/tmp/field.txt", None, "field")]
#[case::stem_without_extension("/tmp/field", None, "field")]
#[case::missing_stem("", None, "samples")]
fn sample_set_name_selects_expected_name(
    #[case] raw_path: &str,
    #[case] override_name: Option<&'static str>,
    #[case] expected: &str,
) {
    assert_eq!(sample_set_name(Path::new(raw_path), override_name), expected);
}

#[rstest]
fn parse_defaults_to_a_box_stencil_for_grids() {
    let run = run_args(parse(&["run", "grid", "values.txt", "--extents", "4,3"]));
    assert_eq!(
        neighbourhood_policy(&run, false),
        NeighborhoodPolicy::Grid { radius: 1, stencil: Stencil::Box }
    );
    assert_eq!(run.format, OutputFormat::Summary);
    let RunSource::Grid(grid) = run.source else {
        panic!("grid source expected");
    };
    assert_eq!(grid.extents, vec![4, 3]);
}

#[rstest]
#[case::points_default(&["run", "points", "cloud.txt"][..], true, NeighborhoodPolicy::knn(8))]
#[case::explicit_knn(
    &["run", "--knn", "3", "--metric", "chebyshev", "grid", "v.txt", "--extents", "9"][..],
    false,
    NeighborhoodPolicy::Knn { k: 3, metric: DistanceMetric::Chebyshev },
)]
#[case::cross_stencil(
    &["run", "--radius", "2", "--stencil", "cross", "grid", "v.txt", "--extents", "9"][..],
    false,
    NeighborhoodPolicy::Grid { radius: 2, stencil: Stencil::Cross },
)]
fn neighbourhood_follows_the_flags(
    #[case] args: &[&str],
    #[case] point_source: bool,
    #[case] expected: NeighborhoodPolicy,
) {
    let run = run_args(parse(args));
    assert_eq!(neighbourhood_policy(&run, point_source), expected);
}

#[rstest]
fn grid_loader_reads_values_across_lines(dir: TempDir) -> TestResult {
    let path = write(&dir, "ridge.txt", RIDGE_VALUES);
    let samples = load_grid(&GridArgs {
        path,
        extents: vec![7],
        name: None,
    })?;
    assert_eq!(samples.name(), "ridge");
    assert_eq!(samples.values(), &[0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0]);
    Ok(())
}

#[rstest]
fn grid_loader_rejects_mismatched_extents(dir: TempDir) {
    let path = write(&dir, "ridge.txt", RIDGE_VALUES);
    let err = load_grid(&GridArgs {
        path,
        extents: vec![3, 3],
        name: None,
    })
    .expect_err("seven values do not fill a 3x3 grid");
    assert!(matches!(
        err,
        CliError::SampleSet(SampleSetError::GridShapeMismatch { cells: 9, values: 7 })
    ));
}

#[rstest]
fn point_loader_splits_coordinates_from_values(dir: TempDir) -> TestResult {
    let path = write(&dir, "cloud.xyz", "0 0 1.5\n1 0 2.5 # peak\n\n0 1 nan\n");
    let samples = load_points(&PointsArgs {
        path,
        name: Some("cloud".into()),
    })?;
    assert_eq!(samples.dimension(), 2);
    assert_eq!(samples.len(), 3);
    assert_eq!(samples.coordinates(1), Some(&[1.0, 0.0][..]));
    assert!(samples.value(2).is_some_and(f64::is_nan));
    Ok(())
}

#[rstest]
#[case::ragged("0 1\n0 1 2\n", 2)]
#[case::single_column("4\n", 1)]
#[case::not_a_number("0 x\n", 1)]
fn point_loader_reports_the_bad_line(
    dir: TempDir,
    #[case] contents: &str,
    #[case] expected_line: usize,
) {
    let path = write(&dir, "bad.txt", contents);
    let err = load_points(&PointsArgs { path, name: None }).expect_err("input is malformed");
    assert!(
        matches!(err, CliError::Parse { line, .. } if line == expected_line),
        "unexpected error: {err:?}"
    );
}

#[rstest]
fn missing_files_surface_io_errors(dir: TempDir) {
    let path = dir.path().join("absent.txt");
    let err = load_points(&PointsArgs { path, name: None }).expect_err("file is missing");
    assert!(matches!(err, CliError::Io { .. }));
}

#[rstest]
fn run_simplifies_to_the_target(dir: TempDir) -> TestResult {
    let path = write(&dir, "ridge.txt", RIDGE_VALUES);
    let path = path.to_str().ok_or("temp path is not UTF-8")?;
    let summary = run_cli(parse(&["run", "--target", "2", "grid", path, "--extents", "7"]))?;
    let surviving: Vec<usize> = summary
        .report
        .extremum_graph()
        .nodes()
        .map(|node| node.sample)
        .collect();
    assert_eq!(surviving, vec![3, 5]);
    Ok(())
}

#[rstest]
fn run_rejects_single_samples(dir: TempDir) {
    let path = write(&dir, "one.txt", "1.0\n");
    let err = run_command(run_args(parse(&[
        "run",
        "grid",
        path.to_str().expect("temp path is UTF-8"),
        "--extents",
        "1",
    ])))
    .expect_err("one sample is insufficient");
    assert!(matches!(
        err,
        CliError::Core(TopoSpineError::InsufficientSamples { .. })
    ));
}

#[rstest]
fn run_rejects_negative_thresholds(dir: TempDir) {
    let path = write(&dir, "ridge.txt", RIDGE_VALUES);
    let err = run_command(run_args(parse(&[
        "run",
        "--threshold=-1",
        "grid",
        path.to_str().expect("temp path is UTF-8"),
        "--extents",
        "7",
    ])))
    .expect_err("negative thresholds are rejected");
    assert!(matches!(
        err,
        CliError::Core(TopoSpineError::InvalidThreshold { .. })
    ));
}

#[rstest]
fn summary_lists_surviving_extrema(dir: TempDir) -> TestResult {
    let path = write(&dir, "ridge.txt", RIDGE_VALUES);
    let path = path.to_str().ok_or("temp path is not UTF-8")?;
    let summary = run_cli(parse(&["run", "--target", "2", "grid", path, "--extents", "7"]))?;
    let mut buffer = Vec::new();
    render(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert!(text.contains("sample set: ridge"));
    assert!(text.contains("critical points: 4 minima, 3 maxima"));
    assert!(text.contains("maxima: 2 of 3 surviving after 1 merges"));
    assert!(text.contains("3\t6\t4\t4"));
    assert!(text.contains("5\t7\tinf\t3"));
    Ok(())
}

#[rstest]
fn json_output_carries_the_landscape(dir: TempDir) -> TestResult {
    let path = write(&dir, "ridge.txt", RIDGE_VALUES);
    let path = path.to_str().ok_or("temp path is not UTF-8")?;
    let summary = run_cli(parse(&[
        "run", "--target", "2", "--format", "json", "grid", path, "--extents", "7",
    ]))?;
    let mut buffer = Vec::new();
    render(&summary, &mut buffer)?;
    let document: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(document["sampleSet"], "ridge");
    assert_eq!(document["polarity"], "Maxima");
    assert_eq!(document["landscape"]["link"][0], "0-1");
    assert_eq!(document["landscape"]["nodes"][1]["functionValue"], 7.0);
    assert_eq!(document["segmentation"][0], 3);
    assert_eq!(document["mergeLog"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[rstest]
fn run_records_cli_spans(dir: TempDir) {
    let path = write(&dir, "ridge.txt", RIDGE_VALUES);
    let cli = parse(&[
        "run",
        "grid",
        path.to_str().expect("temp path is UTF-8"),
        "--extents",
        "7",
    ]);
    let (summary, layer) = record(|| run_cli(cli));
    summary.expect("run must succeed");

    let execute = layer.span("cli.execute").expect("cli.execute span must exist");
    assert_eq!(execute.field("source"), Some("grid"));
    let run = layer.span("cli.run").expect("cli.run span must exist");
    assert_eq!(run.field("command"), Some("run"));
    assert!(layer.span("core.run").is_some());
}
