//! Instrumentation emitted by a pipeline run.

mod common;

use common::{grid, ridge};
use rstest::rstest;
use topospine_core::{ExecutionStrategy, TopoSpineBuilder};
use topospine_test_support::tracing::record;
use tracing::Level;

#[rstest]
#[case("core.neighborhood")]
#[case("core.classify")]
#[case("core.basins")]
#[case("core.extremum_graph")]
#[case("core.segmentation")]
#[case("core.spine")]
#[case("core.run")]
fn run_records_a_span_per_stage(#[case] stage: &str) {
    let topospine = TopoSpineBuilder::new()
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("configuration must be valid");
    let (report, layer) = record(|| topospine.run(&ridge()));
    report.expect("run must succeed");
    assert!(layer.span(stage).is_some(), "missing span {stage}");
}

#[test]
fn run_span_carries_the_configuration() {
    let topospine = TopoSpineBuilder::new()
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("configuration must be valid");
    let (report, layer) = record(|| topospine.run(&ridge()));
    report.expect("run must succeed");

    let run = layer.span("core.run").expect("core.run span must exist");
    assert_eq!(run.field("sample_set"), Some("ridge"));
    assert_eq!(run.field("samples"), Some("7"));
    assert_eq!(run.field("polarity"), Some("maxima"));
    assert_eq!(run.field("strategy"), Some("Sequential"));

    let completed = layer
        .events_at(Level::INFO)
        .into_iter()
        .find(|event| event.message() == Some("run completed"))
        .expect("completion event must be emitted");
    assert_eq!(completed.field("surviving"), Some("1"));
    assert_eq!(completed.field("merges"), Some("2"));
}

#[test]
fn excluded_samples_emit_warnings() {
    let samples = grid("holes", vec![5], vec![1.0, f64::NAN, 2.0, 3.0, 1.0]);
    let topospine = TopoSpineBuilder::new()
        .build()
        .expect("configuration must be valid");
    let (report, layer) = record(|| topospine.run(&samples));
    report.expect("holes are not fatal");

    let warnings = layer.events_at(Level::WARN);
    assert!(
        warnings
            .iter()
            .any(|event| event.field("count") == Some("1")),
        "non-finite warning must report the count: {warnings:?}"
    );
}

#[test]
fn failed_runs_record_the_error() {
    let samples = grid("single", vec![1], vec![0.0]);
    let topospine = TopoSpineBuilder::new()
        .build()
        .expect("configuration must be valid");
    let (report, layer) = record(|| topospine.run(&samples));
    assert!(report.is_err());

    let errors = layer.events_at(Level::ERROR);
    assert!(!errors.is_empty(), "instrument(err) must log the failure");
}
