//! Shared test utilities for `topospine-core`.

use proptest::test_runner::Config as ProptestConfig;
use topospine_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{
    builder::ExecutionStrategy,
    neighborhood::{NeighborhoodGraph, NeighborhoodPolicy, build_neighborhood},
    samples::{GridShape, SampleSet},
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `TOPOSPINE_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Builds a grid sample set and its neighbourhood graph, panicking on
/// invalid fixtures.
#[must_use]
pub(crate) fn grid_pipeline_input(
    extents: Vec<usize>,
    values: Vec<f64>,
    policy: NeighborhoodPolicy,
) -> (SampleSet, NeighborhoodGraph) {
    let samples =
        SampleSet::from_grid("fixture", GridShape::new(extents), values).expect("fixture grid is valid");
    let graph = build_neighborhood(&samples, &policy, ExecutionStrategy::Sequential)
        .expect("fixture neighbourhood builds");
    (samples, graph)
}

/// The 1-D ridge used throughout the suite: maxima at 1, 3 and 5 and minima
/// at 0, 2, 4 and 6.
pub(crate) const RIDGE: [f64; 7] = [0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0];

/// Samples and radius-one graph for [`RIDGE`].
#[must_use]
pub(crate) fn ridge_input() -> (SampleSet, NeighborhoodGraph) {
    grid_pipeline_input(vec![RIDGE.len()], RIDGE.to_vec(), NeighborhoodPolicy::grid(1))
}
