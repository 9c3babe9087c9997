#![allow(
    dead_code,
    reason = "each integration test binary uses a different subset of these helpers"
)]

use topospine_core::{GridShape, SampleSet, TopoSpineBuilder, TopologyReport};

/// Peaks at 1, 3 and 5 separated by valleys at 0, 2, 4 and 6.
pub const RIDGE: [f64; 7] = [0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0];

#[must_use]
pub fn grid(name: &str, extents: Vec<usize>, values: Vec<f64>) -> SampleSet {
    SampleSet::from_grid(name, GridShape::new(extents), values).expect("fixture grid is valid")
}

#[must_use]
pub fn ridge() -> SampleSet {
    grid("ridge", vec![RIDGE.len()], RIDGE.to_vec())
}

/// Runs `builder` against `samples`, panicking on configuration or run
/// failures.
#[must_use]
pub fn run(builder: TopoSpineBuilder, samples: &SampleSet) -> TopologyReport {
    builder
        .build()
        .expect("configuration must be valid")
        .run(samples)
        .expect("run must succeed")
}
