//! Benchmark parameter types.

use std::fmt;

/// Parameters for a grid field benchmark run.
#[derive(Clone, Debug)]
pub struct GridBenchParams {
    /// Cells along each axis.
    pub extents: Vec<usize>,
    /// Stencil radius.
    pub radius: usize,
}

impl fmt::Display for GridBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extents: Vec<String> = self.extents.iter().map(ToString::to_string).collect();
        write!(f, "grid={},r={}", extents.join("x"), self.radius)
    }
}

/// Parameters for a point cloud benchmark run.
#[derive(Clone, Debug)]
pub struct CloudBenchParams {
    /// Number of points in the cloud.
    pub point_count: usize,
    /// Neighbours per point.
    pub k: usize,
}

impl fmt::Display for CloudBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},k={}", self.point_count, self.k)
    }
}
