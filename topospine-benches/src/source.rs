//! Seeded synthetic scalar fields for benchmarking.
//!
//! Values are drawn uniformly from `[0, 1)` so that almost every sample is
//! distinct and the fields carry many shallow extrema, which is the worst
//! case for the merge hierarchy.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use topospine_core::{GridShape, SampleSet};

use crate::error::BenchSetupError;

/// Errors that may occur during synthetic field generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// The requested field held no samples.
    #[error("sample count must be greater than zero")]
    ZeroSamples,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
}

/// Configuration for a random grid field.
#[derive(Clone, Debug)]
pub struct GridFieldConfig {
    /// Cells along each axis, first axis fastest.
    pub extents: Vec<usize>,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Configuration for a random point cloud field.
#[derive(Clone, Debug)]
pub struct CloudFieldConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each point.
    pub dimensions: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Generates a grid-backed sample set with uniform random values.
///
/// # Errors
/// Returns [`SyntheticError::ZeroDimensions`] for empty extents,
/// [`SyntheticError::ZeroSamples`] when any extent is zero, and
/// propagates sample set validation failures.
///
/// # Examples
/// ```
/// use topospine_benches::source::{GridFieldConfig, grid_field};
///
/// let samples = grid_field(&GridFieldConfig { extents: vec![8, 4], seed: 7 })?;
/// assert_eq!(samples.len(), 32);
/// # Ok::<(), topospine_benches::error::BenchSetupError>(())
/// ```
pub fn grid_field(config: &GridFieldConfig) -> Result<SampleSet, BenchSetupError> {
    if config.extents.is_empty() {
        return Err(SyntheticError::ZeroDimensions.into());
    }
    let cells = config
        .extents
        .iter()
        .try_fold(1_usize, |acc, &extent| acc.checked_mul(extent))
        .filter(|&cells| cells > 0)
        .ok_or(SyntheticError::ZeroSamples)?;

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let values: Vec<f64> = (0..cells).map(|_| rng.gen_range(0.0_f64..1.0_f64)).collect();
    Ok(SampleSet::from_grid(
        "synthetic-grid",
        GridShape::new(config.extents.clone()),
        values,
    )?)
}

/// Generates a point cloud with uniform random coordinates and values.
///
/// # Errors
/// Returns [`SyntheticError::ZeroSamples`] if `point_count` is zero or
/// [`SyntheticError::ZeroDimensions`] if `dimensions` is zero.
pub fn cloud_field(config: &CloudFieldConfig) -> Result<SampleSet, BenchSetupError> {
    if config.point_count == 0 {
        return Err(SyntheticError::ZeroSamples.into());
    }
    if config.dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions.into());
    }

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let total = config.point_count.saturating_mul(config.dimensions);
    let coordinates: Vec<f64> = (0..total).map(|_| rng.gen_range(0.0_f64..1.0_f64)).collect();
    let values: Vec<f64> = (0..config.point_count)
        .map(|_| rng.gen_range(0.0_f64..1.0_f64))
        .collect();
    Ok(SampleSet::from_points(
        "synthetic-cloud",
        config.dimensions,
        coordinates,
        values,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::line(vec![100], 100)]
    #[case::plane(vec![16, 8], 128)]
    #[case::volume(vec![4, 4, 4], 64)]
    fn grid_fields_fill_every_cell(#[case] extents: Vec<usize>, #[case] expected: usize) {
        let samples =
            grid_field(&GridFieldConfig { extents, seed: 42 }).expect("generation must succeed");
        assert_eq!(samples.len(), expected);
        assert!(samples.values().iter().all(|value| (0.0..1.0).contains(value)));
    }

    #[rstest]
    fn fields_are_reproducible() {
        let config = GridFieldConfig {
            extents: vec![10, 10],
            seed: 3,
        };
        let first = grid_field(&config).expect("generation must succeed");
        let second = grid_field(&config).expect("generation must succeed");
        assert_eq!(first.values(), second.values());
    }

    #[rstest]
    #[case::no_axes(vec![], SyntheticError::ZeroDimensions)]
    #[case::zero_extent(vec![4, 0], SyntheticError::ZeroSamples)]
    fn degenerate_grids_are_rejected(#[case] extents: Vec<usize>, #[case] expected: SyntheticError) {
        let err = grid_field(&GridFieldConfig { extents, seed: 1 }).expect_err("grid is degenerate");
        assert!(matches!(err, BenchSetupError::Synthetic(found) if found == expected));
    }

    #[rstest]
    fn clouds_have_the_requested_shape() {
        let samples = cloud_field(&CloudFieldConfig {
            point_count: 50,
            dimensions: 3,
            seed: 9,
        })
        .expect("generation must succeed");
        assert_eq!(samples.len(), 50);
        assert_eq!(samples.dimension(), 3);
    }

    #[rstest]
    #[case::no_points(0, 2, SyntheticError::ZeroSamples)]
    #[case::no_dimensions(5, 0, SyntheticError::ZeroDimensions)]
    fn degenerate_clouds_are_rejected(
        #[case] point_count: usize,
        #[case] dimensions: usize,
        #[case] expected: SyntheticError,
    ) {
        let err = cloud_field(&CloudFieldConfig {
            point_count,
            dimensions,
            seed: 1,
        })
        .expect_err("cloud is degenerate");
        assert!(matches!(err, BenchSetupError::Synthetic(found) if found == expected));
    }
}
