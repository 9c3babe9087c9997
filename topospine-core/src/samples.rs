//! Immutable scalar-field samples consumed by the pipeline.
//!
//! A [`SampleSet`] stores one coordinate vector and one scalar value per
//! sample in flat arrays indexed by [`SampleId`]. Grid-backed sets also
//! remember their [`GridShape`] so stencil neighbourhoods can be derived
//! without inspecting coordinates.

use std::sync::Arc;

use crate::error::SampleSetError;

/// Dense index of a sample within its [`SampleSet`].
pub type SampleId = usize;

/// Regular grid layout with the first axis varying fastest.
///
/// # Examples
/// ```
/// use topospine_core::GridShape;
///
/// let shape = GridShape::new(vec![4, 3]).with_spacing(vec![0.5, 0.5]);
/// assert_eq!(shape.cell_count(), 12);
/// assert_eq!(shape.rank(), 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridShape {
    extents: Vec<usize>,
    origin: Vec<f64>,
    spacing: Vec<f64>,
}

impl GridShape {
    /// Creates a grid with the given per-axis extents, origin at zero and
    /// unit spacing.
    #[must_use]
    pub fn new(extents: Vec<usize>) -> Self {
        let rank = extents.len();
        Self {
            extents,
            origin: vec![0.0; rank],
            spacing: vec![1.0; rank],
        }
    }

    /// Overrides the world-space origin of the first cell.
    #[must_use]
    pub fn with_origin(mut self, origin: Vec<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Overrides the world-space distance between neighbouring cells.
    #[must_use]
    pub fn with_spacing(mut self, spacing: Vec<f64>) -> Self {
        self.spacing = spacing;
        self
    }

    /// Returns the per-axis extents.
    #[must_use]
    #[rustfmt::skip]
    pub fn extents(&self) -> &[usize] { &self.extents }

    /// Returns the number of axes.
    #[must_use]
    #[rustfmt::skip]
    pub fn rank(&self) -> usize { self.extents.len() }

    /// Returns the number of cells, saturating on overflow.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.extents
            .iter()
            .fold(1usize, |acc, &extent| acc.saturating_mul(extent))
    }

    /// Decomposes a linear cell index into per-axis indices.
    pub(crate) fn unravel(&self, mut index: usize, out: &mut [usize]) {
        for (slot, &extent) in out.iter_mut().zip(&self.extents) {
            *slot = index % extent;
            index /= extent;
        }
    }

    /// Recomposes per-axis indices into a linear cell index.
    pub(crate) fn ravel(&self, indices: &[usize]) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for (&axis_index, &extent) in indices.iter().zip(&self.extents) {
            index += axis_index * stride;
            stride *= extent;
        }
        index
    }

    fn validate(&self, values: usize) -> Result<(), SampleSetError> {
        if self.extents.is_empty() {
            return Err(SampleSetError::ZeroDimension);
        }
        if let Some(axis) = self.extents.iter().position(|&extent| extent == 0) {
            return Err(SampleSetError::ZeroExtent { axis });
        }
        for (field, components) in [("origin", &self.origin), ("spacing", &self.spacing)] {
            if components.len() != self.rank() {
                return Err(SampleSetError::GridRankMismatch {
                    field,
                    rank: self.rank(),
                    got: components.len(),
                });
            }
        }
        let cells = self.cell_count();
        if cells != values {
            return Err(SampleSetError::GridShapeMismatch { cells, values });
        }
        Ok(())
    }
}

/// Immutable set of samples: coordinates plus one scalar value each.
///
/// Scalar values may be non-finite; such samples are flagged and excluded
/// by the pipeline instead of failing construction.
///
/// # Examples
/// ```
/// use topospine_core::SampleSet;
///
/// let samples = SampleSet::from_points(
///     "line",
///     1,
///     vec![0.0, 1.0, 2.0],
///     vec![3.0, 1.0, 2.0],
/// )?;
/// assert_eq!(samples.len(), 3);
/// assert_eq!(samples.value(1), Some(1.0));
/// assert_eq!(samples.coordinates(2), Some(&[2.0][..]));
/// # Ok::<(), topospine_core::SampleSetError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SampleSet {
    name: Arc<str>,
    dimension: usize,
    coordinates: Vec<f64>,
    values: Vec<f64>,
    grid: Option<GridShape>,
}

impl SampleSet {
    /// Builds an unstructured sample set from a flat, row-major coordinate
    /// buffer holding `dimension` values per sample.
    ///
    /// # Errors
    /// Returns [`SampleSetError::Empty`] when `values` is empty,
    /// [`SampleSetError::ZeroDimension`] when `dimension == 0`,
    /// [`SampleSetError::CoordinateLengthMismatch`] when the buffer length is
    /// not `dimension * values.len()`, and
    /// [`SampleSetError::NonFiniteCoordinate`] for NaN or infinite
    /// coordinates.
    pub fn from_points(
        name: impl Into<Arc<str>>,
        dimension: usize,
        coordinates: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, SampleSetError> {
        if values.is_empty() {
            return Err(SampleSetError::Empty);
        }
        if dimension == 0 {
            return Err(SampleSetError::ZeroDimension);
        }
        let expected = dimension.saturating_mul(values.len());
        if coordinates.len() != expected {
            return Err(SampleSetError::CoordinateLengthMismatch {
                expected,
                got: coordinates.len(),
            });
        }
        if let Some(position) = coordinates.iter().position(|value| !value.is_finite()) {
            return Err(SampleSetError::NonFiniteCoordinate {
                sample: position / dimension,
                axis: position % dimension,
            });
        }

        Ok(Self {
            name: name.into(),
            dimension,
            coordinates,
            values,
            grid: None,
        })
    }

    /// Builds a grid-backed sample set; coordinates are derived from the
    /// grid origin and spacing with the first axis varying fastest.
    ///
    /// # Errors
    /// Returns [`SampleSetError::Empty`] when `values` is empty and the
    /// grid-shape validation errors when `shape` does not describe `values`.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{GridShape, SampleSet};
    ///
    /// let samples = SampleSet::from_grid("plane", GridShape::new(vec![2, 2]), vec![0.0; 4])?;
    /// assert_eq!(samples.coordinates(3), Some(&[1.0, 1.0][..]));
    /// # Ok::<(), topospine_core::SampleSetError>(())
    /// ```
    pub fn from_grid(
        name: impl Into<Arc<str>>,
        shape: GridShape,
        values: Vec<f64>,
    ) -> Result<Self, SampleSetError> {
        if values.is_empty() {
            return Err(SampleSetError::Empty);
        }
        shape.validate(values.len())?;

        let rank = shape.rank();
        let mut coordinates = Vec::with_capacity(rank.saturating_mul(values.len()));
        let mut indices = vec![0; rank];
        for cell in 0..values.len() {
            shape.unravel(cell, &mut indices);
            for axis in 0..rank {
                let offset = shape.spacing[axis] * indices[axis] as f64;
                coordinates.push(shape.origin[axis] + offset);
            }
        }
        if let Some(position) = coordinates.iter().position(|value| !value.is_finite()) {
            return Err(SampleSetError::NonFiniteCoordinate {
                sample: position / rank,
                axis: position % rank,
            });
        }

        Ok(Self {
            name: name.into(),
            dimension: rank,
            coordinates,
            values,
            grid: Some(shape),
        })
    }

    /// Returns the human-readable name of the set.
    #[must_use]
    #[rustfmt::skip]
    pub fn name(&self) -> &str { &self.name }

    /// Returns the number of samples.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.values.len() }

    /// Returns whether the set holds no samples.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Returns the coordinate dimensionality.
    #[must_use]
    #[rustfmt::skip]
    pub fn dimension(&self) -> usize { self.dimension }

    /// Returns the grid layout when the set was built from a grid.
    #[must_use]
    pub fn grid(&self) -> Option<&GridShape> {
        self.grid.as_ref()
    }

    /// Returns every scalar value indexed by [`SampleId`].
    #[must_use]
    #[rustfmt::skip]
    pub fn values(&self) -> &[f64] { &self.values }

    /// Returns the scalar value of `sample`.
    #[must_use]
    pub fn value(&self, sample: SampleId) -> Option<f64> {
        self.values.get(sample).copied()
    }

    /// Returns the coordinates of `sample`.
    #[must_use]
    pub fn coordinates(&self, sample: SampleId) -> Option<&[f64]> {
        let start = sample.checked_mul(self.dimension)?;
        self.coordinates.get(start..start + self.dimension)
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}
