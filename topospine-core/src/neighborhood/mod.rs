//! Neighbourhood graphs over sample sets.
//!
//! A [`NeighborhoodGraph`] is an undirected adjacency relation stored in
//! compressed sparse row form. Grid stencils are symmetric by construction;
//! k-NN lists are directed and are symmetrised by taking the union of both
//! directions. Neighbour lists are sorted by ascending [`SampleId`] so every
//! downstream tie-break is reproducible.
//!
//! Samples with a non-finite scalar value never enter the graph. Finite
//! samples left without neighbours are reported as isolated; both kinds are
//! excluded from classification without failing the run.

mod grid;
mod knn;

use tracing::{info, instrument, warn};

use crate::{
    Result,
    builder::ExecutionStrategy,
    distance::DistanceMetric,
    error::{SampleDataError, TopoSpineError},
    samples::{SampleId, SampleSet},
    union_find::DisjointSet,
};

/// Smallest sample set the pipeline accepts.
pub const MIN_SAMPLES: usize = 2;

/// Shape of a grid stencil.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stencil {
    /// Every cell within Chebyshev distance `radius` (8-connectivity in 2-D
    /// for radius one).
    #[default]
    Box,
    /// Every cell within Manhattan distance `radius` (4-connectivity in 2-D
    /// for radius one).
    Cross,
}

/// How neighbours are chosen for each sample.
///
/// # Examples
/// ```
/// use topospine_core::{DistanceMetric, NeighborhoodPolicy, Stencil};
///
/// assert_eq!(
///     NeighborhoodPolicy::grid(1),
///     NeighborhoodPolicy::Grid { radius: 1, stencil: Stencil::Box },
/// );
/// assert_eq!(
///     NeighborhoodPolicy::knn(8),
///     NeighborhoodPolicy::Knn { k: 8, metric: DistanceMetric::Euclidean },
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeighborhoodPolicy {
    /// Stencil over a regular grid; requires [`SampleSet::grid`].
    Grid {
        /// Stencil radius in cells.
        radius: usize,
        /// Stencil shape.
        stencil: Stencil,
    },
    /// The `k` nearest samples under `metric`, made symmetric.
    Knn {
        /// Neighbours requested per sample.
        k: usize,
        /// Metric used to rank candidates.
        metric: DistanceMetric,
    },
}

impl Default for NeighborhoodPolicy {
    fn default() -> Self {
        Self::grid(1)
    }
}

impl NeighborhoodPolicy {
    /// Box stencil of the given radius.
    #[must_use]
    pub const fn grid(radius: usize) -> Self {
        Self::Grid {
            radius,
            stencil: Stencil::Box,
        }
    }

    /// Euclidean k-NN with the given `k`.
    #[must_use]
    pub const fn knn(k: usize) -> Self {
        Self::Knn {
            k,
            metric: DistanceMetric::Euclidean,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Self::Grid { radius: 0, .. } => Err(TopoSpineError::InvalidGridRadius { got: 0 }),
            Self::Knn { k: 0, .. } => Err(TopoSpineError::InvalidNeighbourCount { got: 0 }),
            _ => Ok(()),
        }
    }
}

/// Undirected adjacency over a [`SampleSet`].
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborhoodGraph {
    offsets: Vec<usize>,
    neighbours: Vec<SampleId>,
    component: Vec<Option<usize>>,
    component_count: usize,
    isolated: Vec<SampleId>,
    non_finite: Vec<SampleDataError>,
}

impl NeighborhoodGraph {
    /// Builds the symmetric closure of per-sample directed neighbour lists.
    ///
    /// Self-loops, duplicates and edges touching samples with non-finite
    /// values are dropped.
    pub(crate) fn from_directed(values: &[f64], directed: &[Vec<SampleId>]) -> Self {
        let len = values.len();
        let finite = |sample: SampleId| values.get(sample).is_some_and(|v| v.is_finite());

        let mut pairs: Vec<(SampleId, SampleId)> = directed
            .iter()
            .enumerate()
            .flat_map(|(from, list)| list.iter().map(move |&to| (from, to)))
            .filter(|&(from, to)| from != to && to < len && finite(from) && finite(to))
            .flat_map(|(from, to)| [(from, to), (to, from)])
            .collect();
        pairs.sort_unstable();
        pairs.dedup();

        let mut offsets = vec![0; len + 1];
        for &(from, _) in &pairs {
            offsets[from + 1] += 1;
        }
        for idx in 0..len {
            offsets[idx + 1] += offsets[idx];
        }
        let neighbours: Vec<SampleId> = pairs.iter().map(|&(_, to)| to).collect();

        let mut components = DisjointSet::new(len);
        for &(from, to) in &pairs {
            if from < to {
                components.union(from, to);
            }
        }
        let mut root_label = vec![None; len];
        let mut component = vec![None; len];
        let mut component_count = 0;
        let mut isolated = Vec::new();
        let mut non_finite = Vec::new();
        for sample in 0..len {
            let value = values[sample];
            if !value.is_finite() {
                non_finite.push(SampleDataError::NonFiniteValue { sample, value });
                continue;
            }
            if offsets[sample] == offsets[sample + 1] {
                isolated.push(sample);
                continue;
            }
            let root = components.find(sample);
            let label = *root_label[root].get_or_insert_with(|| {
                component_count += 1;
                component_count - 1
            });
            component[sample] = Some(label);
        }

        Self {
            offsets,
            neighbours,
            component,
            component_count,
            isolated,
            non_finite,
        }
    }

    /// Returns the number of samples covered by the graph, including
    /// excluded ones.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.offsets.len() - 1 }

    /// Returns whether the graph covers no samples.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Returns the neighbours of `sample` in ascending id order.
    ///
    /// Excluded and out-of-range samples have no neighbours.
    #[must_use]
    pub fn neighbours(&self, sample: SampleId) -> &[SampleId] {
        match (self.offsets.get(sample), self.offsets.get(sample + 1)) {
            (Some(&start), Some(&end)) => &self.neighbours[start..end],
            _ => &[],
        }
    }

    /// Returns whether `left` and `right` are adjacent.
    #[must_use]
    pub fn contains_edge(&self, left: SampleId, right: SampleId) -> bool {
        self.neighbours(left).binary_search(&right).is_ok()
    }

    /// Returns whether `sample` takes part in classification.
    #[must_use]
    pub fn is_active(&self, sample: SampleId) -> bool {
        !self.neighbours(sample).is_empty()
    }

    /// Iterates over every undirected edge once, as `(low, high)` id pairs.
    pub fn edges(&self) -> impl Iterator<Item = (SampleId, SampleId)> + '_ {
        (0..self.len()).flat_map(move |from| {
            self.neighbours(from)
                .iter()
                .filter(move |&&to| from < to)
                .map(move |&to| (from, to))
        })
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neighbours.len() / 2
    }

    /// Returns the connected component of an active sample.
    #[must_use]
    pub fn component(&self, sample: SampleId) -> Option<usize> {
        self.component.get(sample).copied().flatten()
    }

    /// Returns the number of connected components among active samples.
    #[must_use]
    #[rustfmt::skip]
    pub fn component_count(&self) -> usize { self.component_count }

    /// Returns finite samples that ended up without neighbours.
    #[must_use]
    #[rustfmt::skip]
    pub fn isolated(&self) -> &[SampleId] { &self.isolated }

    /// Returns the samples rejected for non-finite scalar values.
    #[must_use]
    #[rustfmt::skip]
    pub fn non_finite(&self) -> &[SampleDataError] { &self.non_finite }

    /// Returns the number of samples excluded from classification.
    #[must_use]
    pub fn excluded_count(&self) -> usize {
        self.isolated.len() + self.non_finite.len()
    }
}

/// Builds the neighbourhood graph of `samples` under `policy`.
///
/// # Errors
/// Returns [`TopoSpineError::InsufficientSamples`] when the set holds fewer
/// than [`MIN_SAMPLES`] samples, [`TopoSpineError::MissingGridShape`] for a
/// grid policy over unstructured samples, the policy validation errors, and
/// [`TopoSpineError::BackendUnavailable`] for an unsupported `strategy`.
///
/// # Examples
/// ```
/// use topospine_core::{
///     ExecutionStrategy, GridShape, NeighborhoodPolicy, SampleSet, build_neighborhood,
/// };
///
/// let samples = SampleSet::from_grid("line", GridShape::new(vec![4]), vec![0.0, 2.0, 1.0, 3.0])?;
/// let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Auto)?;
/// assert_eq!(graph.neighbours(1), &[0, 2]);
/// assert_eq!(graph.edge_count(), 3);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.neighborhood",
    err,
    skip(samples),
    fields(sample_set = %samples.name(), samples = samples.len()),
)]
pub fn build_neighborhood(
    samples: &SampleSet,
    policy: &NeighborhoodPolicy,
    strategy: ExecutionStrategy,
) -> Result<NeighborhoodGraph> {
    policy.validate()?;
    let parallel = strategy.resolve()?;
    if samples.len() < MIN_SAMPLES {
        warn!(samples = samples.len(), "sample set is too small for a neighbourhood");
        return Err(TopoSpineError::InsufficientSamples {
            sample_set: samples.name_arc(),
            samples: samples.len(),
            required: MIN_SAMPLES,
        });
    }

    let directed = match *policy {
        NeighborhoodPolicy::Grid { radius, stencil } => {
            let shape = samples
                .grid()
                .ok_or_else(|| TopoSpineError::MissingGridShape {
                    sample_set: samples.name_arc(),
                })?;
            grid::stencil_neighbours(shape, samples.values(), radius, stencil, parallel)
        }
        NeighborhoodPolicy::Knn { k, metric } => {
            knn::nearest_neighbours(samples, k, metric, parallel)
        }
    };
    let graph = NeighborhoodGraph::from_directed(samples.values(), &directed);

    if !graph.non_finite().is_empty() {
        warn!(
            count = graph.non_finite().len(),
            "excluding samples with non-finite values"
        );
    }
    if !graph.isolated().is_empty() {
        warn!(count = graph.isolated().len(), "excluding isolated samples");
    }
    info!(
        edges = graph.edge_count(),
        components = graph.component_count(),
        "neighbourhood graph built"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests;
