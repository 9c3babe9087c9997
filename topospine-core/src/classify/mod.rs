//! Critical-point classification.
//!
//! Every active sample is compared against its neighbours under a strict
//! total order on `(value, id)`: equal values are ordered by id, so the
//! lower id is the lower sample and plateaus cannot produce ambiguous
//! classifications. The neighbours of a sample split into an upper and a
//! lower link; the number of connected components of each link (within the
//! sub-graph induced on the neighbourhood) decides the kind.
//!
//! Steepest-ascent and steepest-descent pointers are recorded as sample ids
//! so basin assignment can follow them without touching values again.

use std::cmp::Ordering;

use tracing::{info, instrument};

use crate::{
    Result,
    builder::ExecutionStrategy,
    neighborhood::NeighborhoodGraph,
    parallel::map_indices,
    samples::{SampleId, SampleSet},
    union_find::DisjointSet,
};

/// Compares two samples under the strict `(value, id)` total order.
///
/// # Panics
/// Panics if `left` or `right` is not a valid index into `values`.
#[must_use]
pub fn compare_samples(values: &[f64], left: SampleId, right: SampleId) -> Ordering {
    values[left]
        .total_cmp(&values[right])
        .then_with(|| left.cmp(&right))
}

/// Topological role of a sample within its neighbourhood.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CriticalKind {
    /// Lower than every neighbour.
    Minimum,
    /// Higher than every neighbour.
    Maximum,
    /// Upper or lower link splits into several components.
    Saddle,
    /// One upper and one lower component.
    Regular,
}

/// Classification of one active sample.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticalPoint {
    kind: CriticalKind,
    ascent: Option<SampleId>,
    descent: Option<SampleId>,
    upper_components: usize,
    lower_components: usize,
}

impl CriticalPoint {
    /// Returns the kind of the sample.
    #[must_use]
    #[rustfmt::skip]
    pub fn kind(&self) -> CriticalKind { self.kind }

    /// Returns the highest upper neighbour (lowest id among equal values);
    /// `None` for maxima.
    #[must_use]
    #[rustfmt::skip]
    pub fn ascent(&self) -> Option<SampleId> { self.ascent }

    /// Returns the lowest lower neighbour (lowest id among equal values);
    /// `None` for minima.
    #[must_use]
    #[rustfmt::skip]
    pub fn descent(&self) -> Option<SampleId> { self.descent }

    /// Returns the number of connected components of the upper link.
    #[must_use]
    #[rustfmt::skip]
    pub fn upper_components(&self) -> usize { self.upper_components }

    /// Returns the number of connected components of the lower link.
    #[must_use]
    #[rustfmt::skip]
    pub fn lower_components(&self) -> usize { self.lower_components }
}

/// Number of samples of each kind.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticalCounts {
    /// Local minima.
    pub minima: usize,
    /// Local maxima.
    pub maxima: usize,
    /// Saddles.
    pub saddles: usize,
    /// Regular samples.
    pub regular: usize,
}

/// Per-sample classification indexed by [`SampleId`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    points: Vec<Option<CriticalPoint>>,
}

impl Classification {
    /// Returns the classification of `sample`, or `None` when the sample was
    /// excluded from the graph.
    #[must_use]
    pub fn point(&self, sample: SampleId) -> Option<&CriticalPoint> {
        self.points.get(sample).and_then(Option::as_ref)
    }

    /// Returns the kind of `sample`, or `None` when it was excluded.
    #[must_use]
    pub fn kind(&self, sample: SampleId) -> Option<CriticalKind> {
        self.point(sample).map(CriticalPoint::kind)
    }

    /// Returns the number of samples covered, including excluded ones.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.points.len() }

    /// Returns whether no samples are covered.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Returns the ids of every sample of `kind` in ascending order.
    #[must_use]
    pub fn samples_of(&self, kind: CriticalKind) -> Vec<SampleId> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(sample, point)| {
                point
                    .filter(|point| point.kind == kind)
                    .map(|_| sample)
            })
            .collect()
    }

    /// Tallies the samples of each kind.
    #[must_use]
    pub fn counts(&self) -> CriticalCounts {
        let mut counts = CriticalCounts::default();
        for point in self.points.iter().flatten() {
            match point.kind {
                CriticalKind::Minimum => counts.minima += 1,
                CriticalKind::Maximum => counts.maxima += 1,
                CriticalKind::Saddle => counts.saddles += 1,
                CriticalKind::Regular => counts.regular += 1,
            }
        }
        counts
    }
}

/// Counts the connected components of `link` in the graph induced on it.
fn link_components(graph: &NeighborhoodGraph, link: &[SampleId]) -> usize {
    if link.len() < 2 {
        return link.len();
    }
    let mut set = DisjointSet::new(link.len());
    for (i, &left) in link.iter().enumerate() {
        for (j, &right) in link.iter().enumerate().skip(i + 1) {
            if graph.contains_edge(left, right) {
                set.union(i, j);
            }
        }
    }
    (0..link.len()).filter(|&idx| set.find(idx) == idx).count()
}

fn classify_sample(values: &[f64], graph: &NeighborhoodGraph, sample: SampleId) -> Option<CriticalPoint> {
    let neighbours = graph.neighbours(sample);
    if neighbours.is_empty() {
        return None;
    }
    let (upper, lower): (Vec<SampleId>, Vec<SampleId>) = neighbours
        .iter()
        .partition(|&&other| compare_samples(values, other, sample) == Ordering::Greater);

    // Ties on value resolve to the lowest id for both pointers.
    let ascent = upper.iter().copied().max_by(|&a, &b| {
        values[a]
            .total_cmp(&values[b])
            .then_with(|| b.cmp(&a))
    });
    let descent = lower.iter().copied().min_by(|&a, &b| {
        values[a]
            .total_cmp(&values[b])
            .then_with(|| a.cmp(&b))
    });

    let upper_components = link_components(graph, &upper);
    let lower_components = link_components(graph, &lower);
    let kind = match (upper_components, lower_components) {
        (0, _) => CriticalKind::Maximum,
        (_, 0) => CriticalKind::Minimum,
        (1, 1) => CriticalKind::Regular,
        _ => CriticalKind::Saddle,
    };

    Some(CriticalPoint {
        kind,
        ascent,
        descent,
        upper_components,
        lower_components,
    })
}

/// Classifies every active sample of `graph`.
///
/// # Errors
/// Returns [`crate::TopoSpineError::BackendUnavailable`] for an unsupported
/// `strategy`.
///
/// # Examples
/// ```
/// use topospine_core::{
///     CriticalKind, ExecutionStrategy, GridShape, NeighborhoodPolicy, SampleSet,
///     build_neighborhood, classify,
/// };
///
/// let samples = SampleSet::from_grid("line", GridShape::new(vec![3]), vec![1.0, 3.0, 2.0])?;
/// let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Auto)?;
/// let classification = classify(&samples, &graph, ExecutionStrategy::Auto)?;
/// assert_eq!(classification.kind(1), Some(CriticalKind::Maximum));
/// assert_eq!(classification.point(2).and_then(|p| p.ascent()), Some(1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.classify",
    err,
    skip(samples, graph),
    fields(sample_set = %samples.name(), samples = samples.len()),
)]
pub fn classify(
    samples: &SampleSet,
    graph: &NeighborhoodGraph,
    strategy: ExecutionStrategy,
) -> Result<Classification> {
    let parallel = strategy.resolve()?;
    let values = samples.values();
    let points = map_indices(graph.len(), parallel, |sample| {
        classify_sample(values, graph, sample)
    });
    let classification = Classification { points };
    let counts = classification.counts();
    info!(
        minima = counts.minima,
        maxima = counts.maxima,
        saddles = counts.saddles,
        regular = counts.regular,
        "samples classified"
    );
    Ok(classification)
}

#[cfg(test)]
mod tests;
