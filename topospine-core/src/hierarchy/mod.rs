//! Extremum graph construction and persistence simplification.
//!
//! This module implements the merge stage of the pipeline:
//!
//! - Collecting one candidate saddle per pair of adjacent basins (the least
//!   persistent crossing between them).
//! - Running the merge loop to completion: saddles are cancelled in
//!   ascending [`MergeWeight`] order, each time folding the weaker extremum
//!   into the stronger one with a union-find.
//! - Cutting the merge log where the [`StoppingRule`] fires and snapshotting
//!   the surviving extrema and saddles at that point.
//!
//! The merge loop is sequential; it works on extrema and saddles rather than
//! on samples, so it is rarely the dominant cost.

mod merge;
mod saddles;
mod weight;

use std::{cmp::Ordering, fmt, num::NonZeroUsize};

use tracing::{info, instrument};

use crate::{
    Result,
    basins::Basins,
    classify::{Classification, CriticalKind, compare_samples},
    error::TopoSpineError,
    neighborhood::NeighborhoodGraph,
    samples::{SampleId, SampleSet},
};

pub use self::weight::{MergeWeight, Persistence};

use self::{
    merge::{Scorer, live_edges, merge_all, replay},
    saddles::collect_candidates,
};

/// Which extrema the graph is built over.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Polarity {
    /// Maxima with ascending basins (join tree).
    #[default]
    Maxima,
    /// Minima with descending basins (split tree).
    Minima,
}

impl Polarity {
    /// Returns the critical kind of the extrema tracked under this polarity.
    #[must_use]
    pub const fn extremum_kind(self) -> CriticalKind {
        match self {
            Self::Maxima => CriticalKind::Maximum,
            Self::Minima => CriticalKind::Minimum,
        }
    }

    /// Orders samples by topological strength: higher is stronger for
    /// maxima, lower is stronger for minima.
    pub(crate) fn strength_cmp(self, values: &[f64], left: SampleId, right: SampleId) -> Ordering {
        match self {
            Self::Maxima => compare_samples(values, left, right),
            Self::Minima => compare_samples(values, right, left),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maxima => f.write_str("maxima"),
            Self::Minima => f.write_str("minima"),
        }
    }
}

/// Decides where simplification stops along the merge log.
///
/// A merge is applied while its weight is strictly below the threshold and
/// more than the target number of extrema are alive. Without either limit
/// every saddle is cancelled.
///
/// # Examples
/// ```
/// use topospine_core::StoppingRule;
///
/// let rule = StoppingRule::new(Some(2.0), Some(3))?;
/// assert_eq!(rule.threshold(), Some(2.0));
/// assert_eq!(rule.target_extrema(), Some(3));
/// assert!(StoppingRule::new(Some(-0.5), None).is_err());
/// # Ok::<(), topospine_core::TopoSpineError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoppingRule {
    threshold: Option<f64>,
    target_extrema: Option<NonZeroUsize>,
}

impl StoppingRule {
    /// Validates and builds a stopping rule.
    ///
    /// # Errors
    /// Returns [`TopoSpineError::InvalidThreshold`] for a negative or NaN
    /// threshold and [`TopoSpineError::InvalidTargetExtrema`] for a zero
    /// target.
    pub fn new(threshold: Option<f64>, target_extrema: Option<usize>) -> Result<Self> {
        if let Some(got) = threshold
            && (got.is_nan() || got < 0.0)
        {
            return Err(TopoSpineError::InvalidThreshold { got });
        }
        let target_extrema = target_extrema
            .map(|got| NonZeroUsize::new(got).ok_or(TopoSpineError::InvalidTargetExtrema { got }))
            .transpose()?;
        Ok(Self {
            threshold,
            target_extrema,
        })
    }

    /// Returns the persistence threshold.
    #[must_use]
    #[rustfmt::skip]
    pub fn threshold(&self) -> Option<f64> { self.threshold }

    /// Returns the target extremum count.
    #[must_use]
    pub fn target_extrema(&self) -> Option<usize> {
        self.target_extrema.map(NonZeroUsize::get)
    }

    /// Returns how many leading merges of a log with the given weights are
    /// applied, starting from `extremum_count` live extrema.
    #[must_use]
    pub fn cut(&self, weights: impl IntoIterator<Item = f64>, extremum_count: usize) -> usize {
        let mut applied = 0;
        for weight in weights {
            let over_threshold = self
                .threshold
                .is_some_and(|threshold| weight.total_cmp(&threshold).is_ge());
            let at_target = self
                .target_extrema
                .is_some_and(|target| extremum_count.saturating_sub(applied) <= target.get());
            if over_threshold || at_target {
                break;
            }
            applied += 1;
        }
        applied
    }
}

/// One extremum of the graph, surviving or cancelled.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtremumNode {
    /// Sample holding the extremum.
    pub sample: SampleId,
    /// Scalar value at the extremum.
    pub value: f64,
    /// Weight of the merge that absorbs this extremum in the full hierarchy,
    /// or infinity for the strongest extremum of its component.
    pub persistence: f64,
    /// Surviving extremum this one is folded into after simplification;
    /// equal to `sample` for survivors.
    pub representative: SampleId,
}

impl ExtremumNode {
    /// Returns whether the extremum survives simplification.
    #[must_use]
    pub fn is_surviving(&self) -> bool {
        self.representative == self.sample
    }
}

/// A saddle connecting two surviving extrema.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaddleEdge {
    /// Saddle sample.
    pub saddle: SampleId,
    /// Extremum with the lower sample id.
    pub left: SampleId,
    /// Extremum with the higher sample id.
    pub right: SampleId,
    /// Weight of cancelling this saddle next.
    pub persistence: f64,
}

/// One cancellation in the merge log.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MergeEvent {
    /// Cancelled saddle.
    pub saddle: SampleId,
    /// Weaker extremum, removed by the merge.
    pub absorbed: SampleId,
    /// Stronger extremum, representing the merged basin.
    pub survivor: SampleId,
    /// Weight that triggered the merge.
    pub persistence: f64,
}

/// Surviving extremum count after a prefix of the merge log.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePoint {
    /// Weight of the last applied merge.
    pub persistence: f64,
    /// Extrema alive after that merge.
    pub surviving: usize,
}

/// Simplified extremum graph plus the full merge hierarchy it was cut from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtremumGraph {
    polarity: Polarity,
    stopping: StoppingRule,
    extrema: Vec<ExtremumNode>,
    edges: Vec<SaddleEdge>,
    merges: Vec<MergeEvent>,
    applied: usize,
}

impl ExtremumGraph {
    /// Returns the polarity the graph was built over.
    #[must_use]
    #[rustfmt::skip]
    pub fn polarity(&self) -> Polarity { self.polarity }

    /// Returns the stopping rule applied to the merge log.
    #[must_use]
    #[rustfmt::skip]
    pub fn stopping_rule(&self) -> StoppingRule { self.stopping }

    /// Returns every extremum, surviving or not, by ascending sample id.
    #[must_use]
    #[rustfmt::skip]
    pub fn extrema(&self) -> &[ExtremumNode] { &self.extrema }

    /// Iterates over the surviving extrema by ascending sample id.
    pub fn nodes(&self) -> impl Iterator<Item = &ExtremumNode> + '_ {
        self.extrema.iter().filter(|node| node.is_surviving())
    }

    /// Returns the number of surviving extrema.
    #[must_use]
    pub fn surviving_count(&self) -> usize {
        self.extrema.len() - self.applied
    }

    /// Looks up the extremum held by `sample`.
    #[must_use]
    pub fn node(&self, sample: SampleId) -> Option<&ExtremumNode> {
        self.extrema
            .binary_search_by_key(&sample, |node| node.sample)
            .ok()
            .map(|idx| &self.extrema[idx])
    }

    /// Returns the surviving extremum that `extremum` was folded into.
    #[must_use]
    pub fn representative(&self, extremum: SampleId) -> Option<SampleId> {
        self.node(extremum).map(|node| node.representative)
    }

    /// Returns the saddles connecting surviving extrema, ordered by their
    /// endpoints.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[SaddleEdge] { &self.edges }

    /// Returns the full merge log in execution order.
    #[must_use]
    #[rustfmt::skip]
    pub fn merge_log(&self) -> &[MergeEvent] { &self.merges }

    /// Returns the merges applied by simplification.
    #[must_use]
    pub fn cancellations(&self) -> &[MergeEvent] {
        &self.merges[..self.applied]
    }

    /// Returns `(persistence, surviving)` after each merge of the full log.
    #[must_use]
    pub fn persistence_curve(&self) -> Vec<CurvePoint> {
        self.merges
            .iter()
            .enumerate()
            .map(|(idx, event)| CurvePoint {
                persistence: event.persistence,
                surviving: self.extrema.len() - idx - 1,
            })
            .collect()
    }

    /// Returns the smallest threshold that leaves at most `count` extrema,
    /// or `None` when disconnected components keep more than `count` alive.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{GridShape, SampleSet, TopoSpineBuilder};
    ///
    /// let samples = SampleSet::from_grid(
    ///     "ridge",
    ///     GridShape::new(vec![5]),
    ///     vec![3.0, 0.0, 5.0, 1.0, 9.0],
    /// )?;
    /// let report = TopoSpineBuilder::new().build()?.run(&samples)?;
    /// let graph = report.extremum_graph();
    /// assert_eq!(graph.threshold_for_count(3), Some(0.0));
    /// assert_eq!(graph.threshold_for_count(1), Some(4.0_f64.next_up()));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn threshold_for_count(&self, count: usize) -> Option<f64> {
        let needed = self.extrema.len().saturating_sub(count);
        if needed == 0 {
            return Some(0.0);
        }
        self.merges
            .get(needed - 1)
            .map(|event| event.persistence.next_up())
    }
}

/// Builds [`ExtremumGraph`]s from classified, basin-assigned samples.
///
/// # Examples
/// ```
/// use topospine_core::{
///     ExecutionStrategy, ExtremumGraphBuilder, GridShape, NeighborhoodPolicy, Polarity,
///     SampleSet, StoppingRule, assign_basins, build_neighborhood, classify,
/// };
///
/// let samples = SampleSet::from_grid(
///     "ridge",
///     GridShape::new(vec![7]),
///     vec![0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0],
/// )?;
/// let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Auto)?;
/// let classification = classify(&samples, &graph, ExecutionStrategy::Auto)?;
/// let basins = assign_basins(&graph, &classification)?;
///
/// let builder = ExtremumGraphBuilder::new(Polarity::Maxima, StoppingRule::new(None, Some(2))?);
/// let extrema = builder.build(&samples, &graph, &classification, &basins)?;
/// let surviving: Vec<_> = extrema.nodes().map(|node| node.sample).collect();
/// assert_eq!(surviving, vec![3, 5]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExtremumGraphBuilder {
    polarity: Polarity,
    stopping: StoppingRule,
}

impl ExtremumGraphBuilder {
    /// Creates a builder for the given polarity and stopping rule.
    #[must_use]
    pub fn new(polarity: Polarity, stopping: StoppingRule) -> Self {
        Self { polarity, stopping }
    }

    /// Builds the graph weighting saddles by [`Persistence`].
    ///
    /// # Errors
    /// See [`Self::build_with_weight`].
    pub fn build(
        &self,
        samples: &SampleSet,
        graph: &NeighborhoodGraph,
        classification: &Classification,
        basins: &Basins,
    ) -> Result<ExtremumGraph> {
        self.build_with_weight(samples, graph, classification, basins, &Persistence)
    }

    /// Builds the graph weighting saddles with `weight`.
    ///
    /// # Errors
    /// Returns [`TopoSpineError::InvariantViolation`] when a basin is rooted
    /// at a sample that is not an extremum of the configured polarity.
    #[instrument(
        name = "core.extremum_graph",
        err,
        skip_all,
        fields(sample_set = %samples.name(), polarity = %self.polarity),
    )]
    pub fn build_with_weight<W: MergeWeight + ?Sized>(
        &self,
        samples: &SampleSet,
        graph: &NeighborhoodGraph,
        classification: &Classification,
        basins: &Basins,
        weight: &W,
    ) -> Result<ExtremumGraph> {
        let values = samples.values();
        let extrema = classification.samples_of(self.polarity.extremum_kind());
        let labels = basins.labels(self.polarity);
        for (sample, label) in labels.iter().enumerate() {
            if let Some(root) = *label
                && extrema.binary_search(&root).is_err()
            {
                return Err(TopoSpineError::InvariantViolation {
                    invariant: "basins are rooted at extrema",
                    sample,
                });
            }
        }

        let candidates = collect_candidates(graph, values, labels, &extrema, self.polarity);
        let scorer = Scorer {
            values,
            extrema: &extrema,
            polarity: self.polarity,
            weight,
        };
        let steps = merge_all(&scorer, &candidates);
        let applied = self
            .stopping
            .cut(steps.iter().map(|step| step.weight), extrema.len());

        let mut persistence = vec![f64::INFINITY; extrema.len()];
        for step in &steps {
            persistence[step.absorbed] = step.weight;
        }
        let mut set = replay(extrema.len(), &steps[..applied]);
        let nodes: Vec<ExtremumNode> = extrema
            .iter()
            .enumerate()
            .map(|(idx, &sample)| ExtremumNode {
                sample,
                value: values[sample],
                persistence: persistence[idx],
                representative: extrema[set.representative_of(idx)],
            })
            .collect();
        let edges = live_edges(&scorer, &candidates, &mut set)
            .into_iter()
            .map(|edge| SaddleEdge {
                saddle: edge.saddle,
                left: extrema[edge.left],
                right: extrema[edge.right],
                persistence: edge.weight,
            })
            .collect();
        let merges: Vec<MergeEvent> = steps
            .iter()
            .map(|step| MergeEvent {
                saddle: step.saddle,
                absorbed: extrema[step.absorbed],
                survivor: extrema[step.survivor],
                persistence: step.weight,
            })
            .collect();

        let extremum_graph = ExtremumGraph {
            polarity: self.polarity,
            stopping: self.stopping,
            extrema: nodes,
            edges,
            merges,
            applied,
        };
        info!(
            extrema = extremum_graph.extrema.len(),
            saddles = candidates.len(),
            cancelled = applied,
            surviving = extremum_graph.surviving_count(),
            "extremum graph built"
        );
        Ok(extremum_graph)
    }
}
