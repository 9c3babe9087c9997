//! Spine layout of the extremum hierarchy.
//!
//! The merge log is read as a binary merge tree and its leaves are laid out
//! left to right by a post-order traversal that visits the absorbed branch
//! before the surviving one. Every extremum receives a leaf position and the
//! range of positions covered by the highest subtree it represents. Ranges
//! nest: an absorbed extremum's range lies strictly inside the range of the
//! extremum it merged into, and more persistent extrema span wider ranges.
//!
//! The spine covers the full hierarchy; entries and edges carry flags saying
//! whether they survive the configured simplification.

#[cfg(feature = "serde")]
mod export;
mod layout;

use tracing::{info, instrument};

use crate::{
    Result,
    hierarchy::{ExtremumGraph, Polarity},
    samples::SampleId,
};

#[cfg(feature = "serde")]
pub use self::export::{LandscapeDocument, LandscapeNode};

/// Closed interval of spine positions.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpineRange {
    /// First position covered.
    pub start: f64,
    /// Last position covered.
    pub end: f64,
}

impl SpineRange {
    /// Returns whether `other` lies within this range.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns whether `other` lies within this range and is smaller.
    #[must_use]
    pub fn strictly_contains(&self, other: &Self) -> bool {
        self.contains(other) && self != other
    }
}

/// Position of one extremum along the spine.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpineEntry {
    /// Extremum sample.
    pub extremum: SampleId,
    /// Leaf position along the spine.
    pub position: f64,
    /// Positions covered by the subtree this extremum represents.
    pub range: SpineRange,
    /// Scalar value at the extremum.
    pub value: f64,
    /// Persistence of the extremum in the full hierarchy.
    pub persistence: f64,
    /// Whether the extremum survives simplification.
    pub surviving: bool,
}

impl SpineEntry {
    /// Returns the 2-D coordinate `[position, value]`.
    #[must_use]
    pub fn point(&self) -> [f64; 2] {
        [self.position, self.value]
    }
}

/// Span of one merge event along the spine.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpineEdge {
    /// Saddle of the merge.
    pub saddle: SampleId,
    /// Extremum removed by the merge.
    pub absorbed: SampleId,
    /// Extremum kept by the merge.
    pub survivor: SampleId,
    /// Weight of the merge.
    pub persistence: f64,
    /// Position of the absorbed extremum.
    pub start: f64,
    /// Position of the survivor.
    pub end: f64,
    /// Whether simplification applied this merge.
    pub cancelled: bool,
}

/// Ordered spine over every extremum of an [`ExtremumGraph`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spine {
    polarity: Polarity,
    entries: Vec<SpineEntry>,
    edges: Vec<SpineEdge>,
}

impl Spine {
    /// Returns the polarity of the laid-out hierarchy.
    #[must_use]
    #[rustfmt::skip]
    pub fn polarity(&self) -> Polarity { self.polarity }

    /// Returns every entry ordered by position.
    #[must_use]
    #[rustfmt::skip]
    pub fn entries(&self) -> &[SpineEntry] { &self.entries }

    /// Returns one edge per merge event, in merge order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[SpineEdge] { &self.edges }

    /// Iterates over the entries of surviving extrema, ordered by position.
    pub fn surviving(&self) -> impl Iterator<Item = &SpineEntry> + '_ {
        self.entries.iter().filter(|entry| entry.surviving)
    }

    /// Looks up the entry of `extremum`.
    #[must_use]
    pub fn entry(&self, extremum: SampleId) -> Option<&SpineEntry> {
        self.entries.iter().find(|entry| entry.extremum == extremum)
    }

    /// Returns the number of entries.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Returns whether the spine has no entries.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

/// Lays [`ExtremumGraph`]s out along a spine.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpineBuilder;

impl SpineBuilder {
    /// Builds the spine of `graph`.
    ///
    /// # Errors
    /// Returns [`crate::TopoSpineError::InvariantViolation`] when the merge
    /// log references unknown extrema or merges a basin with itself.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{GridShape, SampleSet, TopoSpineBuilder};
    ///
    /// let samples = SampleSet::from_grid(
    ///     "ridge",
    ///     GridShape::new(vec![7]),
    ///     vec![0.0, 5.0, 1.0, 6.0, 2.0, 7.0, 0.0],
    /// )?;
    /// let report = TopoSpineBuilder::new().with_target_extrema(Some(2)).build()?.run(&samples)?;
    /// let order: Vec<_> = report.spine().entries().iter().map(|e| e.extremum).collect();
    /// assert_eq!(order, vec![1, 3, 5]);
    /// let peak_one = report.spine().entry(1).expect("peak is laid out");
    /// let peak_three = report.spine().entry(3).expect("peak is laid out");
    /// assert!(peak_three.range.strictly_contains(&peak_one.range));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[instrument(name = "core.spine", err, skip_all, fields(extrema = graph.extrema().len()))]
    pub fn build(&self, graph: &ExtremumGraph) -> Result<Spine> {
        let layout = layout::layout(graph)?;
        let position = |idx: usize| layout.slot[idx] as f64;

        let mut entries: Vec<(usize, SpineEntry)> = graph
            .extrema()
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let (first, last) = layout.range[idx];
                let entry = SpineEntry {
                    extremum: node.sample,
                    position: position(idx),
                    range: SpineRange {
                        start: first as f64,
                        end: last as f64,
                    },
                    value: node.value,
                    persistence: node.persistence,
                    surviving: node.is_surviving(),
                };
                (layout.slot[idx], entry)
            })
            .collect();
        entries.sort_by_key(|(slot, _)| *slot);
        let entries: Vec<SpineEntry> = entries.into_iter().map(|(_, entry)| entry).collect();

        let applied = graph.cancellations().len();
        let edges: Vec<SpineEdge> = graph
            .merge_log()
            .iter()
            .zip(&layout.events)
            .enumerate()
            .map(|(idx, (event, &(absorbed, survivor)))| SpineEdge {
                saddle: event.saddle,
                absorbed: event.absorbed,
                survivor: event.survivor,
                persistence: event.persistence,
                start: position(absorbed),
                end: position(survivor),
                cancelled: idx < applied,
            })
            .collect();

        info!(entries = entries.len(), edges = edges.len(), "spine laid out");
        Ok(Spine {
            polarity: graph.polarity(),
            entries,
            edges,
        })
    }
}
