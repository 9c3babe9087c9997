//! Result types for topology runs.
//!
//! A [`TopologyReport`] carries every stage output so collaborators can
//! consume the segmentation, extremum graph and spine without re-deriving
//! them, and audit the intermediate stages when results look surprising.

use std::sync::Arc;

use crate::{
    basins::Basins,
    classify::{Classification, CriticalCounts},
    error::SampleDataError,
    hierarchy::ExtremumGraph,
    neighborhood::NeighborhoodGraph,
    samples::SampleId,
    segmentation::Segmentation,
    spine::Spine,
};

/// Per-sample problems encountered during a run that did not abort it.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    /// Samples whose scalar value was NaN or infinite.
    pub non_finite: Vec<SampleDataError>,
    /// Finite samples without any finite neighbour.
    pub isolated: Vec<SampleId>,
    /// Connected components of the neighbourhood graph.
    pub component_count: usize,
    /// Critical point counts of the classified samples.
    pub counts: CriticalCounts,
}

impl Diagnostics {
    /// Returns the number of samples excluded from classification.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.non_finite.len() + self.isolated.len()
    }
}

/// Represents the output of a [`crate::TopoSpine::run`] invocation.
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
/// let report = TopoSpineBuilder::new().build()?.run(&samples)?;
/// assert_eq!(report.sample_set_name(), "ridge");
/// assert_eq!(report.diagnostics().counts.maxima, 3);
/// assert_eq!(report.extremum_graph().surviving_count(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct TopologyReport {
    pub(crate) sample_set: Arc<str>,
    pub(crate) neighborhood: NeighborhoodGraph,
    pub(crate) classification: Classification,
    pub(crate) basins: Basins,
    pub(crate) extremum_graph: ExtremumGraph,
    pub(crate) segmentation: Segmentation,
    pub(crate) spine: Spine,
}

impl TopologyReport {
    /// Returns the name of the analysed sample set.
    #[must_use]
    pub fn sample_set_name(&self) -> &str {
        &self.sample_set
    }

    /// Returns the symmetric neighbourhood graph.
    #[must_use]
    #[rustfmt::skip]
    pub fn neighborhood(&self) -> &NeighborhoodGraph { &self.neighborhood }

    /// Returns the critical point classification.
    #[must_use]
    #[rustfmt::skip]
    pub fn classification(&self) -> &Classification { &self.classification }

    /// Returns the unsimplified ascending and descending basins.
    #[must_use]
    #[rustfmt::skip]
    pub fn basins(&self) -> &Basins { &self.basins }

    /// Returns the simplified extremum graph and its full merge log.
    #[must_use]
    #[rustfmt::skip]
    pub fn extremum_graph(&self) -> &ExtremumGraph { &self.extremum_graph }

    /// Returns the post-simplification segmentation.
    #[must_use]
    #[rustfmt::skip]
    pub fn segmentation(&self) -> &Segmentation { &self.segmentation }

    /// Returns the spine layout of the extremum hierarchy.
    #[must_use]
    #[rustfmt::skip]
    pub fn spine(&self) -> &Spine { &self.spine }

    /// Collects the non-fatal per-sample problems of the run.
    ///
    /// # Examples
    /// ```
    /// use topospine_core::{GridShape, SampleSet, TopoSpineBuilder};
    ///
    /// let samples = SampleSet::from_grid(
    ///     "gap",
    ///     GridShape::new(vec![4]),
    ///     vec![1.0, f64::NAN, 2.0, 3.0],
    /// )?;
    /// let report = TopoSpineBuilder::new().build()?.run(&samples)?;
    /// let diagnostics = report.diagnostics();
    /// assert_eq!(diagnostics.non_finite[0].sample(), 1);
    /// assert_eq!(diagnostics.isolated, vec![0]);
    /// assert_eq!(report.segmentation().label(0), None);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            non_finite: self.neighborhood.non_finite().to_vec(),
            isolated: self.neighborhood.isolated().to_vec(),
            component_count: self.neighborhood.component_count(),
            counts: self.classification.counts(),
        }
    }
}
