//! Post-simplification segmentation.
//!
//! Each sample is relabelled with the surviving extremum its original basin
//! was folded into. Labels are read from the final merge state only, so no
//! sample ever carries an intermediate basin id.

use std::collections::BTreeMap;

use tracing::{info, instrument};

use crate::{basins::Basins, hierarchy::ExtremumGraph, samples::SampleId};

/// Final basin of every sample, indexed by [`SampleId`].
///
/// Excluded samples (non-finite or isolated) have no basin.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segmentation {
    labels: Vec<Option<SampleId>>,
}

impl Segmentation {
    /// Returns the per-sample labels.
    #[must_use]
    #[rustfmt::skip]
    pub fn labels(&self) -> &[Option<SampleId>] { &self.labels }

    /// Returns the surviving extremum whose basin holds `sample`.
    #[must_use]
    pub fn label(&self, sample: SampleId) -> Option<SampleId> {
        self.labels.get(sample).copied().flatten()
    }

    /// Returns the number of labelled samples, including excluded ones.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.labels.len() }

    /// Returns whether the segmentation covers no samples.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Returns the number of samples in each basin, keyed by extremum.
    #[must_use]
    pub fn basin_sizes(&self) -> BTreeMap<SampleId, usize> {
        let mut sizes = BTreeMap::new();
        for label in self.labels.iter().flatten() {
            *sizes.entry(*label).or_insert(0) += 1;
        }
        sizes
    }

    /// Returns the number of distinct basins.
    #[must_use]
    pub fn basin_count(&self) -> usize {
        self.basin_sizes().len()
    }

    /// Returns the samples of the basin rooted at `extremum`, ascending.
    #[must_use]
    pub fn members(&self, extremum: SampleId) -> Vec<SampleId> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(sample, label)| (*label == Some(extremum)).then_some(sample))
            .collect()
    }

    /// Returns the number of samples without a basin.
    #[must_use]
    pub fn unassigned(&self) -> usize {
        self.labels.iter().filter(|label| label.is_none()).count()
    }
}

/// Relabels every sample with its post-simplification basin.
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
/// let segmentation = report.segmentation();
/// assert_eq!(segmentation.members(3), vec![0, 1, 2, 3]);
/// assert_eq!(segmentation.basin_count(), 2);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
#[instrument(name = "core.segmentation", skip_all, fields(samples = basins.labels(graph.polarity()).len()))]
pub fn label_segmentation(basins: &Basins, graph: &ExtremumGraph) -> Segmentation {
    let labels: Vec<Option<SampleId>> = basins
        .labels(graph.polarity())
        .iter()
        .map(|basin| basin.and_then(|root| graph.representative(root)))
        .collect();
    let segmentation = Segmentation { labels };
    info!(
        basins = segmentation.basin_count(),
        unassigned = segmentation.unassigned(),
        "segmentation labelled"
    );
    segmentation
}
