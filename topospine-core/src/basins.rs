//! Basin assignment by following steepest-ascent and steepest-descent
//! pointers.
//!
//! Every active sample resolves to the extremum its pointer chain ends at.
//! Resolved basins are memoised, so each sample is walked at most once and
//! the pass is linear overall. Chains strictly climb the `(value, id)` order
//! and therefore cannot cycle; a chain longer than the sample count is
//! reported as an invariant violation rather than looping.

use tracing::{info, instrument};

use crate::{
    Result,
    classify::{Classification, CriticalKind, CriticalPoint},
    error::TopoSpineError,
    hierarchy::Polarity,
    neighborhood::NeighborhoodGraph,
    samples::SampleId,
};

/// Basins meeting at a saddle: those of the saddle and its neighbours.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaddleBasins {
    /// The saddle sample.
    pub saddle: SampleId,
    /// Distinct ascending basins (maxima) meeting at the saddle, ascending.
    pub ascending: Vec<SampleId>,
    /// Distinct descending basins (minima) meeting at the saddle, ascending.
    pub descending: Vec<SampleId>,
}

/// Ascending and descending basin of every sample.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Basins {
    ascending: Vec<Option<SampleId>>,
    descending: Vec<Option<SampleId>>,
    saddles: Vec<SaddleBasins>,
}

impl Basins {
    /// Returns the maximum whose ascending basin holds `sample`.
    #[must_use]
    pub fn ascending(&self, sample: SampleId) -> Option<SampleId> {
        self.ascending.get(sample).copied().flatten()
    }

    /// Returns the minimum whose descending basin holds `sample`.
    #[must_use]
    pub fn descending(&self, sample: SampleId) -> Option<SampleId> {
        self.descending.get(sample).copied().flatten()
    }

    /// Returns the basin of `sample` for the given polarity.
    #[must_use]
    pub fn basin(&self, polarity: Polarity, sample: SampleId) -> Option<SampleId> {
        match polarity {
            Polarity::Maxima => self.ascending(sample),
            Polarity::Minima => self.descending(sample),
        }
    }

    /// Returns the per-sample basins for the given polarity.
    #[must_use]
    pub fn labels(&self, polarity: Polarity) -> &[Option<SampleId>] {
        match polarity {
            Polarity::Maxima => &self.ascending,
            Polarity::Minima => &self.descending,
        }
    }

    /// Returns every saddle with the basins it separates, by ascending id.
    #[must_use]
    #[rustfmt::skip]
    pub fn saddles(&self) -> &[SaddleBasins] { &self.saddles }
}

/// Resolves every sample's basin under one pointer direction.
fn follow_pointers(
    classification: &Classification,
    step: fn(&CriticalPoint) -> Option<SampleId>,
) -> Result<Vec<Option<SampleId>>> {
    let len = classification.len();
    let mut resolved: Vec<Option<SampleId>> = vec![None; len];
    let mut path = Vec::new();

    for start in 0..len {
        if resolved[start].is_some() || classification.point(start).is_none() {
            continue;
        }
        path.clear();
        let mut current = start;
        let root = loop {
            if let Some(root) = resolved[current] {
                break root;
            }
            let point = classification.point(current).ok_or(
                TopoSpineError::InvariantViolation {
                    invariant: "pointer targets an excluded sample",
                    sample: current,
                },
            )?;
            path.push(current);
            match step(point) {
                None => break current,
                Some(_) if path.len() > len => {
                    return Err(TopoSpineError::InvariantViolation {
                        invariant: "steepest pointer chains are acyclic",
                        sample: start,
                    });
                }
                Some(next) => current = next,
            }
        };
        for &visited in &path {
            resolved[visited] = Some(root);
        }
    }
    Ok(resolved)
}

fn distinct_basins(link: impl Iterator<Item = SampleId>, basins: &[Option<SampleId>]) -> Vec<SampleId> {
    let mut ids: Vec<SampleId> = link.filter_map(|sample| basins[sample]).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Assigns every active sample to its ascending and descending basin.
///
/// # Errors
/// Returns [`TopoSpineError::InvariantViolation`] when a pointer chain
/// leaves the active samples or exceeds the sample count.
///
/// # Examples
/// ```
/// use topospine_core::{
///     ExecutionStrategy, GridShape, NeighborhoodPolicy, SampleSet, assign_basins,
///     build_neighborhood, classify,
/// };
///
/// let samples = SampleSet::from_grid("line", GridShape::new(vec![4]), vec![0.0, 2.0, 1.0, 3.0])?;
/// let graph = build_neighborhood(&samples, &NeighborhoodPolicy::grid(1), ExecutionStrategy::Auto)?;
/// let classification = classify(&samples, &graph, ExecutionStrategy::Auto)?;
/// let basins = assign_basins(&graph, &classification)?;
/// assert_eq!(basins.ascending(0), Some(1));
/// assert_eq!(basins.ascending(2), Some(3));
/// assert_eq!(basins.descending(1), Some(0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(name = "core.basins", err, skip_all, fields(samples = classification.len()))]
pub fn assign_basins(graph: &NeighborhoodGraph, classification: &Classification) -> Result<Basins> {
    let ascending = follow_pointers(classification, CriticalPoint::ascent)?;
    let descending = follow_pointers(classification, CriticalPoint::descent)?;

    let saddles: Vec<SaddleBasins> = classification
        .samples_of(CriticalKind::Saddle)
        .into_iter()
        .map(|saddle| {
            let star = || std::iter::once(saddle).chain(graph.neighbours(saddle).iter().copied());
            SaddleBasins {
                saddle,
                ascending: distinct_basins(star(), &ascending),
                descending: distinct_basins(star(), &descending),
            }
        })
        .collect();

    info!(
        maxima = classification.counts().maxima,
        minima = classification.counts().minima,
        saddles = saddles.len(),
        "basins assigned"
    );
    Ok(Basins {
        ascending,
        descending,
        saddles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::ExecutionStrategy, classify::classify, neighborhood::NeighborhoodPolicy,
        test_utils::{grid_pipeline_input, ridge_input},
    };

    #[test]
    fn ridge_basins_follow_steepest_ascent() {
        let (samples, graph) = ridge_input();
        let classification = classify(&samples, &graph, ExecutionStrategy::Sequential).expect("classifies");
        let basins = assign_basins(&graph, &classification).expect("assigns");

        let ascending: Vec<_> = (0..7).map(|s| basins.ascending(s)).collect();
        assert_eq!(
            ascending,
            vec![Some(1), Some(1), Some(3), Some(3), Some(5), Some(5), Some(5)]
        );
        let descending: Vec<_> = (0..7).map(|s| basins.descending(s)).collect();
        assert_eq!(
            descending,
            vec![Some(0), Some(0), Some(2), Some(2), Some(4), Some(6), Some(6)]
        );
        assert_eq!(basins.basin(Polarity::Minima, 3), Some(2));
    }

    #[test]
    fn saddle_records_the_basins_it_separates() {
        let values = vec![
            9.0, 4.0, 0.0, //
            4.0, 5.0, 6.0, //
            0.0, 6.0, 9.0,
        ];
        let policy = NeighborhoodPolicy::Grid {
            radius: 1,
            stencil: crate::Stencil::Cross,
        };
        let (samples, graph) = grid_pipeline_input(vec![3, 3], values, policy);
        let classification = classify(&samples, &graph, ExecutionStrategy::Sequential).expect("classifies");
        let basins = assign_basins(&graph, &classification).expect("assigns");

        let saddle = basins
            .saddles()
            .iter()
            .find(|record| record.saddle == 4)
            .expect("centre is a saddle");
        assert_eq!(saddle.ascending.len(), 2);
        assert_eq!(saddle.descending.len(), 2);
    }

    #[test]
    fn excluded_samples_have_no_basin() {
        let (samples, graph) = grid_pipeline_input(
            vec![4],
            vec![f64::NAN, 0.0, 1.0, 0.5],
            NeighborhoodPolicy::grid(1),
        );
        let classification = classify(&samples, &graph, ExecutionStrategy::Sequential).expect("classifies");
        let basins = assign_basins(&graph, &classification).expect("assigns");
        assert_eq!(basins.ascending(0), None);
        assert_eq!(basins.ascending(1), Some(2));
        assert_eq!(basins.descending(2), Some(1));
        assert_eq!(basins.labels(Polarity::Maxima).len(), 4);
    }
}
