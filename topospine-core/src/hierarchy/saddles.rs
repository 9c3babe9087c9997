//! Candidate saddles between neighbouring basins.
//!
//! Every neighbourhood edge whose endpoints lie in different basins can
//! connect those basins. The connection appears at the endpoint that is
//! reached last when sweeping from the extrema: the lower endpoint for
//! maxima, the higher one for minima. Per basin pair only the latest such
//! endpoint is kept, which is the least persistent saddle of the pair.

use std::{cmp::Ordering, collections::BTreeMap};

use super::Polarity;
use crate::{
    classify::compare_samples, neighborhood::NeighborhoodGraph, samples::SampleId,
};

/// A saddle between the basins of two extrema, identified by their indices
/// into the sorted extremum list (`left < right`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct SaddleCandidate {
    pub(super) saddle: SampleId,
    pub(super) left: usize,
    pub(super) right: usize,
}

/// Collects the least persistent saddle of every adjacent basin pair,
/// ordered by `(left, right)`.
pub(super) fn collect_candidates(
    graph: &NeighborhoodGraph,
    values: &[f64],
    labels: &[Option<SampleId>],
    extrema: &[SampleId],
    polarity: Polarity,
) -> Vec<SaddleCandidate> {
    let index_of = |sample: SampleId| extrema.binary_search(&sample).ok();
    let mut best: BTreeMap<(usize, usize), SampleId> = BTreeMap::new();

    for (a, b) in graph.edges() {
        let (Some(basin_a), Some(basin_b)) = (labels[a], labels[b]) else {
            continue;
        };
        if basin_a == basin_b {
            continue;
        }
        let (Some(ia), Some(ib)) = (index_of(basin_a), index_of(basin_b)) else {
            continue;
        };
        let saddle = match (polarity, compare_samples(values, a, b)) {
            (Polarity::Maxima, Ordering::Less) | (Polarity::Minima, Ordering::Greater) => a,
            _ => b,
        };
        best.entry((ia.min(ib), ia.max(ib)))
            .and_modify(|current| {
                if polarity.strength_cmp(values, *current, saddle) == Ordering::Less {
                    *current = saddle;
                }
            })
            .or_insert(saddle);
    }

    best.into_iter()
        .map(|((left, right), saddle)| SaddleCandidate { saddle, left, right })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ridge_input;

    #[test]
    fn ridge_has_one_saddle_per_adjacent_peak_pair() {
        let (samples, graph) = ridge_input();
        let labels = vec![Some(1), Some(1), Some(3), Some(3), Some(5), Some(5), Some(5)];
        let candidates =
            collect_candidates(&graph, samples.values(), &labels, &[1, 3, 5], Polarity::Maxima);
        assert_eq!(
            candidates,
            vec![
                SaddleCandidate { saddle: 2, left: 0, right: 1 },
                SaddleCandidate { saddle: 4, left: 1, right: 2 },
            ]
        );
    }

    #[test]
    fn minima_saddles_sit_on_the_higher_endpoint() {
        let (samples, graph) = ridge_input();
        let labels = vec![Some(0), Some(0), Some(2), Some(2), Some(4), Some(6), Some(6)];
        let candidates =
            collect_candidates(&graph, samples.values(), &labels, &[0, 2, 4, 6], Polarity::Minima);
        let saddles: Vec<_> = candidates.iter().map(|c| c.saddle).collect();
        assert_eq!(saddles, vec![1, 3, 5]);
    }
}
