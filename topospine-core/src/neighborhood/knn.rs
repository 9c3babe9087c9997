//! Brute-force k-nearest-neighbour lists.
//!
//! Candidates are ranked by `(distance, id)`, so equidistant samples resolve
//! to the lower id and the lists are reproducible across schedules.

use crate::{
    distance::DistanceMetric,
    parallel::map_indices,
    samples::{SampleId, SampleSet},
};

/// Returns the `k` nearest finite samples of every finite sample.
///
/// `k` is clamped to the number of available candidates.
pub(super) fn nearest_neighbours(
    samples: &SampleSet,
    k: usize,
    metric: DistanceMetric,
    parallel: bool,
) -> Vec<Vec<SampleId>> {
    let values = samples.values();
    map_indices(samples.len(), parallel, |query| {
        if !values[query].is_finite() {
            return Vec::new();
        }
        let Some(origin) = samples.coordinates(query) else {
            return Vec::new();
        };
        let mut candidates: Vec<(f64, SampleId)> = (0..samples.len())
            .filter(|&other| other != query && values[other].is_finite())
            .filter_map(|other| {
                samples
                    .coordinates(other)
                    .map(|coords| (metric.distance(origin, coords), other))
            })
            .collect();
        let take = k.min(candidates.len());
        if take == 0 {
            return Vec::new();
        }
        let by_rank = |a: &(f64, SampleId), b: &(f64, SampleId)| {
            a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1))
        };
        if take < candidates.len() {
            candidates.select_nth_unstable_by(take - 1, by_rank);
            candidates.truncate(take);
        }
        candidates.into_iter().map(|(_, id)| id).collect()
    })
}
