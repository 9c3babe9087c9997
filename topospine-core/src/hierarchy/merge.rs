//! The sequential merge loop behind the extremum graph.
//!
//! Saddles are popped from a min-heap keyed by `(weight, saddle, edge)`.
//! A popped saddle whose basins gained a new representative since it was
//! keyed is re-scored and pushed back instead of executed; with a
//! [`MergeWeight`] that never decreases as representatives strengthen,
//! executed weights are non-decreasing and the log is unique for a given
//! input.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BTreeMap, BinaryHeap},
};

use tracing::debug;

use super::{Polarity, saddles::SaddleCandidate, weight::MergeWeight};
use crate::{samples::SampleId, union_find::DisjointSet};

/// One executed cancellation, in extremum indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct MergeStep {
    pub(super) saddle: SampleId,
    pub(super) absorbed: usize,
    pub(super) survivor: usize,
    pub(super) weight: f64,
}

#[derive(Clone, Copy, Debug)]
struct Queued {
    weight: f64,
    saddle: SampleId,
    edge: usize,
    left_rep: usize,
    right_rep: usize,
}

impl Queued {
    fn key(&self) -> (f64, SampleId, usize) {
        (self.weight, self.saddle, self.edge)
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        let (weight, saddle, edge) = self.key();
        let (other_weight, other_saddle, other_edge) = other.key();
        weight
            .total_cmp(&other_weight)
            .then_with(|| saddle.cmp(&other_saddle))
            .then_with(|| edge.cmp(&other_edge))
    }
}

/// Scores saddles against the current representatives of their basins.
pub(super) struct Scorer<'a, W: ?Sized> {
    pub(super) values: &'a [f64],
    pub(super) extrema: &'a [SampleId],
    pub(super) polarity: Polarity,
    pub(super) weight: &'a W,
}

impl<W: MergeWeight + ?Sized> Scorer<'_, W> {
    /// Returns `(weight, weaker, stronger)` for merging the representatives
    /// `left` and `right` through `saddle`.
    pub(super) fn score(&self, saddle: SampleId, left: usize, right: usize) -> (f64, usize, usize) {
        let (weaker, stronger) = match self
            .polarity
            .strength_cmp(self.values, self.extrema[left], self.extrema[right])
        {
            Ordering::Less => (left, right),
            _ => (right, left),
        };
        let weight = self.weight.weight(
            self.values[saddle],
            self.values[self.extrema[weaker]],
            self.values[self.extrema[stronger]],
        );
        (weight, weaker, stronger)
    }
}

/// Cancels every saddle until each connected group of basins has a single
/// representative, returning the full merge log.
pub(super) fn merge_all<W: MergeWeight + ?Sized>(
    scorer: &Scorer<'_, W>,
    candidates: &[SaddleCandidate],
) -> Vec<MergeStep> {
    let mut set = DisjointSet::new(scorer.extrema.len());
    let mut queue: BinaryHeap<Reverse<Queued>> = candidates
        .iter()
        .enumerate()
        .map(|(edge, candidate)| {
            let (weight, _, _) = scorer.score(candidate.saddle, candidate.left, candidate.right);
            Reverse(Queued {
                weight,
                saddle: candidate.saddle,
                edge,
                left_rep: candidate.left,
                right_rep: candidate.right,
            })
        })
        .collect();

    let mut steps = Vec::with_capacity(scorer.extrema.len().saturating_sub(1));
    while let Some(Reverse(queued)) = queue.pop() {
        let candidate = candidates[queued.edge];
        let left_root = set.find(candidate.left);
        let right_root = set.find(candidate.right);
        if left_root == right_root {
            continue;
        }
        let left_rep = set.representative[left_root];
        let right_rep = set.representative[right_root];
        let (weight, weaker, stronger) = scorer.score(candidate.saddle, left_rep, right_rep);
        if (left_rep, right_rep) != (queued.left_rep, queued.right_rep) {
            queue.push(Reverse(Queued {
                weight,
                left_rep,
                right_rep,
                ..queued
            }));
            continue;
        }

        set.absorb(weaker, stronger);
        debug!(
            saddle = candidate.saddle,
            absorbed = scorer.extrema[weaker],
            survivor = scorer.extrema[stronger],
            weight,
            "cancelled saddle"
        );
        steps.push(MergeStep {
            saddle: candidate.saddle,
            absorbed: weaker,
            survivor: stronger,
            weight,
        });
    }
    steps
}

/// Replays a prefix of the merge log.
pub(super) fn replay(extremum_count: usize, steps: &[MergeStep]) -> DisjointSet {
    let mut set = DisjointSet::new(extremum_count);
    for step in steps {
        set.absorb(step.absorbed, step.survivor);
    }
    set
}

/// A saddle edge between two representatives after a replayed prefix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct LiveEdge {
    pub(super) saddle: SampleId,
    pub(super) left: usize,
    pub(super) right: usize,
    pub(super) weight: f64,
}

/// Re-scores every saddle against the representatives in `set`, keeping the
/// cheapest saddle per representative pair.
pub(super) fn live_edges<W: MergeWeight + ?Sized>(
    scorer: &Scorer<'_, W>,
    candidates: &[SaddleCandidate],
    set: &mut DisjointSet,
) -> Vec<LiveEdge> {
    let mut best: BTreeMap<(usize, usize), LiveEdge> = BTreeMap::new();
    for candidate in candidates {
        let left = set.representative_of(candidate.left);
        let right = set.representative_of(candidate.right);
        if left == right {
            continue;
        }
        let (weight, _, _) = scorer.score(candidate.saddle, left, right);
        let edge = LiveEdge {
            saddle: candidate.saddle,
            left: left.min(right),
            right: left.max(right),
            weight,
        };
        best.entry((edge.left, edge.right))
            .and_modify(|current| {
                let cheaper = edge
                    .weight
                    .total_cmp(&current.weight)
                    .then_with(|| edge.saddle.cmp(&current.saddle))
                    .is_lt();
                if cheaper {
                    *current = edge;
                }
            })
            .or_insert(edge);
    }
    best.into_values().collect()
}
