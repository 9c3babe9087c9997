//! Binary merge tree over the merge log and its post-order leaf layout.
//!
//! Leaves are extrema; every merge event adds an internal node whose first
//! child is the subtree of the absorbed extremum and whose second child is
//! the subtree of the survivor. Visiting the absorbed child first lays the
//! less persistent branch out before the branch it merged into, so every
//! subtree occupies a contiguous run of leaf slots.

use std::cmp::Ordering;

use crate::{
    Result,
    error::TopoSpineError,
    hierarchy::{ExtremumGraph, ExtremumNode, Polarity},
    union_find::DisjointSet,
};

/// Leaf slot span `[first, last]` of a tree node.
pub(super) type Span = (usize, usize);

/// Slot of every extremum plus the spans the layout needs.
#[derive(Debug)]
pub(super) struct Layout {
    /// Leaf slot per extremum index.
    pub(super) slot: Vec<usize>,
    /// Span of the highest subtree each extremum represents.
    pub(super) range: Vec<Span>,
    /// `(absorbed, survivor)` extremum indices per merge event.
    pub(super) events: Vec<(usize, usize)>,
}

fn extremum_index(graph: &ExtremumGraph, sample: usize) -> Result<usize> {
    graph
        .extrema()
        .binary_search_by_key(&sample, |node| node.sample)
        .map_err(|_| TopoSpineError::InvariantViolation {
            invariant: "merge events reference extrema",
            sample,
        })
}

fn strength(polarity: Polarity, left: &ExtremumNode, right: &ExtremumNode) -> Ordering {
    let order = left
        .value
        .total_cmp(&right.value)
        .then_with(|| left.sample.cmp(&right.sample));
    match polarity {
        Polarity::Maxima => order,
        Polarity::Minima => order.reverse(),
    }
}

/// Lays out every extremum of `graph` along the spine.
pub(super) fn layout(graph: &ExtremumGraph) -> Result<Layout> {
    let extrema = graph.extrema();
    let leaves = extrema.len();
    let mut set = DisjointSet::new(leaves);
    let mut top: Vec<usize> = (0..leaves).collect();
    let mut children: Vec<(usize, usize)> = Vec::with_capacity(graph.merge_log().len());
    let mut absorbed_at: Vec<Option<usize>> = vec![None; leaves];
    let mut events = Vec::with_capacity(graph.merge_log().len());

    for event in graph.merge_log() {
        let absorbed = extremum_index(graph, event.absorbed)?;
        let survivor = extremum_index(graph, event.survivor)?;
        let absorbed_root = set.find(absorbed);
        let survivor_root = set.find(survivor);
        if absorbed_root == survivor_root {
            return Err(TopoSpineError::InvariantViolation {
                invariant: "merge events join distinct basins",
                sample: event.saddle,
            });
        }
        events.push((absorbed, survivor));
        absorbed_at[absorbed] = Some(top[absorbed_root]);
        children.push((top[absorbed_root], top[survivor_root]));
        let root = set.absorb(absorbed, survivor);
        top[root] = leaves + children.len() - 1;
    }

    let root_ids: Vec<usize> = (0..leaves).filter(|&idx| set.find(idx) == idx).collect();
    let mut roots: Vec<(usize, usize)> = root_ids
        .into_iter()
        .map(|root| (top[root], set.representative[root]))
        .collect();
    roots.sort_by(|a, b| strength(graph.polarity(), &extrema[a.1], &extrema[b.1]));

    let mut span: Vec<Span> = vec![(0, 0); leaves + children.len()];
    let mut slot = vec![0; leaves];
    let mut next = 0;
    let mut stack: Vec<(usize, bool)> = Vec::new();
    for &(root, _) in &roots {
        stack.push((root, false));
        while let Some((node, expanded)) = stack.pop() {
            if node < leaves {
                slot[node] = next;
                span[node] = (next, next);
                next += 1;
                continue;
            }
            let (absorbed, survivor) = children[node - leaves];
            if expanded {
                span[node] = (span[absorbed].0, span[survivor].1);
            } else {
                stack.push((node, true));
                stack.push((survivor, false));
                stack.push((absorbed, false));
            }
        }
    }

    let mut range = vec![(0, 0); leaves];
    for &(root, representative) in &roots {
        range[representative] = span[root];
    }
    for (idx, node) in absorbed_at.iter().enumerate() {
        if let Some(node) = node {
            range[idx] = span[*node];
        }
    }

    Ok(Layout {
        slot,
        range,
        events,
    })
}
