//! Stencil neighbourhoods over regular grids.

use super::Stencil;
use crate::{
    parallel::map_indices,
    samples::{GridShape, SampleId},
};

/// Enumerates the non-zero offsets of a stencil of the given rank.
///
/// Each axis spans `-reach..=reach`; the cross stencil additionally keeps
/// offsets whose Manhattan length is at most `radius`.
fn stencil_offsets(rank: usize, reach: usize, radius: usize, stencil: Stencil) -> Vec<Vec<isize>> {
    let width = reach.saturating_mul(2).saturating_add(1);
    let total = (0..rank).fold(1usize, |acc, _| acc.saturating_mul(width));
    let shift = isize::try_from(reach).unwrap_or(isize::MAX);
    let mut offsets = Vec::new();
    for code in 0..total {
        let mut rest = code;
        let offset: Vec<isize> = (0..rank)
            .map(|_| {
                let digit = isize::try_from(rest % width).unwrap_or(isize::MAX) - shift;
                rest /= width;
                digit
            })
            .collect();
        if offset.iter().all(|&d| d == 0) {
            continue;
        }
        let keep = match stencil {
            Stencil::Box => true,
            Stencil::Cross => {
                offset
                    .iter()
                    .map(|d| d.unsigned_abs())
                    .fold(0usize, usize::saturating_add)
                    <= radius
            }
        };
        if keep {
            offsets.push(offset);
        }
    }
    offsets
}

/// Largest per-axis offset that can stay inside `shape`.
fn axis_reach(shape: &GridShape, radius: usize) -> usize {
    let longest = shape.extents().iter().copied().max().unwrap_or(1);
    radius.min(longest.saturating_sub(1))
}

/// Returns the in-bounds stencil neighbours of every cell.
///
/// Cells and neighbours with non-finite values are skipped.
pub(super) fn stencil_neighbours(
    shape: &GridShape,
    values: &[f64],
    radius: usize,
    stencil: Stencil,
    parallel: bool,
) -> Vec<Vec<SampleId>> {
    let offsets = stencil_offsets(shape.rank(), axis_reach(shape, radius), radius, stencil);
    let extents = shape.extents();

    map_indices(values.len(), parallel, |cell| {
        if !values[cell].is_finite() {
            return Vec::new();
        }
        let mut origin = vec![0; shape.rank()];
        shape.unravel(cell, &mut origin);
        let mut target = vec![0; shape.rank()];
        offsets
            .iter()
            .filter_map(|offset| {
                for (axis, &delta) in offset.iter().enumerate() {
                    let moved = origin[axis].checked_add_signed(delta)?;
                    if moved >= extents[axis] {
                        return None;
                    }
                    target[axis] = moved;
                }
                let neighbour = shape.ravel(&target);
                values[neighbour].is_finite().then_some(neighbour)
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::line_box(1, 1, Stencil::Box, 2)]
    #[case::plane_box(2, 1, Stencil::Box, 8)]
    #[case::plane_cross(2, 1, Stencil::Cross, 4)]
    #[case::plane_cross_r2(2, 2, Stencil::Cross, 12)]
    #[case::volume_box(3, 1, Stencil::Box, 26)]
    #[case::volume_cross(3, 1, Stencil::Cross, 6)]
    fn stencil_sizes_match_lattice_balls(
        #[case] rank: usize,
        #[case] radius: usize,
        #[case] stencil: Stencil,
        #[case] expected: usize,
    ) {
        assert_eq!(stencil_offsets(rank, radius, radius, stencil).len(), expected);
    }

    #[test]
    fn corner_cells_see_only_in_bounds_neighbours() {
        let shape = GridShape::new(vec![3, 3]);
        let lists = stencil_neighbours(&shape, &[0.0; 9], 1, Stencil::Cross, false);
        let mut corner = lists[0].clone();
        corner.sort_unstable();
        assert_eq!(corner, vec![1, 3]);
        assert_eq!(lists[4].len(), 4);
    }

    #[rstest]
    #[case::box_stencil(Stencil::Box)]
    #[case::cross_stencil(Stencil::Cross)]
    fn oversized_radii_reach_every_cell(#[case] stencil: Stencil) {
        let shape = GridShape::new(vec![2, 3]);
        let lists = stencil_neighbours(&shape, &[0.0; 6], usize::MAX, stencil, false);
        for (cell, list) in lists.iter().enumerate() {
            let mut list = list.clone();
            list.sort_unstable();
            let others: Vec<usize> = (0..6).filter(|&other| other != cell).collect();
            assert_eq!(list, others);
        }
    }

    #[test]
    fn cross_radius_still_bounds_oversized_reach() {
        // Reach is capped at 2 by the long axis; the diagonal (1, 2) has
        // Manhattan length 3 and stays out.
        let shape = GridShape::new(vec![2, 3]);
        let lists = stencil_neighbours(&shape, &[0.0; 6], 2, Stencil::Cross, false);
        let mut corner = lists[0].clone();
        corner.sort_unstable();
        assert_eq!(corner, vec![1, 2, 3, 4]);
    }
}
