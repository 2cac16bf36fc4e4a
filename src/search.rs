//! Per-particle neighbor search over a cell-linked list.
//!
//! The engine enumerates, for every particle of a range, all candidate
//! entries in the cells around the particle's own cell, and hands each
//! candidate to a relation-specific [`NeighborBuilder`] which decides
//! cutoff admission and appends the cached kernel data.
//!
//! Particles are processed independently: particle `i`'s task only writes
//! `i`'s own neighborhood, so the loop parallelizes without locks when the
//! `parallel` feature is enabled. The order of records within a
//! neighborhood follows the cell scan order and is deterministic for a
//! fixed grid state.

use crate::grid::{CellLinkedList, ListEntry};
use crate::math::Real;
use crate::neighborhood::Neighborhood;
use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Strategy deciding, for one candidate pair, admission within the cutoff
/// and the kernel data cached for it.
///
/// Implementations for the closed set of relation kinds live in
/// [`relation`](crate::relation).
pub trait NeighborBuilder<const D: usize>: Sync {
    /// Examines the candidate `(j, pos_j)` entry for particle `i` at
    /// `pos_i` and appends a record to `i`'s neighborhood if the pair is
    /// within the cutoff radius.
    fn build(
        &self,
        neighborhood: &mut Neighborhood<D>,
        pos_i: [Real; D],
        index_i: usize,
        candidate: &ListEntry<D>,
    );
}

/// Rebuilds the neighborhoods of every particle index in `range`.
///
/// `neighborhoods` is parallel to `positions`; each neighborhood in the
/// range is cleared and refilled from the current grid state. The search
/// depth is queried per particle so multi-resolution bodies can widen the
/// scan for coarse particles.
pub fn search_neighbors<const D: usize, B, S>(
    grid: &CellLinkedList<D>,
    positions: &[[Real; D]],
    range: Range<usize>,
    neighborhoods: &mut [Neighborhood<D>],
    search_depth: S,
    builder: &B,
) where
    B: NeighborBuilder<D>,
    S: Fn(usize) -> usize + Sync,
{
    let offset = range.start;
    let slice = &mut neighborhoods[range];
    let search_depth = &search_depth;

    let task = move |(shifted, neighborhood): (usize, &mut Neighborhood<D>)| {
        let index_i = offset + shifted;
        let pos_i = positions[index_i];
        let depth = search_depth(index_i).max(1);

        neighborhood.clear();
        grid.for_each_in_range(grid.cell_index_of(pos_i), depth, |candidate| {
            builder.build(neighborhood, pos_i, index_i, candidate);
        });
    };

    #[cfg(feature = "parallel")]
    slice.par_iter_mut().enumerate().for_each(task);

    #[cfg(not(feature = "parallel"))]
    slice.iter_mut().enumerate().for_each(task);
}
