//! Uniform-grid cell-linked list.
//!
//! The grid partitions a padded axis-aligned domain into cubic (square in
//! 2D) cells of side length equal to the interaction cutoff radius. Each
//! cell holds the indices and cached positions of the particles currently
//! inside it, so a range query only touches the cells overlapping the query
//! cube. Grid geometry is fixed for the lifetime of the grid; only the cell
//! contents change on rebuild.

use crate::error::SetupError;
use crate::math::Real;
use log::debug;

/// One entry of a cell: a particle index and its position cached at insert
/// time.
///
/// Ghost entries injected by periodic mirroring reuse the index of the
/// mirrored particle with a translated cached position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ListEntry<const D: usize> {
    /// Index of the particle in its body.
    pub index: usize,
    /// Position the particle was binned with.
    pub position: [Real; D],
}

/// Cell-linked list over a fixed axis-aligned domain.
#[derive(Clone, Debug)]
pub struct CellLinkedList<const D: usize> {
    lower_bound: [Real; D],
    cell_size: Real,
    cells_per_axis: [usize; D],
    cells: Vec<Vec<ListEntry<D>>>,
}

impl<const D: usize> CellLinkedList<D> {
    /// Creates an empty grid covering `[lower_bound, upper_bound]` with cell
    /// size equal to the cutoff radius.
    ///
    /// The bounds should already include whatever halo padding the caller
    /// needs for boundary or periodic ghost particles. Fails if the cutoff
    /// is not positive or the domain is smaller than one cell along any
    /// axis.
    pub fn new(
        lower_bound: [Real; D],
        upper_bound: [Real; D],
        cutoff: Real,
    ) -> Result<Self, SetupError> {
        if !(cutoff > 0.0) {
            return Err(SetupError::NonPositiveCutoff(cutoff));
        }

        let mut cells_per_axis = [0usize; D];
        for axis in 0..D {
            let extent = upper_bound[axis] - lower_bound[axis];
            if extent < cutoff {
                return Err(SetupError::DomainSmallerThanCutoff {
                    axis,
                    extent,
                    cutoff,
                });
            }
            cells_per_axis[axis] = (extent / cutoff).ceil() as usize;
        }

        let total: usize = cells_per_axis.iter().product();
        debug!(
            "cell linked list: {cells_per_axis:?} cells of size {cutoff} ({total} total)"
        );

        Ok(Self {
            lower_bound,
            cell_size: cutoff,
            cells_per_axis,
            cells: (0..total).map(|_| Vec::new()).collect(),
        })
    }

    /// Side length of a cell, equal to the cutoff the grid was built for.
    #[inline]
    pub const fn cell_size(&self) -> Real {
        self.cell_size
    }

    /// Number of cells along each axis.
    #[inline]
    pub const fn cells_per_axis(&self) -> [usize; D] {
        self.cells_per_axis
    }

    /// Cell index of a position: componentwise floored offset, clamped to
    /// the grid bounds. Positions outside the padded domain land in the
    /// nearest boundary cell; keeping them inside is the caller's contract.
    #[inline]
    pub fn cell_index_of(&self, position: [Real; D]) -> [usize; D] {
        std::array::from_fn(|axis| {
            let cell = ((position[axis] - self.lower_bound[axis]) / self.cell_size).floor();
            (cell as isize).clamp(0, self.cells_per_axis[axis] as isize - 1) as usize
        })
    }

    #[inline]
    fn linear_index(&self, cell: [usize; D]) -> usize {
        // Row-major, last axis fastest.
        cell.iter()
            .zip(self.cells_per_axis)
            .fold(0, |linear, (&index, count)| linear * count + index)
    }

    /// Clears all cells and re-bins every particle of the slice.
    ///
    /// Cell allocations are retained, so steady-state rebuilds do not
    /// allocate.
    pub fn build(&mut self, positions: &[[Real; D]]) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for (index, &position) in positions.iter().enumerate() {
            self.insert(index, position);
        }
    }

    /// Appends a single entry to the cell containing `position`.
    ///
    /// This is the injection hook used by periodic mirroring to place ghost
    /// copies; the next [`build`](Self::build) removes all injected entries
    /// along with everything else.
    #[inline]
    pub fn insert(&mut self, index: usize, position: [Real; D]) {
        let cell = self.cell_index_of(position);
        let linear = self.linear_index(cell);
        self.cells[linear].push(ListEntry { index, position });
    }

    /// Entries of one cell.
    #[inline]
    pub fn cell_entries(&self, cell: [usize; D]) -> &[ListEntry<D>] {
        &self.cells[self.linear_index(cell)]
    }

    /// Iterates over every entry currently binned in the grid.
    pub fn entries(&self) -> impl Iterator<Item = &ListEntry<D>> {
        self.cells.iter().flatten()
    }

    /// Visits every entry of every cell whose per-axis index lies within
    /// `center ± search_depth`, intersected with the grid bounds.
    ///
    /// `search_depth` is at least 1 for particles whose interaction radius
    /// matches the cell size and larger for coarser particles of
    /// multi-resolution bodies.
    pub fn for_each_in_range<F>(&self, center: [usize; D], search_depth: usize, mut visitor: F)
    where
        F: FnMut(&ListEntry<D>),
    {
        let lo: [usize; D] =
            std::array::from_fn(|axis| center[axis].saturating_sub(search_depth));
        let hi: [usize; D] = std::array::from_fn(|axis| {
            (center[axis] + search_depth).min(self.cells_per_axis[axis] - 1)
        });

        let mut cell = lo;
        loop {
            for entry in &self.cells[self.linear_index(cell)] {
                visitor(entry);
            }
            if !advance(&mut cell, &lo, &hi) {
                break;
            }
        }
    }
}

/// Steps a D-dimensional cell index through the box `[lo, hi]`, last axis
/// fastest. Returns `false` once the box is exhausted.
#[inline]
fn advance<const D: usize>(cell: &mut [usize; D], lo: &[usize; D], hi: &[usize; D]) -> bool {
    for axis in (0..D).rev() {
        if cell[axis] < hi[axis] {
            cell[axis] += 1;
            for reset in axis + 1..D {
                cell[reset] = lo[reset];
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square_grid(cutoff: Real) -> CellLinkedList<2> {
        CellLinkedList::new([0.0, 0.0], [1.0, 1.0], cutoff).unwrap()
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(
            CellLinkedList::<2>::new([0.0; 2], [1.0; 2], 0.0),
            Err(SetupError::NonPositiveCutoff(_))
        ));
        assert!(matches!(
            CellLinkedList::<2>::new([0.0; 2], [1.0; 2], -0.5),
            Err(SetupError::NonPositiveCutoff(_))
        ));
        assert!(matches!(
            CellLinkedList::<3>::new([0.0; 3], [1.0, 1.0, 0.1], 0.25),
            Err(SetupError::DomainSmallerThanCutoff { axis: 2, .. })
        ));
    }

    #[test]
    fn every_particle_lands_in_exactly_one_matching_cell() {
        let mut grid = unit_square_grid(0.25);
        let positions = [[0.05, 0.05], [0.05, 0.95], [0.51, 0.49], [0.99, 0.01]];
        grid.build(&positions);

        assert_eq!(grid.entries().count(), positions.len());
        for (index, &position) in positions.iter().enumerate() {
            let expected: [usize; 2] =
                std::array::from_fn(|axis| (position[axis] / 0.25).floor() as usize);
            assert_eq!(grid.cell_index_of(position), expected);

            let occurrences = grid
                .entries()
                .filter(|entry| entry.index == index)
                .count();
            assert_eq!(occurrences, 1);
            assert!(grid
                .cell_entries(expected)
                .iter()
                .any(|entry| entry.index == index));
        }
    }

    #[test]
    fn out_of_domain_positions_clamp_to_boundary_cells() {
        let grid = unit_square_grid(0.25);
        assert_eq!(grid.cell_index_of([-3.0, 0.5]), [0, 2]);
        assert_eq!(grid.cell_index_of([0.5, 7.0]), [2, 3]);
    }

    #[test]
    fn range_query_visits_the_clamped_cube() {
        let mut grid = unit_square_grid(0.25);
        // One particle per cell center of the 4x4 grid.
        let positions: Vec<[Real; 2]> = (0..4)
            .flat_map(|i| (0..4).map(move |j| [0.125 + 0.25 * i as Real, 0.125 + 0.25 * j as Real]))
            .collect();
        grid.build(&positions);

        let mut visited = Vec::new();
        grid.for_each_in_range([0, 0], 1, |entry| visited.push(entry.index));
        assert_eq!(visited.len(), 4); // 2x2 corner neighborhood

        visited.clear();
        grid.for_each_in_range([2, 2], 1, |entry| visited.push(entry.index));
        assert_eq!(visited.len(), 9);

        visited.clear();
        grid.for_each_in_range([1, 1], 3, |entry| visited.push(entry.index));
        assert_eq!(visited.len(), 16); // depth larger than the grid clamps
    }

    #[test]
    fn rebuild_reflects_moved_particles() {
        let mut grid = unit_square_grid(0.5);
        let mut positions = vec![[0.1, 0.1]];
        grid.build(&positions);
        assert_eq!(grid.cell_entries([0, 0]).len(), 1);

        positions[0] = [0.9, 0.9];
        grid.build(&positions);
        assert!(grid.cell_entries([0, 0]).is_empty());
        assert_eq!(grid.cell_entries([1, 1]).len(), 1);
    }
}
