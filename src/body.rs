//! A body: one particle set, its kernel and its cell-linked list.

use crate::error::SetupError;
use crate::grid::CellLinkedList;
use crate::kernel::Kernel;
use crate::math::Real;
use crate::particles::Particles;
use log::trace;

/// A simulated body: particles discretizing one continuum region, the
/// interpolation kernel they interact through and the grid they are binned
/// in.
///
/// The grid's cell size equals the kernel cutoff, so particles at the
/// body's reference resolution search with depth 1; particles with a larger
/// smoothing-length ratio widen their search accordingly.
pub struct Body<const D: usize, K> {
    particles: Particles<D>,
    grid: CellLinkedList<D>,
    kernel: K,
}

impl<const D: usize, K: Kernel<D>> Body<D, K> {
    /// Creates a body over the padded domain `[lower_bound, upper_bound]`
    /// and bins its particles.
    ///
    /// The bounds must leave room for whatever halo the driver needs
    /// (boundary particles, periodic ghosts). Fails on a domain that cannot
    /// host a grid for the kernel's cutoff.
    pub fn new(
        particles: Particles<D>,
        kernel: K,
        lower_bound: [Real; D],
        upper_bound: [Real; D],
    ) -> Result<Self, SetupError> {
        let mut grid = CellLinkedList::new(lower_bound, upper_bound, kernel.cutoff_radius())?;
        grid.build(particles.positions());

        Ok(Self {
            particles,
            grid,
            kernel,
        })
    }

    /// The body's particles.
    #[inline]
    pub fn particles(&self) -> &Particles<D> {
        &self.particles
    }

    /// Mutable access to the body's particles, for the physics driver.
    ///
    /// Moving particles invalidates the grid and every relation built over
    /// this body until [`update_cell_linked_list`](Self::update_cell_linked_list)
    /// and the relations' `update_configuration` are called again.
    #[inline]
    pub fn particles_mut(&mut self) -> &mut Particles<D> {
        &mut self.particles
    }

    /// The body's cell-linked list.
    #[inline]
    pub fn grid(&self) -> &CellLinkedList<D> {
        &self.grid
    }

    /// Mutable access to the grid, used by periodic conditions to inject
    /// ghost entries between rebuild and configuration update.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut CellLinkedList<D> {
        &mut self.grid
    }

    /// Simultaneous mutable grid and shared particle access, so ghost
    /// entries can be injected while positions are read.
    #[inline]
    pub fn grid_and_particles_mut(&mut self) -> (&mut CellLinkedList<D>, &Particles<D>) {
        (&mut self.grid, &self.particles)
    }

    /// The body's interpolation kernel.
    #[inline]
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Re-bins every particle from its current position.
    pub fn update_cell_linked_list(&mut self) {
        trace!("rebinning {} particles", self.particles.len());
        self.grid.build(self.particles.positions());
    }
}
