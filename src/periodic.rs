//! Periodic boundary conditions along one axis.
//!
//! A [`PeriodicCondition`] implements wraparound in two passes per time
//! step, bracketing the grid rebuild:
//!
//! 1. [`bound`](PeriodicCondition::bound): wrap positions that left the
//!    periodic interval back by whole periods, before the grid rebuild.
//! 2. [`mirror`](PeriodicCondition::mirror): after the rebuild, inject
//!    ghost entries into the grid for particles within one cutoff of either
//!    face, translated by one period, so searches near a face see the
//!    particles on the opposite side.
//!
//! Ghosts are grid entries only; they carry the index of the mirrored
//! particle and vanish on the next rebuild. Multiple conditions on
//! different axes compose by running all bounding passes, rebuilding, then
//! running all mirroring passes.

use crate::body::Body;
use crate::error::SetupError;
use crate::grid::CellLinkedList;
use crate::kernel::Kernel;
use crate::math::Real;
use log::trace;

/// Wraparound boundary condition along a single axis.
#[derive(Clone, Copy, Debug)]
pub struct PeriodicCondition<const D: usize> {
    axis: usize,
    lower: Real,
    upper: Real,
    cutoff: Real,
}

impl<const D: usize> PeriodicCondition<D> {
    /// Creates a periodic condition on `axis` over the interval
    /// `[lower, upper)` for interactions with the given cutoff radius.
    ///
    /// Fails if the axis is out of range for the dimension, the interval is
    /// empty or the cutoff is not positive.
    pub fn new(axis: usize, lower: Real, upper: Real, cutoff: Real) -> Result<Self, SetupError> {
        if axis >= D {
            return Err(SetupError::InvalidAxis { axis, dimension: D });
        }
        if !(upper > lower) {
            return Err(SetupError::EmptyPeriodicAxis { lower, upper });
        }
        if !(cutoff > 0.0) {
            return Err(SetupError::NonPositiveCutoff(cutoff));
        }

        Ok(Self {
            axis,
            lower,
            upper,
            cutoff,
        })
    }

    /// Length of the periodic interval.
    #[inline]
    pub fn period(&self) -> Real {
        self.upper - self.lower
    }

    /// Wraps every position back into `[lower, upper)` along the periodic
    /// axis. Positions already inside are untouched.
    pub fn bound(&self, positions: &mut [[Real; D]]) {
        let period = self.period();
        for position in positions {
            let coordinate = &mut position[self.axis];
            if *coordinate < self.lower || *coordinate >= self.upper {
                *coordinate = self.lower + (*coordinate - self.lower).rem_euclid(period);
            }
        }
    }

    /// Injects translated ghost entries for every particle within one
    /// cutoff of either face of the interval.
    ///
    /// Must run after the grid rebuild; the ghosts are discarded by the
    /// next rebuild.
    pub fn mirror(&self, grid: &mut CellLinkedList<D>, positions: &[[Real; D]]) {
        let period = self.period();
        let mut ghosts = 0usize;

        for (index, &position) in positions.iter().enumerate() {
            let coordinate = position[self.axis];

            if coordinate < self.lower + self.cutoff {
                let mut ghost = position;
                ghost[self.axis] += period;
                grid.insert(index, ghost);
                ghosts += 1;
            }
            if coordinate > self.upper - self.cutoff {
                let mut ghost = position;
                ghost[self.axis] -= period;
                grid.insert(index, ghost);
                ghosts += 1;
            }
        }

        trace!("axis {}: {ghosts} periodic ghosts injected", self.axis);
    }

    /// [`bound`](Self::bound) applied to a body's particle positions.
    pub fn apply_bounding<K: Kernel<D>>(&self, body: &mut Body<D, K>) {
        self.bound(body.particles_mut().positions_mut());
    }

    /// [`mirror`](Self::mirror) applied to a body's grid and positions.
    pub fn apply_mirroring<K: Kernel<D>>(&self, body: &mut Body<D, K>) {
        let (grid, particles) = body.grid_and_particles_mut();
        self.mirror(grid, particles.positions());
    }
}
