//! # Sphlink
//!
//! Sphlink provides the neighbor-search and particle-configuration layer of a
//! smoothed-particle-hydrodynamics (SPH) simulation in Rust.
//!
//! ## Goals
//!
//! The main goal of this crate is to give physics drivers cached, per-particle
//! neighbor data (kernel values, kernel-gradient magnitudes, distances and
//! unit directions) that interaction formulas can consume without re-deriving
//! geometry. It therefore does not include time integration or any physical
//! formulas and instead only focuses on building and maintaining neighbor
//! configurations.
//!
//! Searches run over a uniform-grid cell-linked list with cells sized to the
//! interaction cutoff, so a configuration rebuild is linear in the number of
//! particles for bounded particle density. Per-particle search depths support
//! bodies whose particles carry different smoothing-length ratios.
//!
//! Sphlink can rebuild configurations in parallel on the CPU thanks to
//! [rayon](https://github.com/rayon-rs/rayon). The "parallel" feature is
//! enabled by default; without it the same searches run sequentially with
//! identical results.
//!
//! # Using Sphlink
//!
//! ## Setting up a body
//!
//! A [`Body`](body::Body) binds a particle set to an interpolation kernel and
//! a cell-linked list over a padded domain:
//!
//! ```
//! use sphlink::prelude::*;
//!
//! let positions = vec![[0.0, 0.0], [0.04, 0.0], [0.5, 0.5]];
//! let particles = Particles::new(positions, 0.0016);
//! let kernel = CubicSplineKernel::new(0.04);
//!
//! let body = Body::new(particles, kernel, [-0.1, -0.1], [1.1, 1.1])?;
//! # Ok::<(), sphlink::error::SetupError>(())
//! ```
//!
//! ## Building a configuration
//!
//! Relations own the neighborhood storage and rebuild it on demand. An
//! [`InnerRelation`](relation::InnerRelation) connects a body to itself:
//!
//! ```
//! # use sphlink::prelude::*;
//! #
//! # let particles = Particles::new(vec![[0.0, 0.0], [0.04, 0.0], [0.5, 0.5]], 0.0016);
//! # let body = Body::new(particles, CubicSplineKernel::new(0.04), [-0.1, -0.1], [1.1, 1.1])?;
//! let mut relation = InnerRelation::new(&body);
//! relation.update_configuration(&body);
//!
//! for neighbor in relation.neighborhood(0).iter() {
//!     // neighbor.w_ij, neighbor.dw_ij_v_j, neighbor.r_ij, neighbor.e_ij
//!     assert!(neighbor.r_ij <= body.kernel().cutoff_radius());
//! }
//! # Ok::<(), sphlink::error::SetupError>(())
//! ```
//!
//! ## Stepping
//!
//! After the driver moves particles, it re-bins them and rebuilds whatever
//! relations it holds:
//!
//! ```
//! # use sphlink::prelude::*;
//! #
//! # let particles = Particles::new(vec![[0.0, 0.0], [0.04, 0.0], [0.5, 0.5]], 0.0016);
//! # let mut body = Body::new(particles, CubicSplineKernel::new(0.04), [-0.1, -0.1], [1.1, 1.1])?;
//! # let mut relation = InnerRelation::new(&body);
//! # let mut state = SimulationState::new();
//! # let dt = 1e-4;
//! body.particles_mut().positions_mut()[0][0] += 0.01;
//!
//! body.update_cell_linked_list();
//! relation.update_configuration(&body);
//! state.advance(dt);
//! # Ok::<(), sphlink::error::SetupError>(())
//! ```
//!
//! Contact and complex relations connect distinct bodies the same way, and
//! [`PeriodicCondition`](periodic::PeriodicCondition) wraps an axis by
//! bounding positions before the grid rebuild and mirroring ghost entries
//! after it.

#![warn(missing_docs)]

pub mod body;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod math;
pub mod neighborhood;
pub mod particles;
pub mod periodic;
pub mod relation;
pub mod search;
pub mod state;

/// Everything needed to use the crate.
pub mod prelude {
    pub use crate::body::Body;
    pub use crate::error::SetupError;
    pub use crate::grid::CellLinkedList;
    pub use crate::kernel::{CubicSplineKernel, Kernel, WendlandC2Kernel};
    pub use crate::math::Real;
    pub use crate::neighborhood::{Neighbor, Neighborhood};
    pub use crate::particles::{Particles, Variable};
    pub use crate::periodic::PeriodicCondition;
    pub use crate::relation::{ComplexRelation, ContactRelation, InnerRelation};
    pub use crate::state::SimulationState;
}
