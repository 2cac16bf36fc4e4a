//! Cached per-particle neighbor lists.
//!
//! A [`Neighborhood`] stores, for one particle, the ordered list of its
//! interaction partners for the current configuration together with the
//! kernel data precomputed at build time. Physics sweeps only read these
//! arrays; they are rebuilt wholesale by the owning relation whenever the
//! configuration is updated.
//!
//! Storage is a set of parallel arrays indexed `0..len`, mirroring how the
//! discretized operators consume them: neighbor index, kernel weight,
//! kernel derivative times neighbor volume, pair distance and unit pair
//! direction. The direction convention is `e_ij = (pos_i - pos_j) / r_ij`,
//! from the neighbor toward the owning particle.

use crate::math::Real;

/// One record of a [`Neighborhood`], yielded by [`Neighborhood::iter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor<const D: usize> {
    /// Index of the neighbor particle in the target body.
    pub j: usize,
    /// Kernel weight `W(r_ij)`.
    pub w_ij: Real,
    /// Kernel derivative times neighbor volume, `dW(r_ij) * V_j`.
    pub dw_ij_v_j: Real,
    /// Pair distance.
    pub r_ij: Real,
    /// Unit direction from the neighbor toward the owning particle.
    pub e_ij: [Real; D],
}

/// The cached neighbor list of one particle.
///
/// An empty neighborhood is a valid state; consuming formulas reduce to
/// sums over zero terms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighborhood<const D: usize> {
    j: Vec<usize>,
    w_ij: Vec<Real>,
    dw_ij_v_j: Vec<Real>,
    r_ij: Vec<Real>,
    e_ij: Vec<[Real; D]>,
}

impl<const D: usize> Neighborhood<D> {
    /// Creates an empty neighborhood.
    pub const fn new() -> Self {
        Self {
            j: Vec::new(),
            w_ij: Vec::new(),
            dw_ij_v_j: Vec::new(),
            r_ij: Vec::new(),
            e_ij: Vec::new(),
        }
    }

    /// Number of recorded neighbors.
    #[inline]
    pub fn len(&self) -> usize {
        self.j.len()
    }

    /// Returns `true` if no neighbor was within range.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.j.is_empty()
    }

    /// Neighbor particle indices.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.j
    }

    /// Kernel weights `W(r_ij)`.
    #[inline]
    pub fn w_ij(&self) -> &[Real] {
        &self.w_ij
    }

    /// Kernel derivatives times neighbor volumes, `dW(r_ij) * V_j`.
    #[inline]
    pub fn dw_ij_v_j(&self) -> &[Real] {
        &self.dw_ij_v_j
    }

    /// Pair distances.
    #[inline]
    pub fn r_ij(&self) -> &[Real] {
        &self.r_ij
    }

    /// Unit pair directions, each from the neighbor toward the owning
    /// particle.
    #[inline]
    pub fn e_ij(&self) -> &[[Real; D]] {
        &self.e_ij
    }

    /// Iterates the neighbor records in build order.
    pub fn iter(&self) -> impl Iterator<Item = Neighbor<D>> + '_ {
        (0..self.len()).map(move |n| Neighbor {
            j: self.j[n],
            w_ij: self.w_ij[n],
            dw_ij_v_j: self.dw_ij_v_j[n],
            r_ij: self.r_ij[n],
            e_ij: self.e_ij[n],
        })
    }

    /// Appends one neighbor record.
    #[inline]
    pub(crate) fn push(
        &mut self,
        j: usize,
        w_ij: Real,
        dw_ij_v_j: Real,
        r_ij: Real,
        e_ij: [Real; D],
    ) {
        self.j.push(j);
        self.w_ij.push(w_ij);
        self.dw_ij_v_j.push(dw_ij_v_j);
        self.r_ij.push(r_ij);
        self.e_ij.push(e_ij);
    }

    /// Discards all records, retaining the allocations for the next rebuild.
    #[inline]
    pub(crate) fn clear(&mut self) {
        self.j.clear();
        self.w_ij.clear();
        self.dw_ij_v_j.clear();
        self.r_ij.clear();
        self.e_ij.clear();
    }
}
