//! Particle storage: positions, volumes and named per-particle variables.
//!
//! Indices are stable for the duration of one neighbor-list build; injection
//! and removal of particles between builds is the driver's responsibility.

use crate::math::Real;
use std::any::{Any, TypeId};
use std::marker::PhantomData;

/// Typed handle to a registered per-particle variable.
///
/// Obtained once from [`Particles::register_variable`] or
/// [`Particles::lookup_variable`] and cached; all subsequent access through
/// the handle is compile-time typed, replacing repeated lookup by name.
#[derive(Debug)]
pub struct Variable<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Variable<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Variable<T> {}

struct VariableEntry {
    name: String,
    type_id: TypeId,
    data: Box<dyn Any + Send + Sync>,
}

/// The particles of one body: positions, volumes, smoothing-length ratios
/// and arbitrary named per-particle variables.
pub struct Particles<const D: usize> {
    pos: Vec<[Real; D]>,
    vol: Vec<Real>,
    h_ratio: Vec<Real>,
    variables: Vec<VariableEntry>,
}

impl<const D: usize> Particles<D> {
    /// Creates particle storage from positions with a uniform particle
    /// volume and unit smoothing-length ratio.
    pub fn new(positions: Vec<[Real; D]>, volume: Real) -> Self {
        let len = positions.len();
        Self {
            pos: positions,
            vol: vec![volume; len],
            h_ratio: vec![1.0; len],
            variables: Vec::new(),
        }
    }

    /// Creates particle storage from explicit per-particle positions and
    /// volumes.
    ///
    /// # Panics
    ///
    /// Panics if the two slices differ in length.
    pub fn from_parts(positions: Vec<[Real; D]>, volumes: Vec<Real>) -> Self {
        assert_eq!(
            positions.len(),
            volumes.len(),
            "positions and volumes must have the same length"
        );
        let len = positions.len();
        Self {
            pos: positions,
            vol: volumes,
            h_ratio: vec![1.0; len],
            variables: Vec::new(),
        }
    }

    /// Total number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.pos.len()
    }

    /// Returns `true` if the body holds no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    /// Positions of all particles.
    #[inline]
    pub fn positions(&self) -> &[[Real; D]] {
        &self.pos
    }

    /// Mutable positions, for the physics driver to advance.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [[Real; D]] {
        &mut self.pos
    }

    /// Volumes of all particles.
    #[inline]
    pub fn volumes(&self) -> &[Real] {
        &self.vol
    }

    /// Mutable volumes.
    #[inline]
    pub fn volumes_mut(&mut self) -> &mut [Real] {
        &mut self.vol
    }

    /// Per-particle smoothing-length ratios relative to the body's reference
    /// smoothing length. 1 everywhere for single-resolution bodies.
    #[inline]
    pub fn smoothing_length_ratios(&self) -> &[Real] {
        &self.h_ratio
    }

    /// Sets the smoothing-length ratio of one particle. Ratios above 1
    /// enlarge that particle's interaction radius and widen its cell search
    /// accordingly.
    #[inline]
    pub fn set_smoothing_length_ratio(&mut self, index: usize, ratio: Real) {
        self.h_ratio[index] = ratio;
    }

    /// Cell search depth of one particle, the smoothing-length ratio rounded
    /// up and never below one.
    #[inline]
    pub fn search_depth(&self, index: usize) -> usize {
        (self.h_ratio[index].ceil() as usize).max(1)
    }

    /// Registers a named per-particle variable filled with `initial`,
    /// returning its typed handle.
    ///
    /// Registering a name that already exists with the same type returns the
    /// existing handle and leaves the data untouched.
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered with a different type.
    pub fn register_variable<T>(&mut self, name: &str, initial: T) -> Variable<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        if let Some(existing) = self.lookup_variable::<T>(name) {
            return existing;
        }
        assert!(
            !self.variables.iter().any(|entry| entry.name == name),
            "variable {name:?} is already registered with a different type"
        );

        let index = self.variables.len();
        self.variables.push(VariableEntry {
            name: name.to_owned(),
            type_id: TypeId::of::<T>(),
            data: Box::new(vec![initial; self.len()]),
        });

        Variable {
            index,
            _marker: PhantomData,
        }
    }

    /// Resolves a registered variable by name, or `None` if the name is
    /// unknown or registered with a different type.
    pub fn lookup_variable<T: 'static>(&self, name: &str) -> Option<Variable<T>> {
        self.variables
            .iter()
            .position(|entry| entry.name == name && entry.type_id == TypeId::of::<T>())
            .map(|index| Variable {
                index,
                _marker: PhantomData,
            })
    }

    /// Read access to a registered variable.
    #[inline]
    pub fn variable<T: 'static>(&self, handle: Variable<T>) -> &[T] {
        self.variables[handle.index]
            .data
            .downcast_ref::<Vec<T>>()
            .expect("variable handle does not belong to this particle storage")
    }

    /// Write access to a registered variable.
    #[inline]
    pub fn variable_mut<T: 'static>(&mut self, handle: Variable<T>) -> &mut [T] {
        self.variables[handle.index]
            .data
            .downcast_mut::<Vec<T>>()
            .expect("variable handle does not belong to this particle storage")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_variable_registry() {
        let mut particles = Particles::<2>::new(vec![[0.0, 0.0], [1.0, 0.0]], 0.25);

        let density = particles.register_variable("Density", 1000.0_f64);
        let species = particles.register_variable("Species", 0_u32);

        particles.variable_mut(density)[1] = 980.0;
        assert_eq!(particles.variable(density), &[1000.0, 980.0]);
        assert_eq!(particles.variable(species), &[0, 0]);

        // Lookup resolves to the same storage.
        let found = particles.lookup_variable::<f64>("Density").unwrap();
        assert_eq!(particles.variable(found)[1], 980.0);
        assert!(particles.lookup_variable::<u32>("Density").is_none());

        // Re-registering with the same type is idempotent.
        let again = particles.register_variable("Density", 0.0_f64);
        assert_eq!(particles.variable(again), &[1000.0, 980.0]);
    }

    #[test]
    #[should_panic]
    fn conflicting_variable_type_panics() {
        let mut particles = Particles::<2>::new(vec![[0.0, 0.0]], 1.0);
        particles.register_variable("Mass", 1.0_f64);
        particles.register_variable("Mass", 1.0_f32);
    }

    #[test]
    fn search_depth_rounds_ratio_up() {
        let mut particles = Particles::<3>::new(vec![[0.0; 3]; 3], 1.0);
        assert_eq!(particles.search_depth(0), 1);

        particles.set_smoothing_length_ratio(1, 1.3);
        particles.set_smoothing_length_ratio(2, 3.0);
        assert_eq!(particles.search_depth(1), 2);
        assert_eq!(particles.search_depth(2), 3);
    }
}
