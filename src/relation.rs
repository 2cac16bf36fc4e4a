//! Neighbor relations: inner, contact and complex.
//!
//! A relation owns the per-particle [`Neighborhood`] storage for one source
//! body and rebuilds it from scratch on every configuration update. The
//! three kinds form a closed set of strategies over the same search engine:
//!
//! - [`InnerRelation`]: source and target are the same body; the own index
//!   is excluded.
//! - [`ContactRelation`]: the source body's particles search the grids of
//!   distinct target bodies; one neighborhood array per target.
//! - [`ComplexRelation`]: an inner relation plus contact relations over the
//!   same source body, updated together or separately.
//!
//! Physics components borrow the neighborhoods read-only for the duration
//! of one time step; no other component owns or frees this storage.

use crate::body::Body;
use crate::grid::ListEntry;
use crate::kernel::Kernel;
use crate::math::{self, Real, TINY};
use crate::neighborhood::Neighborhood;
use crate::search::{search_neighbors, NeighborBuilder};
use log::debug;

/// Builds neighbor records within one body, excluding the particle itself.
///
/// The interaction radius of particle `i` is the kernel cutoff scaled by
/// `i`'s smoothing-length ratio, and the kernel is evaluated at that
/// scaled smoothing length, so coarse particles of a multi-resolution body
/// admit and weight pairs over their own, larger support.
pub struct InnerBuilder<'a, K> {
    kernel: &'a K,
    volumes: &'a [Real],
    ratios: &'a [Real],
}

impl<'a, K> InnerBuilder<'a, K> {
    /// Creates an inner builder from the body's kernel, particle volumes
    /// and smoothing-length ratios.
    pub fn new(kernel: &'a K, volumes: &'a [Real], ratios: &'a [Real]) -> Self {
        Self {
            kernel,
            volumes,
            ratios,
        }
    }
}

impl<const D: usize, K: Kernel<D> + Sync> NeighborBuilder<D> for InnerBuilder<'_, K> {
    fn build(
        &self,
        neighborhood: &mut Neighborhood<D>,
        pos_i: [Real; D],
        index_i: usize,
        candidate: &ListEntry<D>,
    ) {
        // Self-exclusion also skips a particle's own periodic ghost.
        if candidate.index == index_i {
            return;
        }

        let ratio = self.ratios[index_i];
        let cutoff = self.kernel.cutoff_radius() * ratio;
        let displacement = math::sub(pos_i, candidate.position);
        let r_sq = math::length_squared(displacement);
        if r_sq > cutoff * cutoff {
            return;
        }

        let r_ij = r_sq.sqrt();
        let e_ij = math::scale(displacement, 1.0 / (r_ij + TINY));
        neighborhood.push(
            candidate.index,
            self.kernel.w_at_ratio(r_ij, ratio),
            self.kernel.dw_at_ratio(r_ij, ratio) * self.volumes[candidate.index],
            r_ij,
            e_ij,
        );
    }
}

/// Builds neighbor records between two distinct bodies.
///
/// The kernel is the source body's; the volumes are the target body's. No
/// self-exclusion is needed because the index spaces are independent.
pub struct ContactBuilder<'a, K> {
    kernel: &'a K,
    target_volumes: &'a [Real],
    source_ratios: &'a [Real],
}

impl<'a, K> ContactBuilder<'a, K> {
    /// Creates a contact builder from the source kernel, the target body's
    /// particle volumes and the source body's smoothing-length ratios.
    pub fn new(kernel: &'a K, target_volumes: &'a [Real], source_ratios: &'a [Real]) -> Self {
        Self {
            kernel,
            target_volumes,
            source_ratios,
        }
    }
}

impl<const D: usize, K: Kernel<D> + Sync> NeighborBuilder<D> for ContactBuilder<'_, K> {
    fn build(
        &self,
        neighborhood: &mut Neighborhood<D>,
        pos_i: [Real; D],
        index_i: usize,
        candidate: &ListEntry<D>,
    ) {
        let ratio = self.source_ratios[index_i];
        let cutoff = self.kernel.cutoff_radius() * ratio;
        let displacement = math::sub(pos_i, candidate.position);
        let r_sq = math::length_squared(displacement);
        if r_sq > cutoff * cutoff {
            return;
        }

        let r_ij = r_sq.sqrt();
        let e_ij = math::scale(displacement, 1.0 / (r_ij + TINY));
        neighborhood.push(
            candidate.index,
            self.kernel.w_at_ratio(r_ij, ratio),
            self.kernel.dw_at_ratio(r_ij, ratio) * self.target_volumes[candidate.index],
            r_ij,
            e_ij,
        );
    }
}

/// Neighbor relation of a body with itself.
pub struct InnerRelation<const D: usize> {
    neighborhoods: Vec<Neighborhood<D>>,
}

impl<const D: usize> InnerRelation<D> {
    /// Creates the relation with empty neighborhoods for every particle of
    /// the body. Nothing is searched until the first configuration update.
    pub fn new<K: Kernel<D>>(body: &Body<D, K>) -> Self {
        Self {
            neighborhoods: vec![Neighborhood::new(); body.particles().len()],
        }
    }

    /// Discards and rebuilds every neighborhood from the body's current
    /// grid state and positions.
    pub fn update_configuration<K: Kernel<D> + Sync>(&mut self, body: &Body<D, K>) {
        debug!(
            "inner configuration update over {} particles",
            body.particles().len()
        );
        let particles = body.particles();
        search_neighbors(
            body.grid(),
            particles.positions(),
            0..particles.len(),
            &mut self.neighborhoods,
            |i| particles.search_depth(i),
            &InnerBuilder::new(
                body.kernel(),
                particles.volumes(),
                particles.smoothing_length_ratios(),
            ),
        );
    }

    /// Rebuilds only the neighborhoods of a contiguous particle range,
    /// leaving the rest untouched. Used when only a body part moved.
    pub fn update_configuration_range<K: Kernel<D> + Sync>(
        &mut self,
        body: &Body<D, K>,
        range: std::ops::Range<usize>,
    ) {
        let particles = body.particles();
        search_neighbors(
            body.grid(),
            particles.positions(),
            range,
            &mut self.neighborhoods,
            |i| particles.search_depth(i),
            &InnerBuilder::new(
                body.kernel(),
                particles.volumes(),
                particles.smoothing_length_ratios(),
            ),
        );
    }

    /// The neighborhood of one particle.
    #[inline]
    pub fn neighborhood(&self, index: usize) -> &Neighborhood<D> {
        &self.neighborhoods[index]
    }

    /// All neighborhoods, indexed by particle.
    #[inline]
    pub fn neighborhoods(&self) -> &[Neighborhood<D>] {
        &self.neighborhoods
    }
}

/// Neighbor relation of a source body with one or more distinct target
/// bodies.
pub struct ContactRelation<const D: usize> {
    neighborhoods: Vec<Vec<Neighborhood<D>>>,
}

impl<const D: usize> ContactRelation<D> {
    /// Creates the relation with one empty neighborhood array per target
    /// body.
    pub fn new<K: Kernel<D>>(source: &Body<D, K>, target_count: usize) -> Self {
        let len = source.particles().len();
        Self {
            neighborhoods: vec![vec![Neighborhood::new(); len]; target_count],
        }
    }

    /// Number of target bodies this relation was created for.
    #[inline]
    pub fn target_count(&self) -> usize {
        self.neighborhoods.len()
    }

    /// Rebuilds the neighborhoods toward a single target body, leaving the
    /// other targets untouched. Used during sub-stepping when only that
    /// target moved.
    ///
    /// The target body may use a different resolution: the search depth is
    /// derived from the source cutoff and the target's cell size.
    pub fn update_target<KS, KT>(
        &mut self,
        target_index: usize,
        source: &Body<D, KS>,
        target: &Body<D, KT>,
    ) where
        KS: Kernel<D> + Sync,
        KT: Kernel<D>,
    {
        let particles = source.particles();
        let cutoff = source.kernel().cutoff_radius();
        let cell_size = target.grid().cell_size();
        let ratios = particles.smoothing_length_ratios();

        search_neighbors(
            target.grid(),
            particles.positions(),
            0..particles.len(),
            &mut self.neighborhoods[target_index],
            |i| ((cutoff * ratios[i]) / cell_size).ceil() as usize,
            &ContactBuilder::new(source.kernel(), target.particles().volumes(), ratios),
        );
    }

    /// Discards and rebuilds the neighborhoods toward every target body.
    ///
    /// # Panics
    ///
    /// Panics if `targets` does not match the target count of the relation.
    pub fn update_configuration<KS, KT>(&mut self, source: &Body<D, KS>, targets: &[&Body<D, KT>])
    where
        KS: Kernel<D> + Sync,
        KT: Kernel<D>,
    {
        assert_eq!(
            targets.len(),
            self.target_count(),
            "target list does not match the relation's target count"
        );
        debug!(
            "contact configuration update over {} particles and {} targets",
            source.particles().len(),
            targets.len()
        );
        for (target_index, target) in targets.iter().enumerate() {
            self.update_target(target_index, source, target);
        }
    }

    /// The neighborhood of one source particle toward one target body.
    #[inline]
    pub fn neighborhood(&self, target_index: usize, particle: usize) -> &Neighborhood<D> {
        &self.neighborhoods[target_index][particle]
    }

    /// All neighborhoods toward one target body, indexed by source
    /// particle.
    #[inline]
    pub fn neighborhoods(&self, target_index: usize) -> &[Neighborhood<D>] {
        &self.neighborhoods[target_index]
    }
}

/// An inner relation and a set of contact relations over the same source
/// body.
///
/// Formulas such as Laplacians with wall corrections sum inner and contact
/// contributions; this type keeps both configurations consistent while
/// still allowing separate refreshes during sub-stepping.
pub struct ComplexRelation<const D: usize> {
    inner: InnerRelation<D>,
    contact: ContactRelation<D>,
}

impl<const D: usize> ComplexRelation<D> {
    /// Creates the combined relation for a source body and a number of
    /// contact targets.
    pub fn new<K: Kernel<D>>(source: &Body<D, K>, target_count: usize) -> Self {
        Self {
            inner: InnerRelation::new(source),
            contact: ContactRelation::new(source, target_count),
        }
    }

    /// Rebuilds the inner and every contact configuration.
    pub fn update_configuration<KS, KT>(&mut self, source: &Body<D, KS>, targets: &[&Body<D, KT>])
    where
        KS: Kernel<D> + Sync,
        KT: Kernel<D>,
    {
        self.inner.update_configuration(source);
        self.contact.update_configuration(source, targets);
    }

    /// Rebuilds only the inner configuration, for sub-steps where the
    /// contact bodies did not move.
    pub fn update_inner_configuration<K: Kernel<D> + Sync>(&mut self, source: &Body<D, K>) {
        self.inner.update_configuration(source);
    }

    /// Rebuilds only the contact configurations.
    pub fn update_contact_configuration<KS, KT>(
        &mut self,
        source: &Body<D, KS>,
        targets: &[&Body<D, KT>],
    ) where
        KS: Kernel<D> + Sync,
        KT: Kernel<D>,
    {
        self.contact.update_configuration(source, targets);
    }

    /// The inner part of the relation.
    #[inline]
    pub fn inner(&self) -> &InnerRelation<D> {
        &self.inner
    }

    /// The contact part of the relation.
    #[inline]
    pub fn contact(&self) -> &ContactRelation<D> {
        &self.contact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::CubicSplineKernel;
    use crate::particles::Particles;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn lattice_body(n: usize, spacing: Real) -> Body<2, CubicSplineKernel<2>> {
        let positions: Vec<[Real; 2]> = (0..n)
            .flat_map(|i| (0..n).map(move |j| [i as Real * spacing, j as Real * spacing]))
            .collect();
        let extent = (n - 1) as Real * spacing;
        // Cutoff 1.5 * spacing, smoothing length 0.75 * spacing.
        Body::new(
            Particles::new(positions, spacing * spacing),
            CubicSplineKernel::new(0.75 * spacing),
            [-2.0 * spacing, -2.0 * spacing],
            [extent + 2.0 * spacing, extent + 2.0 * spacing],
        )
        .unwrap()
    }

    fn random_body(count: usize, cutoff: Real, seed: u64) -> Body<2, CubicSplineKernel<2>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions: Vec<[Real; 2]> = (0..count)
            .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
            .collect();
        Body::new(
            Particles::new(positions, 1.0 / count as Real),
            CubicSplineKernel::new(cutoff / 2.0),
            [-cutoff, -cutoff],
            [1.0 + cutoff, 1.0 + cutoff],
        )
        .unwrap()
    }

    fn brute_force_neighbors(positions: &[[Real; 2]], i: usize, cutoff: Real) -> Vec<usize> {
        let mut found: Vec<usize> = (0..positions.len())
            .filter(|&j| j != i && math::distance(positions[i], positions[j]) <= cutoff)
            .collect();
        found.sort_unstable();
        found
    }

    #[test]
    fn lattice_neighbor_counts() {
        let n = 10;
        let body = lattice_body(n, 0.1);
        let mut relation = InnerRelation::new(&body);
        relation.update_configuration(&body);

        for i in 0..n {
            for j in 0..n {
                let on_edge_i = i == 0 || i == n - 1;
                let on_edge_j = j == 0 || j == n - 1;
                let expected = match (on_edge_i, on_edge_j) {
                    (true, true) => 3,
                    (false, false) => 8,
                    _ => 5,
                };
                let count = relation.neighborhood(i * n + j).len();
                assert_eq!(count, expected, "particle ({i}, {j})");
            }
        }
    }

    #[test]
    fn grid_search_matches_brute_force() {
        let cutoff = 0.1;
        let body = random_body(200, cutoff, 39);
        let mut relation = InnerRelation::new(&body);
        relation.update_configuration(&body);

        let positions = body.particles().positions();
        for i in 0..positions.len() {
            let mut found = relation.neighborhood(i).indices().to_vec();
            found.sort_unstable();
            assert_eq!(found, brute_force_neighbors(positions, i, cutoff), "particle {i}");
        }
    }

    #[test]
    fn pairs_are_symmetric_with_antiparallel_directions() {
        let body = random_body(150, 0.12, 7);
        let mut relation = InnerRelation::new(&body);
        relation.update_configuration(&body);

        for i in 0..body.particles().len() {
            for neighbor in relation.neighborhood(i).iter() {
                let reverse = relation
                    .neighborhood(neighbor.j)
                    .iter()
                    .find(|record| record.j == i)
                    .unwrap_or_else(|| panic!("{i} missing from neighborhood of {}", neighbor.j));

                assert!((neighbor.r_ij - reverse.r_ij).abs() < 1e-12);
                for axis in 0..2 {
                    assert!((neighbor.e_ij[axis] + reverse.e_ij[axis]).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn no_particle_is_its_own_neighbor_and_cutoff_holds() {
        let body = random_body(200, 0.1, 11);
        let cutoff = body.kernel().cutoff_radius();
        let mut relation = InnerRelation::new(&body);
        relation.update_configuration(&body);

        for i in 0..body.particles().len() {
            let neighborhood = relation.neighborhood(i);
            assert!(!neighborhood.indices().contains(&i));
            for n in 0..neighborhood.len() {
                let r_ij = neighborhood.r_ij()[n];
                assert!(r_ij > 0.0 && r_ij <= cutoff);
            }
        }
    }

    #[test]
    fn rebuild_is_deterministic_for_fixed_positions() {
        let body = random_body(120, 0.15, 23);
        let mut relation = InnerRelation::new(&body);
        relation.update_configuration(&body);
        let first = relation.neighborhoods().to_vec();

        relation.update_configuration(&body);
        assert_eq!(relation.neighborhoods(), &first[..]);
    }

    #[test]
    fn cached_kernel_data_matches_direct_evaluation() {
        let body = random_body(80, 0.2, 4);
        let kernel = *body.kernel();
        let mut relation = InnerRelation::new(&body);
        relation.update_configuration(&body);

        let positions = body.particles().positions();
        let volumes = body.particles().volumes();
        for i in 0..positions.len() {
            for neighbor in relation.neighborhood(i).iter() {
                let displacement = math::sub(positions[i], positions[neighbor.j]);
                let r = math::length(displacement);

                assert!((neighbor.w_ij - kernel.w(r)).abs() < 1e-12);
                assert!((neighbor.dw_ij_v_j - kernel.dw(r) * volumes[neighbor.j]).abs() < 1e-12);
                for axis in 0..2 {
                    assert!((neighbor.e_ij[axis] - displacement[axis] / r).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn coarse_particles_interact_over_their_scaled_support() {
        // Reference cutoff 0.2; the pair separation 0.3 is admissible only
        // for the particle whose smoothing length is doubled.
        let particles = Particles::new(vec![[0.5, 0.5], [0.8, 0.5]], 0.01);
        let mut body = Body::new(
            particles,
            CubicSplineKernel::new(0.1),
            [0.0, 0.0],
            [1.4, 1.0],
        )
        .unwrap();
        body.particles_mut().set_smoothing_length_ratio(0, 2.0);

        let mut relation = InnerRelation::new(&body);
        relation.update_configuration(&body);

        assert_eq!(relation.neighborhood(0).indices(), &[1]);
        assert!(relation.neighborhood(1).is_empty());

        // Kernel data is evaluated at the widened smoothing length.
        let kernel = *body.kernel();
        let record = relation.neighborhood(0).iter().next().unwrap();
        assert!(record.w_ij > 0.0);
        assert!((record.w_ij - kernel.w_at_ratio(0.3, 2.0)).abs() < 1e-12);
        assert!(
            (record.dw_ij_v_j - kernel.dw_at_ratio(0.3, 2.0) * 0.01).abs() < 1e-12
        );
    }

    #[test]
    fn contact_search_matches_brute_force() {
        let cutoff = 0.1;
        let source = random_body(150, cutoff, 57);

        // Finer target resolution, so each search spans several target
        // cells.
        let mut rng = StdRng::seed_from_u64(58);
        let target_positions: Vec<[Real; 2]> = (0..180)
            .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
            .collect();
        let target = Body::new(
            Particles::new(target_positions.clone(), 1.0 / 180.0),
            CubicSplineKernel::new(0.025),
            [-cutoff, -cutoff],
            [1.0 + cutoff, 1.0 + cutoff],
        )
        .unwrap();

        let mut relation = ContactRelation::new(&source, 1);
        relation.update_configuration(&source, &[&target]);

        let source_positions = source.particles().positions();
        for i in 0..source_positions.len() {
            let mut found = relation.neighborhood(0, i).indices().to_vec();
            found.sort_unstable();

            let expected: Vec<usize> = (0..target_positions.len())
                .filter(|&j| {
                    math::distance(source_positions[i], target_positions[j]) <= cutoff
                })
                .collect();
            assert_eq!(found, expected, "source particle {i}");
        }
    }

    fn row_body(count: usize, x: Real, spacing: Real, h: Real) -> Body<2, CubicSplineKernel<2>> {
        let positions: Vec<[Real; 2]> = (0..count).map(|j| [x, j as Real * spacing]).collect();
        Body::new(
            Particles::new(positions, spacing * spacing),
            CubicSplineKernel::new(h),
            [-1.0, -1.0],
            [2.0, 2.0],
        )
        .unwrap()
    }

    #[test]
    fn contact_counts_follow_the_body_offset() {
        let spacing = 0.1;
        // Source cutoff 0.08: sees only the directly opposite particle of a
        // row offset by 0.05, nothing of a row offset by 0.2.
        let source = row_body(4, 0.0, spacing, 0.04);
        let near = row_body(4, 0.05, spacing, 0.04);
        let far = row_body(4, 0.2, spacing, 0.04);

        let mut relation = ContactRelation::new(&source, 2);
        relation.update_configuration(&source, &[&near, &far]);

        for i in 0..4 {
            let toward_near = relation.neighborhood(0, i);
            assert_eq!(toward_near.indices(), &[i]);
            assert!((toward_near.r_ij()[0] - 0.05).abs() < 1e-12);
            // Direction points from the target particle toward the source.
            assert!((toward_near.e_ij()[0][0] - (-1.0)).abs() < 1e-12);

            assert!(relation.neighborhood(1, i).is_empty());
        }
    }

    #[test]
    fn contact_search_widens_for_finer_target_grids() {
        // Target kernel four times finer: its cells are smaller than the
        // source cutoff, so depth 1 would miss neighbors near the cutoff.
        let source = row_body(1, 0.0, 0.1, 0.2); // cutoff 0.4
        let target = row_body(8, 0.35, 0.1, 0.05); // cell size 0.1

        let mut relation = ContactRelation::new(&source, 1);
        relation.update_configuration(&source, &[&target]);

        let neighborhood = relation.neighborhood(0, 0);
        let mut found = neighborhood.indices().to_vec();
        found.sort_unstable();

        // Distances from [0, 0] to [0.35, j * 0.1]; within 0.4 for j <= 1.
        assert_eq!(found, vec![0, 1]);
    }

    #[test]
    fn complex_relation_updates_both_parts() {
        // Lattice over [0, 0.9]^2, cutoff 0.15; the wall column at x = 0.5
        // is within reach of the lattice columns around it.
        let source = lattice_body(10, 0.1);
        let wall = row_body(6, 0.5, 0.1, 0.075);

        let mut relation = ComplexRelation::new(&source, 1);
        relation.update_configuration(&source, &[&wall]);

        let inner_records: usize = relation
            .inner()
            .neighborhoods()
            .iter()
            .map(Neighborhood::len)
            .sum();
        assert!(inner_records > 0);

        let contact_records: usize = relation
            .contact()
            .neighborhoods(0)
            .iter()
            .map(Neighborhood::len)
            .sum();
        assert!(contact_records > 0);

        // An inner-only refresh leaves the contact side untouched.
        let before = relation.contact().neighborhoods(0).to_vec();
        relation.update_inner_configuration(&source);
        assert_eq!(relation.contact().neighborhoods(0), &before[..]);
    }
}
