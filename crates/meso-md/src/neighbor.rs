//! Verlet neighbor list: unique pair enumeration within a buffered cutoff.

use crate::Particle;
use meso_math::Vec3;

/// Verlet list of unique unordered particle pairs.
///
/// Pairs are collected out to `cutoff + skin`; the skin buffers particle
/// motion so the list stays valid for several steps between rebuilds. The
/// pair indices are only meaningful against the particle slice the list was
/// built from and must not be cached across rebuilds.
#[derive(Clone, Debug)]
pub struct VerletList {
    /// Unique pairs (i, j) with i < j, within the search radius at build time.
    pub pairs: Vec<(usize, usize)>,
    /// Interaction cutoff.
    pub cutoff: f64,
    /// Buffer margin added to the cutoff when collecting pairs.
    pub skin: f64,
    /// Positions at the last rebuild, for displacement tracking.
    reference: Vec<Vec3>,
}

impl VerletList {
    /// Create an empty list for the given cutoff and skin.
    pub fn new(cutoff: f64, skin: f64) -> Self {
        Self {
            pairs: Vec::new(),
            cutoff,
            skin,
            reference: Vec::new(),
        }
    }

    /// Radius the list is configured to search: cutoff + skin.
    pub fn search_radius(&self) -> f64 {
        self.cutoff + self.skin
    }

    /// Rebuild the pair list from scratch.
    pub fn build(&mut self, particles: &[Particle], cell: Option<Vec3>) {
        self.pairs.clear();
        self.reference.clear();
        self.reference.extend(particles.iter().map(|p| p.x));

        let search_sqr = self.search_radius() * self.search_radius();
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                let mut dr = particles[j].x - particles[i].x;
                if let Some(cell) = cell {
                    dr = minimum_image(dr, cell);
                }
                if dr.norm_squared() < search_sqr {
                    self.pairs.push((i, j));
                }
            }
        }
    }

    /// True once any particle has drifted more than half the skin since the
    /// last rebuild, or the particle count changed.
    pub fn needs_rebuild(&self, particles: &[Particle], cell: Option<Vec3>) -> bool {
        if self.reference.len() != particles.len() {
            return true;
        }

        let limit_sqr = (0.5 * self.skin).powi(2);
        particles.iter().zip(&self.reference).any(|(p, reference)| {
            let mut dr = p.x - reference;
            if let Some(cell) = cell {
                dr = minimum_image(dr, cell);
            }
            dr.norm_squared() > limit_sqr
        })
    }
}

/// Minimum-image convention: fold a separation vector into the primary cell.
pub fn minimum_image(mut dr: Vec3, cell: Vec3) -> Vec3 {
    for d in 0..3 {
        if dr[d] > 0.5 * cell[d] {
            dr[d] -= cell[d];
        } else if dr[d] < -0.5 * cell[d] {
            dr[d] += cell[d];
        }
    }
    dr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_image_folds_into_cell() {
        let cell = Vec3::new(10.0, 10.0, 10.0);
        let dr = minimum_image(Vec3::new(6.0, 3.0, -7.0), cell);
        assert_eq!(dr, Vec3::new(-4.0, 3.0, 3.0));
    }

    #[test]
    fn build_collects_pairs_within_search_radius() {
        let particles = vec![
            Particle::at(Vec3::zeros()),
            Particle::at(Vec3::new(1.0, 0.0, 0.0)),
            Particle::at(Vec3::new(5.0, 0.0, 0.0)),
        ];

        let mut list = VerletList::new(2.0, 0.5);
        list.build(&particles, None);

        // (0,1) at r=1.0 is inside 2.5; (0,2) and (1,2) are not.
        assert_eq!(list.pairs, vec![(0, 1)]);
        assert_eq!(list.search_radius(), 2.5);
    }

    #[test]
    fn rebuild_triggers_on_half_skin_drift() {
        let mut particles = vec![
            Particle::at(Vec3::zeros()),
            Particle::at(Vec3::new(1.0, 0.0, 0.0)),
        ];

        let mut list = VerletList::new(2.0, 0.5);
        list.build(&particles, None);
        assert!(!list.needs_rebuild(&particles, None));

        particles[0].x += Vec3::new(0.1, 0.0, 0.0);
        assert!(!list.needs_rebuild(&particles, None));

        particles[0].x += Vec3::new(0.3, 0.0, 0.0);
        assert!(list.needs_rebuild(&particles, None));
    }

    #[test]
    fn rebuild_triggers_on_count_change() {
        let mut particles = vec![Particle::at(Vec3::zeros())];
        let mut list = VerletList::new(1.0, 0.3);
        list.build(&particles, None);

        particles.push(Particle::at(Vec3::new(0.5, 0.0, 0.0)));
        assert!(list.needs_rebuild(&particles, None));
    }

    #[test]
    fn periodic_build_sees_wrapped_neighbors() {
        let particles = vec![
            Particle::at(Vec3::new(0.2, 0.0, 0.0)),
            Particle::at(Vec3::new(9.8, 0.0, 0.0)),
        ];

        let mut list = VerletList::new(1.0, 0.0);
        list.build(&particles, Some(Vec3::new(10.0, 10.0, 10.0)));

        // Across the boundary the separation is 0.4, not 9.6.
        assert_eq!(list.pairs, vec![(0, 1)]);
    }
}
