//! Host system state shared by the integrator and its extensions.

use crate::{ForceField, Particle, SharedSource, UniformSource, VerletList, minimum_image};
use meso_math::Vec3;
use std::sync::Arc;

/// Shear-flow analysis state shared with pair-force extensions.
///
/// The dyadic sums are only meaningful in aggregate over a full force pass;
/// partial reads mid-pass are not.
#[derive(Clone, Debug, Default)]
pub struct ShearContext {
    /// Shear mode active.
    pub enabled: bool,
    /// Accumulate off-diagonal stress for viscosity estimates.
    pub viscosity_analysis: bool,
    /// Running sum of r̂_x f_z over pair contributions.
    pub dyadic_xz: f64,
    /// Running sum of r̂_z f_x over pair contributions.
    pub dyadic_zx: f64,
}

/// MD host system: particle storage plus the context extensions read.
pub struct MdSystem {
    /// Particles.
    pub particles: Vec<Particle>,
    /// Conservative pair interaction.
    pub force_field: Arc<dyn ForceField>,
    /// Neighbor pair provider.
    pub neighbor_list: VerletList,
    /// Periodic cell (None = open boundaries).
    pub cell: Option<Vec3>,
    /// Shear-flow flags and stress accumulators.
    pub shear: ShearContext,
    /// Uniform draw source handed to stochastic extensions.
    pub rng: Option<SharedSource>,
}

impl MdSystem {
    /// Create a system around a conservative force field.
    ///
    /// The Verlet list is sized from the field's cutoff with a default skin
    /// of 0.3; adjust `neighbor_list.skin` before the first run if needed.
    pub fn new(force_field: Arc<dyn ForceField>) -> Self {
        let neighbor_list = VerletList::new(force_field.cutoff(), 0.3);
        Self {
            particles: Vec::new(),
            force_field,
            neighbor_list,
            cell: None,
            shear: ShearContext::default(),
            rng: None,
        }
    }

    /// Add a particle.
    pub fn add_particle(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Set periodic boundary conditions.
    pub fn set_cell(&mut self, cell: Vec3) {
        self.cell = Some(cell);
    }

    /// Install the shared uniform draw source.
    pub fn set_random_source(&mut self, source: SharedSource) {
        self.rng = Some(source);
    }

    /// Neighbor-list skin margin.
    pub fn skin(&self) -> f64 {
        self.neighbor_list.skin
    }

    /// Seed velocities from a Maxwell-Boltzmann distribution at the given
    /// reduced temperature (k_B = 1) and remove center-of-mass drift.
    pub fn initialize_velocities(&mut self, temperature: f64, rng: &mut dyn UniformSource) {
        use std::f64::consts::PI;

        for particle in &mut self.particles {
            let sigma = (temperature / particle.mass).sqrt();
            for d in 0..3 {
                // Box-Muller transform over two uniform draws; u1 clamped
                // away from 0 so the log stays finite.
                let u1 = rng.draw().max(1e-12);
                let u2 = rng.draw();
                particle.v[d] = sigma * (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
            }
        }

        self.remove_com_motion();
    }

    /// Remove center-of-mass motion.
    fn remove_com_motion(&mut self) {
        let mut momentum = Vec3::zeros();
        let mut total_mass = 0.0;
        for particle in &self.particles {
            momentum += particle.mass * particle.v;
            total_mass += particle.mass;
        }
        if total_mass <= 0.0 {
            return;
        }

        let com_velocity = momentum / total_mass;
        for particle in &mut self.particles {
            particle.v -= com_velocity;
        }
    }

    /// Total kinetic energy.
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Instantaneous temperature from equipartition (reduced units).
    pub fn temperature(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        2.0 * self.kinetic_energy() / (3.0 * self.particles.len() as f64)
    }

    /// Total conservative potential energy over the current pair list.
    pub fn potential_energy(&self) -> f64 {
        let mut pe = 0.0;
        for &(i, j) in &self.neighbor_list.pairs {
            let mut r_ij = self.particles[j].x - self.particles[i].x;
            if let Some(cell) = self.cell {
                r_ij = minimum_image(r_ij, cell);
            }
            let (_, pot) = self.force_field.compute_force(r_ij);
            pe += pot;
        }
        pe
    }

    /// Total momentum.
    pub fn total_momentum(&self) -> Vec3 {
        self.particles
            .iter()
            .fold(Vec3::zeros(), |acc, p| acc + p.mass * p.v)
    }
}
