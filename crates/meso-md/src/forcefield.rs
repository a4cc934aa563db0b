//! Conservative pair potentials for the MD host.

use meso_math::Vec3;

/// A pure pair interaction.
///
/// Given r_ij = x_j − x_i, returns (force on i, potential energy); the force
/// on j is the exact negative.
pub trait ForceField: Send + Sync {
    fn compute_force(&self, r_ij: Vec3) -> (Vec3, f64);

    /// Interaction cutoff, used to size the neighbor list.
    fn cutoff(&self) -> f64;
}

/// Lennard-Jones 12-6 potential: V(r) = 4ε [(σ/r)^12 − (σ/r)^6].
#[derive(Clone, Debug)]
pub struct LennardJones {
    /// Well depth.
    pub epsilon: f64,
    /// Zero-crossing distance.
    pub sigma: f64,
    /// Cutoff radius (typically 2.5σ).
    pub r_cut: f64,
}

impl LennardJones {
    /// Create a Lennard-Jones potential with the given parameters.
    pub fn new(epsilon: f64, sigma: f64, r_cut: f64) -> Self {
        Self {
            epsilon,
            sigma,
            r_cut,
        }
    }

    /// Reduced-unit fluid (ε = σ = 1) with the conventional 2.5σ cutoff.
    pub fn reduced() -> Self {
        Self::new(1.0, 1.0, 2.5)
    }
}

impl ForceField for LennardJones {
    fn compute_force(&self, r_ij: Vec3) -> (Vec3, f64) {
        let r = r_ij.norm();
        if r > self.r_cut || r < 1e-10 {
            return (Vec3::zeros(), 0.0);
        }

        let s_r = self.sigma / r;
        let s_r6 = s_r.powi(6);
        let s_r12 = s_r6 * s_r6;

        let potential = 4.0 * self.epsilon * (s_r12 - s_r6);

        // dV/dr = 24ε/r [(σ/r)^6 − 2(σ/r)^12]; F_i = dV/dr · r_ij/r.
        let dv_dr = 24.0 * self.epsilon / r * (s_r6 - 2.0 * s_r12);
        let force = dv_dr * r_ij / r;

        (force, potential)
    }

    fn cutoff(&self) -> f64 {
        self.r_cut
    }
}

/// Soft linear repulsion customary for DPD fluids:
/// F = a (1 − r/r_c) r̂ for r < r_c, with U(r) = a r_c (1 − r/r_c)² / 2.
///
/// Finite at r = 0, which is what allows the large timesteps DPD is run at.
#[derive(Clone, Debug)]
pub struct SoftRepulsion {
    /// Repulsion amplitude.
    pub a: f64,
    /// Cutoff radius.
    pub r_cut: f64,
}

impl SoftRepulsion {
    /// Create a soft repulsion with the given amplitude and cutoff.
    pub fn new(a: f64, r_cut: f64) -> Self {
        Self { a, r_cut }
    }
}

impl ForceField for SoftRepulsion {
    fn compute_force(&self, r_ij: Vec3) -> (Vec3, f64) {
        let r = r_ij.norm();
        if r >= self.r_cut || r < 1e-10 {
            return (Vec3::zeros(), 0.0);
        }

        let w = 1.0 - r / self.r_cut;
        let potential = 0.5 * self.a * self.r_cut * w * w;

        // dV/dr = −a w; F_i = dV/dr · r_ij/r points away from j.
        let force = -self.a * w * r_ij / r;

        (force, potential)
    }

    fn cutoff(&self) -> f64 {
        self.r_cut
    }
}
