//! Minimal molecular-dynamics host.
//!
//! Provides the pieces a pairwise force extension (such as a thermostat)
//! plugs into:
//! - particle storage with in-place force accumulators
//! - Verlet neighbor lists with a skin buffer and minimum-image convention
//! - conservative pair potentials (Lennard-Jones, soft DPD repulsion)
//! - a shared uniform-draw source for stochastic extensions
//! - a Velocity Verlet integrator whose lifecycle phases are exposed
//!   through an explicit hook registration table
//!
//! # Example
//!
//! ```
//! use meso_md::{Integrator, MdSystem, Particle, SoftRepulsion};
//! use meso_math::Vec3;
//! use std::sync::Arc;
//!
//! let mut system = MdSystem::new(Arc::new(SoftRepulsion::new(25.0, 1.0)));
//! for i in 0..4 {
//!     system.add_particle(Particle::at(Vec3::new(i as f64 * 0.7, 0.0, 0.0)));
//! }
//!
//! let mut integrator = Integrator::new(0.01);
//! integrator.run(&mut system, 100);
//! println!("T = {:.3}", system.temperature());
//! ```

pub mod forcefield;
pub mod integrator;
pub mod neighbor;
pub mod particle;
pub mod rng;
pub mod system;

pub use forcefield::{ForceField, LennardJones, SoftRepulsion};
pub use integrator::{
    HookRegistry, HookToken, Integrator, LifecycleHook, Phase, SharedHook, StepContext,
};
pub use neighbor::{VerletList, minimum_image};
pub use particle::Particle;
pub use rng::{SharedSource, StdSource, UniformSource, shared_source};
pub use system::{MdSystem, ShearContext};
