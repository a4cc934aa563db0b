//! Dissipative particle dynamics (DPD) thermostat.
//!
//! Injects and removes kinetic energy through pairwise friction and random
//! forces between neighboring particles, so the system temperature relaxes
//! to a target value while every pair contribution conserves momentum
//! exactly. Both the standard coupling along the pair axis and a transverse
//! variant (forces projected onto the plane orthogonal to the pair axis)
//! are provided; they can be active together.
//!
//! # Example
//!
//! ```
//! use meso_dpd::DpdThermostat;
//! use meso_md::{Integrator, MdSystem, Particle, SoftRepulsion, StdSource, shared_source};
//! use meso_math::Vec3;
//! use std::sync::Arc;
//!
//! let mut system = MdSystem::new(Arc::new(SoftRepulsion::new(25.0, 1.0)));
//! system.set_random_source(shared_source(StdSource::seeded(7)));
//! for i in 0..8 {
//!     system.add_particle(Particle::at(Vec3::new(i as f64 * 0.8, 0.0, 0.0)));
//! }
//!
//! let thermostat = DpdThermostat::shared(&system).unwrap();
//! {
//!     let mut t = thermostat.lock();
//!     t.set_gamma(4.5);
//!     t.set_temperature(1.0);
//! }
//!
//! let mut integrator = Integrator::new(0.01);
//! DpdThermostat::connect(&thermostat, &mut integrator);
//! integrator.run(&mut system, 100);
//! ```

pub mod thermostat;

pub use thermostat::DpdThermostat;

use thiserror::Error;

/// Errors from thermostat construction.
#[derive(Debug, Error)]
pub enum DpdError {
    #[error("system has no random source")]
    MissingRandomSource,
}

pub type Result<T> = std::result::Result<T, DpdError>;
