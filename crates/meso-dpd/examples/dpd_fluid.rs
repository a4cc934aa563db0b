//! DPD fluid: soft conservative repulsion plus the DPD thermostat.
//!
//! Builds a cubic lattice fluid, thermostats it to T = 1.0, and prints the
//! temperature trace along with the total momentum (which stays at zero).

use meso_dpd::DpdThermostat;
use meso_md::{Integrator, MdSystem, Particle, SoftRepulsion, StdSource, shared_source};
use meso_math::Vec3;
use std::sync::Arc;

fn main() {
    env_logger::init();

    let n_side = 6;
    let spacing = 0.8;

    let mut system = MdSystem::new(Arc::new(SoftRepulsion::new(25.0, 1.0)));
    system.set_random_source(shared_source(StdSource::seeded(2024)));

    for ix in 0..n_side {
        for iy in 0..n_side {
            for iz in 0..n_side {
                system.add_particle(Particle::at(Vec3::new(
                    ix as f64 * spacing,
                    iy as f64 * spacing,
                    iz as f64 * spacing,
                )));
            }
        }
    }
    let edge = n_side as f64 * spacing;
    system.set_cell(Vec3::new(edge, edge, edge));

    println!(
        "{} particles in a {edge:.1}³ box, target T = 1.0",
        system.particles.len()
    );

    let thermostat = DpdThermostat::shared(&system).expect("random source installed above");
    {
        let mut t = thermostat.lock();
        t.set_gamma(4.5);
        t.set_tgamma(1.0);
        t.set_temperature(1.0);
    }

    let mut integrator = Integrator::new(0.01);
    DpdThermostat::connect(&thermostat, &mut integrator);

    println!("{:>6} {:>8} {:>10} {:>12}", "step", "time", "T", "|p|");
    for _ in 0..20 {
        integrator.run(&mut system, 100);
        println!(
            "{:6} {:8.2} {:10.4} {:12.3e}",
            integrator.step,
            integrator.time,
            system.temperature(),
            system.total_momentum().norm()
        );
    }
}
