//! End-to-end tests of the DPD thermostat driven through the integrator.

use meso_dpd::DpdThermostat;
use meso_md::{
    Integrator, LennardJones, MdSystem, Particle, SoftRepulsion, StdSource, UniformSource,
    shared_source,
};
use meso_math::Vec3;
use std::sync::Arc;

/// Source pinned to a constant value.
struct ConstSource(f64);

impl UniformSource for ConstSource {
    fn draw(&mut self) -> f64 {
        self.0
    }
}

/// Cubic lattice fluid with soft repulsion and a seeded random source.
fn lattice_fluid(n_side: usize, spacing: f64, seed: u64) -> MdSystem {
    let mut system = MdSystem::new(Arc::new(SoftRepulsion::new(25.0, 1.0)));
    system.set_random_source(shared_source(StdSource::seeded(seed)));

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
    system
}

/// Ideal-gas system (zero-amplitude conservative field) so only the
/// thermostat moves anything.
fn ideal_gas(n_side: usize, spacing: f64, seed: u64) -> MdSystem {
    let mut system = MdSystem::new(Arc::new(LennardJones::new(0.0, 1.0, 1.0)));
    system.set_random_source(shared_source(StdSource::seeded(seed)));

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
    system
}

#[test]
fn pinned_central_draws_leave_a_still_pair_in_place() {
    // Two particles at separation 0.5, cutoff 1.0, no skin, γ = 1, T = 1,
    // dt = 0.01, zero relative velocity, every draw pinned to 0.5: both the
    // noise and the friction term vanish, so nothing ever moves.
    let mut system = MdSystem::new(Arc::new(LennardJones::new(0.0, 1.0, 1.0)));
    system.neighbor_list.skin = 0.0;
    system.set_random_source(shared_source(ConstSource(0.5)));
    system.add_particle(Particle::at(Vec3::zeros()));
    system.add_particle(Particle::at(Vec3::new(0.5, 0.0, 0.0)));

    let thermostat = DpdThermostat::shared(&system).unwrap();
    {
        let mut t = thermostat.lock();
        t.set_gamma(1.0);
        t.set_temperature(1.0);
    }

    let mut integrator = Integrator::new(0.01);
    DpdThermostat::connect(&thermostat, &mut integrator);
    integrator.run(&mut system, 10);

    for particle in &system.particles {
        assert_eq!(particle.v, Vec3::zeros());
        assert_eq!(particle.f, Vec3::zeros());
    }
    assert_eq!(system.particles[0].x, Vec3::zeros());
    assert_eq!(system.particles[1].x, Vec3::new(0.5, 0.0, 0.0));
}

#[test]
fn thermostatted_run_conserves_momentum() {
    let mut system = lattice_fluid(4, 0.8, 11);
    let thermostat = DpdThermostat::shared(&system).unwrap();
    {
        let mut t = thermostat.lock();
        t.set_gamma(4.5);
        t.set_tgamma(1.0);
        t.set_temperature(1.0);
    }

    let mut integrator = Integrator::new(0.01);
    DpdThermostat::connect(&thermostat, &mut integrator);
    integrator.run(&mut system, 200);

    assert!(system.temperature() > 0.05, "thermostat never kicked in");
    let drift = system.total_momentum().norm();
    assert!(drift < 1e-9, "momentum drift {drift:.3e}");
}

#[test]
fn cold_fluid_heats_to_target_temperature() {
    let mut system = lattice_fluid(4, 0.8, 23);
    let thermostat = DpdThermostat::shared(&system).unwrap();
    {
        let mut t = thermostat.lock();
        t.set_gamma(4.5);
        t.set_temperature(1.0);
    }

    let mut integrator = Integrator::new(0.01);
    DpdThermostat::connect(&thermostat, &mut integrator);
    integrator.run(&mut system, 2000);

    let t = system.temperature();
    assert!(
        (0.5..1.5).contains(&t),
        "temperature {t:.3} not near target 1.0"
    );
}

#[test]
fn restart_recalculation_keeps_statistics_sane() {
    let mut system = lattice_fluid(4, 0.8, 37);
    let thermostat = DpdThermostat::shared(&system).unwrap();
    {
        let mut t = thermostat.lock();
        t.set_gamma(4.5);
        t.set_temperature(1.0);
    }

    let mut integrator = Integrator::new(0.01);
    DpdThermostat::connect(&thermostat, &mut integrator);
    integrator.run(&mut system, 1000);

    // Leaving and re-entering the loop recomputes forces under the
    // heat-up/cool-down bracket; the run must continue unperturbed.
    integrator.invalidate_forces();
    integrator.run(&mut system, 1000);

    let t = system.temperature();
    assert!(
        (0.5..1.5).contains(&t),
        "temperature {t:.3} not near target 1.0 after restart"
    );
}

#[test]
fn disconnect_halts_thermostat_forces() {
    let mut system = ideal_gas(3, 0.9, 51);
    let thermostat = DpdThermostat::shared(&system).unwrap();
    {
        let mut t = thermostat.lock();
        t.set_gamma(4.5);
        t.set_temperature(1.0);
    }

    let mut integrator = Integrator::new(0.01);
    DpdThermostat::connect(&thermostat, &mut integrator);
    integrator.run(&mut system, 100);
    assert!(system.temperature() > 0.05);

    thermostat.lock().disconnect(&mut integrator);
    let t_before = system.temperature();
    integrator.run(&mut system, 100);

    // With the thermostat gone and no conservative forces, velocities are
    // frozen.
    assert_eq!(system.temperature(), t_before);
}

#[test]
fn double_connect_applies_forces_once() {
    let run = |connects: usize| -> Vec<Vec3> {
        let mut system = lattice_fluid(3, 0.9, 99);
        let thermostat = DpdThermostat::shared(&system).unwrap();
        {
            let mut t = thermostat.lock();
            t.set_gamma(4.5);
            t.set_temperature(1.0);
        }

        let mut integrator = Integrator::new(0.01);
        for _ in 0..connects {
            DpdThermostat::connect(&thermostat, &mut integrator);
        }
        integrator.run(&mut system, 20);
        system.particles.iter().map(|p| p.v).collect()
    };

    assert_eq!(run(1), run(2));
}
