//! Velocity Verlet integrator with lifecycle hooks.
//!
//! Extensions (thermostats and the like) subscribe to named lifecycle
//! phases through an explicit registration table: each phase keeps an
//! ordered list of (token, hook) entries, so subscription lifetime and
//! duplicate handling are visible to callers rather than hidden inside an
//! opaque signal object.

use crate::MdSystem;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

/// Lifecycle phases fired by [`Integrator::run`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Start of every `run` call, before any force work.
    RunInit,
    /// Before an out-of-loop force recalculation.
    PreForceRecalc,
    /// After an out-of-loop force recalculation.
    PostForceRecalc,
    /// Force-application stage of every force evaluation.
    ForceApply,
}

impl Phase {
    const COUNT: usize = 4;

    fn index(self) -> usize {
        match self {
            Phase::RunInit => 0,
            Phase::PreForceRecalc => 1,
            Phase::PostForceRecalc => 2,
            Phase::ForceApply => 3,
        }
    }
}

/// Per-invocation context handed to hooks.
#[derive(Clone, Copy, Debug)]
pub struct StepContext {
    /// Integration timestep.
    pub dt: f64,
    /// Completed step count.
    pub step: usize,
}

/// An integrator extension invoked at the phases it registered for.
pub trait LifecycleHook: Send {
    fn on_phase(&mut self, phase: Phase, system: &mut MdSystem, ctx: &StepContext);
}

/// Shared handle to a hook, registrable at several phases.
pub type SharedHook = Arc<Mutex<dyn LifecycleHook>>;

/// Opaque handle identifying one registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HookToken(u64);

struct HookEntry {
    token: HookToken,
    hook: SharedHook,
}

/// Ordered per-phase registration table.
pub struct HookRegistry {
    next_token: u64,
    slots: [Vec<HookEntry>; Phase::COUNT],
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self {
            next_token: 0,
            slots: std::array::from_fn(|_| Vec::new()),
        }
    }
}

impl HookRegistry {
    /// Append a hook to a phase; returns the token for later removal.
    pub fn register(&mut self, phase: Phase, hook: SharedHook) -> HookToken {
        let token = HookToken(self.next_token);
        self.next_token += 1;
        self.slots[phase.index()].push(HookEntry { token, hook });
        token
    }

    /// Remove a registration by token. Returns false if the token is
    /// unknown (already removed, or never issued here).
    pub fn unregister(&mut self, token: HookToken) -> bool {
        for slot in &mut self.slots {
            if let Some(pos) = slot.iter().position(|entry| entry.token == token) {
                slot.remove(pos);
                return true;
            }
        }
        false
    }

    fn fire(&self, phase: Phase, system: &mut MdSystem, ctx: &StepContext) {
        for entry in &self.slots[phase.index()] {
            entry.hook.lock().on_phase(phase, system, ctx);
        }
    }
}

/// Velocity Verlet integrator driving the host lifecycle.
pub struct Integrator {
    /// Timestep.
    pub dt: f64,
    /// Elapsed simulation time.
    pub time: f64,
    /// Completed steps.
    pub step: usize,
    /// Rebuild the neighbor list at least every this many steps.
    pub rebuild_interval: usize,
    hooks: HookRegistry,
    forces_valid: bool,
}

impl Integrator {
    /// Create an integrator with the given timestep.
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            time: 0.0,
            step: 0,
            rebuild_interval: 10,
            hooks: HookRegistry::default(),
            forces_valid: false,
        }
    }

    /// Subscribe a hook to a lifecycle phase.
    pub fn register(&mut self, phase: Phase, hook: SharedHook) -> HookToken {
        self.hooks.register(phase, hook)
    }

    /// Remove a subscription.
    pub fn unregister(&mut self, token: HookToken) -> bool {
        self.hooks.unregister(token)
    }

    /// Request a full force recalculation (with the recalc bracket) on the
    /// next `run` entry. Call after mutating positions, velocities, or
    /// interactions between runs.
    pub fn invalidate_forces(&mut self) {
        self.forces_valid = false;
    }

    fn context(&self) -> StepContext {
        StepContext {
            dt: self.dt,
            step: self.step,
        }
    }

    /// Run `n_steps` of Velocity Verlet.
    ///
    /// Entry protocol: `RunInit` fires first. If forces are stale (first
    /// run, or after [`invalidate_forces`](Self::invalidate_forces)) a full
    /// force evaluation runs bracketed by `PreForceRecalc` /
    /// `PostForceRecalc`, giving stochastic extensions the chance to correct
    /// for the extra evaluation.
    pub fn run(&mut self, system: &mut MdSystem, n_steps: usize) {
        let ctx = self.context();
        self.hooks.fire(Phase::RunInit, system, &ctx);

        if !self.forces_valid {
            debug!("recalculating forces on run entry");
            self.refresh_neighbors(system, true);
            self.hooks.fire(Phase::PreForceRecalc, system, &ctx);
            self.update_forces(system);
            self.hooks.fire(Phase::PostForceRecalc, system, &ctx);
            self.forces_valid = true;
        }

        for _ in 0..n_steps {
            self.step_once(system);
        }
    }

    /// One Velocity Verlet step:
    /// x(t+dt) = x + v dt + a dt²/2, half-kick, new forces, half-kick.
    fn step_once(&mut self, system: &mut MdSystem) {
        let dt = self.dt;

        let old_accel: Vec<_> = system.particles.iter().map(|p| p.f / p.mass).collect();

        for (particle, &a) in system.particles.iter_mut().zip(&old_accel) {
            particle.x += particle.v * dt + 0.5 * a * dt * dt;
            particle.v += 0.5 * a * dt;

            if let Some(cell) = system.cell {
                for d in 0..3 {
                    if particle.x[d] < 0.0 {
                        particle.x[d] += cell[d];
                    } else if particle.x[d] >= cell[d] {
                        particle.x[d] -= cell[d];
                    }
                }
            }
        }

        self.refresh_neighbors(system, self.step.is_multiple_of(self.rebuild_interval));
        self.update_forces(system);

        for particle in &mut system.particles {
            let a = particle.f / particle.mass;
            particle.v += 0.5 * a * dt;
        }

        self.time += dt;
        self.step += 1;
    }

    fn refresh_neighbors(&self, system: &mut MdSystem, force: bool) {
        if force || system.neighbor_list.needs_rebuild(&system.particles, system.cell) {
            system.neighbor_list.build(&system.particles, system.cell);
        }
    }

    /// Zero accumulators, apply the conservative pair field, then fire the
    /// `ForceApply` phase for extensions.
    fn update_forces(&mut self, system: &mut MdSystem) {
        for particle in &mut system.particles {
            particle.reset_force();
        }

        let field = Arc::clone(&system.force_field);
        for &(i, j) in &system.neighbor_list.pairs {
            let mut r_ij = system.particles[j].x - system.particles[i].x;
            if let Some(cell) = system.cell {
                r_ij = crate::neighbor::minimum_image(r_ij, cell);
            }

            let (force_on_i, _) = field.compute_force(r_ij);
            system.particles[i].add_force(force_on_i);
            system.particles[j].add_force(-force_on_i);
        }

        let ctx = self.context();
        self.hooks.fire(Phase::ForceApply, system, &ctx);
    }
}
