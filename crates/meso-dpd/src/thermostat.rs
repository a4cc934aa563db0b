//! Pairwise DPD friction/noise kernel and its integrator lifecycle glue.

use crate::{DpdError, Result};
use log::{debug, info};
use meso_math::{Vec3, orthogonal_projector};
use meso_md::{
    HookToken, Integrator, LifecycleHook, MdSystem, Phase, SharedSource, ShearContext,
    StepContext, UniformSource, minimum_image,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Below this squared separation a pair is treated as coincident and
/// skipped; the pair unit vector is undefined there.
const MIN_DIST_SQR: f64 = 1e-20;

/// Active lifecycle subscriptions of a connected thermostat.
#[derive(Debug, Default)]
struct ConnectionSet {
    tokens: Vec<HookToken>,
}

impl ConnectionSet {
    fn is_connected(&self) -> bool {
        !self.tokens.is_empty()
    }
}

/// DPD thermostat.
///
/// Applies, per neighbor pair and per force evaluation, a friction force
/// opposing relative motion and a balancing random force whose variance is
/// tied to the friction coefficient by the fluctuation-dissipation relation,
/// so kinetic energy relaxes to the target temperature. `gamma` controls
/// coupling along the pair axis, `tgamma` an independent coupling in the
/// plane orthogonal to it; either may be zero.
///
/// Parameter changes take effect at the next [`initialize`](Self::initialize),
/// which the integrator fires on every run entry. Values are stored as
/// given; nothing validates them.
pub struct DpdThermostat {
    gamma: f64,
    tgamma: f64,
    temperature: f64,

    pref1: f64,
    pref2: f64,
    pref3: f64,
    pref4: f64,
    pref2_buffer: f64,
    pref4_buffer: f64,
    heat_depth: u32,

    cutoff: f64,
    cutoff_sqr: f64,

    rng: SharedSource,
    connections: ConnectionSet,
}

impl DpdThermostat {
    /// Create a thermostat bound to the host's random source.
    ///
    /// Fails if the system has no random source. The interaction cutoff is
    /// the neighbor list's search radius minus the skin margin, snapshotted
    /// here and refreshed on every [`initialize`](Self::initialize).
    pub fn new(system: &MdSystem) -> Result<Self> {
        let rng = system.rng.clone().ok_or(DpdError::MissingRandomSource)?;

        let cutoff = system.neighbor_list.search_radius() - system.skin();
        info!("DPD thermostat constructed, cutoff = {cutoff}");

        Ok(Self {
            gamma: 0.0,
            tgamma: 0.0,
            temperature: 0.0,
            pref1: 0.0,
            pref2: 0.0,
            pref3: 0.0,
            pref4: 0.0,
            pref2_buffer: 0.0,
            pref4_buffer: 0.0,
            heat_depth: 0,
            cutoff,
            cutoff_sqr: cutoff * cutoff,
            rng,
            connections: ConnectionSet::default(),
        })
    }

    /// [`new`](Self::new), wrapped into the shared handle
    /// [`connect`](Self::connect) expects.
    pub fn shared(system: &MdSystem) -> Result<Arc<Mutex<Self>>> {
        Ok(Arc::new(Mutex::new(Self::new(system)?)))
    }

    /// Friction coefficient along the pair axis.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f64) {
        self.gamma = gamma;
    }

    /// Transverse friction coefficient.
    pub fn tgamma(&self) -> f64 {
        self.tgamma
    }

    pub fn set_tgamma(&mut self, tgamma: f64) {
        self.tgamma = tgamma;
    }

    /// Target reduced temperature.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Whether the thermostat currently holds lifecycle subscriptions.
    pub fn is_connected(&self) -> bool {
        self.connections.is_connected()
    }

    /// Subscribe to the integrator lifecycle: initialization on run entry,
    /// the restart-correction bracket, and the force-application stage of
    /// every step.
    ///
    /// Idempotent: connecting an already-connected thermostat is a no-op,
    /// so force contributions can never be duplicated.
    pub fn connect(this: &Arc<Mutex<Self>>, integrator: &mut Integrator) {
        let mut guard = this.lock();
        if guard.connections.is_connected() {
            return;
        }

        for phase in [
            Phase::RunInit,
            Phase::PreForceRecalc,
            Phase::PostForceRecalc,
            Phase::ForceApply,
        ] {
            let concrete = Arc::clone(this);
            let hook: Arc<Mutex<dyn LifecycleHook>> = concrete;
            let token = integrator.register(phase, hook);
            guard.connections.tokens.push(token);
        }
    }

    /// Remove all lifecycle subscriptions. Safe to call repeatedly.
    pub fn disconnect(&mut self, integrator: &mut Integrator) {
        for token in self.connections.tokens.drain(..) {
            integrator.unregister(token);
        }
    }

    /// Derive the friction/noise prefactors from the current parameters,
    /// timestep, and cutoff.
    ///
    /// The noise prefactors encode the fluctuation-dissipation balance for
    /// uniform per-step draws: a draw shifted by −0.5 has variance 1/12, and
    /// the factor 24 makes the random-force variance 2γT/dt as required.
    /// This is the only place prefactors are derived; it must run after any
    /// parameter, timestep, or cutoff change and fires automatically at
    /// every run entry.
    pub fn initialize(&mut self, system: &MdSystem, dt: f64) {
        self.cutoff = system.neighbor_list.search_radius() - system.skin();
        self.cutoff_sqr = self.cutoff * self.cutoff;

        info!(
            "init: dt = {dt}, gamma = {}, tgamma = {}, temperature = {}",
            self.gamma, self.tgamma, self.temperature
        );

        self.pref1 = self.gamma;
        self.pref2 = (24.0 * self.temperature * self.gamma / dt).sqrt();
        self.pref3 = self.tgamma;
        self.pref4 = (24.0 * self.temperature * self.tgamma / dt).sqrt();
    }

    /// Amplify the noise prefactors by √3 around an extra force evaluation.
    ///
    /// When forces are recomputed on re-entering the run loop, the random
    /// force is drawn once more than a completed step would have drawn it,
    /// which changes its effective variance; the amplification of the single
    /// compensating draw restores the intended statistics. Calls nest:
    /// amplification happens on the 0→1 depth transition only, and
    /// [`cool_down`](Self::cool_down) undoes it on 1→0.
    pub fn heat_up(&mut self) {
        self.heat_depth += 1;
        if self.heat_depth > 1 {
            return;
        }

        info!("heat up");
        self.pref2_buffer = self.pref2;
        self.pref2 *= 3.0_f64.sqrt();
        self.pref4_buffer = self.pref4;
        self.pref4 *= 3.0_f64.sqrt();
    }

    /// Restore the noise prefactors buffered by [`heat_up`](Self::heat_up).
    ///
    /// Without a matching heat-up this is a no-op.
    pub fn cool_down(&mut self) {
        match self.heat_depth {
            0 => {}
            1 => {
                info!("cool down");
                self.heat_depth = 0;
                self.pref2 = self.pref2_buffer;
                self.pref4 = self.pref4_buffer;
            }
            _ => self.heat_depth -= 1,
        }
    }

    /// Apply friction and random forces to every neighbor pair, once per
    /// force evaluation.
    ///
    /// Particle velocities must be current for this step before this runs
    /// (in a distributed host: ghost velocities synchronized). Before the
    /// first [`initialize`](Self::initialize) all prefactors are zero and
    /// the pass leaves forces untouched.
    pub fn thermalize(&mut self, system: &mut MdSystem) {
        debug!("thermalize: {} pairs", system.neighbor_list.pairs.len());

        let mut rng = self.rng.lock();

        for &(i, j) in &system.neighbor_list.pairs {
            let mut r = system.particles[i].x - system.particles[j].x;
            if let Some(cell) = system.cell {
                r = minimum_image(r, cell);
            }
            let dv = system.particles[i].v - system.particles[j].v;

            if self.gamma > 0.0 {
                if let Some((unit, f)) = self.longitudinal_kick(r, dv, &mut *rng) {
                    system.particles[i].add_force(f);
                    system.particles[j].add_force(-f);
                    accumulate_stress(&mut system.shear, &unit, &f);
                }
            }
            if self.tgamma > 0.0 {
                if let Some((unit, f)) = self.transverse_kick(r, dv, &mut *rng) {
                    system.particles[i].add_force(f);
                    system.particles[j].add_force(-f);
                    accumulate_stress(&mut system.shear, &unit, &f);
                }
            }
        }
    }

    /// Standard DPD coupling along the pair axis.
    ///
    /// Returns the pair unit vector and the force on the first particle, or
    /// None for pairs at or beyond the cutoff (which consume no draws).
    fn longitudinal_kick(
        &self,
        r: Vec3,
        dv: Vec3,
        rng: &mut dyn UniformSource,
    ) -> Option<(Vec3, Vec3)> {
        let dist_sqr = r.norm_squared();
        if dist_sqr >= self.cutoff_sqr || dist_sqr < MIN_DIST_SQR {
            return None;
        }

        let dist = dist_sqr.sqrt();
        let omega = 1.0 - dist / self.cutoff;
        let unit = r / dist;

        let veldiff = dv.dot(&unit);
        let friction = self.pref1 * omega * omega * veldiff;
        let noise = self.pref2 * omega * (rng.draw() - 0.5);

        Some((unit, (noise - friction) * unit))
    }

    /// Transverse coupling: friction and noise projected onto the plane
    /// orthogonal to the pair axis, leaving relative radial motion
    /// untouched.
    fn transverse_kick(
        &self,
        r: Vec3,
        dv: Vec3,
        rng: &mut dyn UniformSource,
    ) -> Option<(Vec3, Vec3)> {
        let dist_sqr = r.norm_squared();
        if dist_sqr >= self.cutoff_sqr || dist_sqr < MIN_DIST_SQR {
            return None;
        }

        let dist = dist_sqr.sqrt();
        let omega = 1.0 - dist / self.cutoff;
        let unit = r / dist;

        let noisevec = Vec3::new(rng.draw() - 0.5, rng.draw() - 0.5, rng.draw() - 0.5);

        // P dv = (I − r̂ r̂ᵀ) dv, and the same for the noise vector.
        let projector = orthogonal_projector(&unit);
        let damping = self.pref3 * omega * omega * (projector * dv);
        let random = self.pref4 * omega * (projector * noisevec);

        Some((unit, random - damping))
    }
}

/// Off-diagonal dyadic stress sums, accumulated only in shear mode with
/// viscosity analysis on.
fn accumulate_stress(shear: &mut ShearContext, unit: &Vec3, f: &Vec3) {
    if shear.enabled && shear.viscosity_analysis {
        shear.dyadic_xz += unit.x * f.z;
        shear.dyadic_zx += unit.z * f.x;
    }
}

impl LifecycleHook for DpdThermostat {
    fn on_phase(&mut self, phase: Phase, system: &mut MdSystem, ctx: &StepContext) {
        match phase {
            Phase::RunInit => self.initialize(system, ctx.dt),
            Phase::PreForceRecalc => self.heat_up(),
            Phase::PostForceRecalc => self.cool_down(),
            Phase::ForceApply => self.thermalize(system),
        }
    }
}
