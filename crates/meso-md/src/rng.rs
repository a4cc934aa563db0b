//! Uniform random draw sources for stochastic extensions.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Draw contract used by stochastic force extensions: one uniform sample in
/// [0, 1) per call.
pub trait UniformSource: Send {
    fn draw(&mut self) -> f64;
}

/// Shared handle to a draw source, cloneable across extensions.
pub type SharedSource = Arc<Mutex<dyn UniformSource>>;

/// Wrap a source into the shared handle form.
pub fn shared_source<S: UniformSource + 'static>(source: S) -> SharedSource {
    Arc::new(Mutex::new(source))
}

/// Default source backed by `rand`'s standard generator.
pub struct StdSource(StdRng);

impl StdSource {
    /// Deterministic source for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl UniformSource for StdSource {
    fn draw(&mut self) -> f64 {
        self.0.r#gen()
    }
}
