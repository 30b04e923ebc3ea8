//! Deterministic Environment implementation.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use smartlock_core::{EntropyError, Environment};

#[derive(Debug)]
enum Entropy {
    Seeded(ChaCha8Rng),
    Scripted(VecDeque<u32>),
    Exhausted,
}

/// Simulation environment with reproducible entropy.
///
/// This implementation provides:
///
/// - **Virtual Time**: `sleep()` uses tokio's timer, so tests running with a
///   paused clock advance through the re-lock delay instantly.
///
/// - **Seeded RNG**: the same seed yields the same challenge sequence.
///
/// - **Scripted values**: each 4-byte draw returns the next queued `u32`,
///   which pins challenges to known text.
///
/// Clones share the same entropy stream.
#[derive(Clone, Debug)]
pub struct SimEnv {
    entropy: Arc<Mutex<Entropy>>,
}

impl SimEnv {
    /// Environment backed by a ChaCha RNG seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_entropy(Entropy::Seeded(ChaCha8Rng::seed_from_u64(seed)))
    }

    /// Environment that yields `values` in order, then fails.
    pub fn scripted(values: impl IntoIterator<Item = u32>) -> Self {
        Self::from_entropy(Entropy::Scripted(values.into_iter().collect()))
    }

    /// Environment whose entropy source is permanently unavailable.
    pub fn exhausted() -> Self {
        Self::from_entropy(Entropy::Exhausted)
    }

    fn from_entropy(entropy: Entropy) -> Self {
        Self { entropy: Arc::new(Mutex::new(entropy)) }
    }
}

impl Environment for SimEnv {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let mut entropy = self.entropy.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *entropy {
            Entropy::Seeded(rng) => {
                rng.fill_bytes(buffer);
                Ok(())
            },
            Entropy::Scripted(values) => {
                let value =
                    values.pop_front().ok_or_else(|| EntropyError::new("scripted values exhausted"))?;
                for (dst, src) in buffer.iter_mut().zip(value.to_be_bytes().iter().cycle()) {
                    *dst = *src;
                }
                Ok(())
            },
            Entropy::Exhausted => Err(EntropyError::new("simulated entropy failure")),
        }
    }
}
