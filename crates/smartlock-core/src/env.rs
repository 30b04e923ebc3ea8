//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples lock logic from system resources (time
//! and entropy). This enables:
//!
//! - Deterministic Simulation: a seeded or scripted entropy source makes every
//!   issued challenge reproducible, and virtual time makes the re-lock delay
//!   instant to test.
//!
//! - Production Runtime: OS entropy and tokio timers, without any change to
//!   the state machine.
//!
//! # Invariants
//!
//! - Fail closed: when entropy is unavailable `random_bytes()` returns an
//!   error; it never fills the buffer with a predictable fallback
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::time::Duration;

use thiserror::Error;

/// The entropy source could not produce random bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entropy source unavailable: {reason}")]
pub struct EntropyError {
    /// Description of the underlying failure.
    pub reason: String,
}

impl EntropyError {
    /// Create an entropy error with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

/// Abstract environment providing randomness and async sleeping.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// 1. RNG quality: `random_bytes()` uses cryptographically secure entropy in
///    production
/// 2. No silent degradation: a failing entropy source is reported, never
///    papered over
pub trait Environment: Clone + Send + Sync + 'static {
    /// Sleeps for the specified duration.
    ///
    /// Only driver code calls this (to run the deferred re-lock). The state
    /// machine itself never waits.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Security
    ///
    /// Production implementations MUST use the OS entropy pool (`getrandom`),
    /// not a userspace PRNG seeded from the clock.
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError>;

    /// Generates a random `u32`.
    fn random_u32(&self) -> Result<u32, EntropyError> {
        let mut bytes = [0u8; 4];
        self.random_bytes(&mut bytes)?;
        Ok(u32::from_be_bytes(bytes))
    }
}
