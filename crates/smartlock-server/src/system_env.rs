//! Production Environment implementation using tokio time and OS entropy.
//!
//! This module provides `SystemEnv`, the production implementation of the
//! `Environment` trait.

use std::time::Duration;

use smartlock_core::{EntropyError, Environment};

/// Production environment using tokio timers and cryptographic RNG.
///
/// This implementation:
/// - Uses `tokio::time::sleep()` for the re-lock delay
/// - Uses `getrandom` for challenge entropy
///
/// # Security
///
/// The RNG uses `getrandom` which provides OS-level cryptographic randomness.
/// A failure is returned to the caller so no predictable challenge is ever
/// issued.
#[derive(Clone, Debug, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buffer).map_err(|e| {
            tracing::error!("getrandom failed: {}", e);
            EntropyError::new(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_random_bytes_are_random() {
        let env = SystemEnv::new();

        let mut bytes1 = [0u8; 32];
        let mut bytes2 = [0u8; 32];

        env.random_bytes(&mut bytes1).unwrap();
        env.random_bytes(&mut bytes2).unwrap();

        // Extremely unlikely to be equal if random
        assert_ne!(bytes1, bytes2, "Random bytes should differ");
    }

    #[test]
    fn system_env_random_u32_varies() {
        let env = SystemEnv::new();

        let values: Vec<u32> = (0..8).map(|_| env.random_u32().unwrap()).collect();
        assert!(values.windows(2).any(|w| w[0] != w[1]), "values should not all repeat");
    }

    #[tokio::test(start_paused = true)]
    async fn system_env_sleep_works() {
        let env = SystemEnv::new();

        let start = tokio::time::Instant::now();
        env.sleep(Duration::from_millis(50)).await;

        assert!(start.elapsed() >= Duration::from_millis(50), "Sleep should wait at least 50ms");
    }
}
