//! Challenge generation.
//!
//! A challenge is the decimal text of a uniformly random `u32`, rendered with
//! no leading zeros. Only one challenge is live at a time; the lock machine
//! overwrites it on every issuance.

use std::fmt;

use crate::env::{EntropyError, Environment};

/// Longest possible challenge text (`u32::MAX` has ten digits).
pub const MAX_CHALLENGE_LEN: usize = 10;

/// Server-issued one-time value the client combines with the shared secret.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Challenge(String);

impl Challenge {
    /// Draw a fresh challenge from the environment's entropy source.
    ///
    /// Fails closed: if the entropy source is unavailable no challenge is
    /// produced at all.
    pub fn generate<E: Environment>(env: &E) -> Result<Self, EntropyError> {
        env.random_u32().map(Self::from_value)
    }

    /// Render a raw value as a challenge.
    pub fn from_value(value: u32) -> Self {
        Self(value.to_string())
    }

    /// Challenge text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Challenge text as bytes, the form used in verification.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length of the challenge text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the challenge text is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Challenge> for String {
    fn from(challenge: Challenge) -> Self {
        challenge.0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Clone)]
    struct FixedEnv(Option<u32>);

    impl Environment for FixedEnv {
        async fn sleep(&self, _duration: Duration) {}

        fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
            let value = self.0.ok_or_else(|| EntropyError::new("rng offline"))?;
            for (dst, src) in buffer.iter_mut().zip(value.to_be_bytes().iter().cycle()) {
                *dst = *src;
            }
            Ok(())
        }
    }

    #[test]
    fn renders_decimal_without_leading_zeros() {
        assert_eq!(Challenge::from_value(0).as_str(), "0");
        assert_eq!(Challenge::from_value(7).as_str(), "7");
        assert_eq!(Challenge::from_value(123_456).as_str(), "123456");
        assert_eq!(Challenge::from_value(u32::MAX).as_str(), "4294967295");
    }

    #[test]
    fn max_value_fits_length_bound() {
        assert_eq!(Challenge::from_value(u32::MAX).len(), MAX_CHALLENGE_LEN);
    }

    #[test]
    fn smallest_value_is_not_empty() {
        let challenge = Challenge::from_value(0);
        assert_eq!(challenge.len(), 1);
        assert!(!challenge.is_empty());
    }

    #[test]
    fn generate_uses_entropy_source() {
        let challenge = Challenge::generate(&FixedEnv(Some(123_456))).unwrap();
        assert_eq!(challenge.to_string(), "123456");
    }

    #[test]
    fn generate_fails_closed_without_entropy() {
        let err = Challenge::generate(&FixedEnv(None)).unwrap_err();
        assert_eq!(err.to_string(), "entropy source unavailable: rng offline");
    }
}
