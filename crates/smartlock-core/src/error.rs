//! Lock machine error types.

use thiserror::Error;

use crate::env::EntropyError;

/// Errors from lock machine operations.
///
/// A rejected response is not an error: it is a normal
/// [`VerifyOutcome`](crate::VerifyOutcome). These variants cover inputs that
/// never reach the comparison and platform faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Response is longer than the accepted maximum.
    #[error("response too long: {len} bytes (max {max})")]
    ResponseTooLong {
        /// Submitted length.
        len: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// Response was empty.
    #[error("no response data received")]
    NoData,

    /// Challenge could not be generated.
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// Shared secret is unusable.
    #[error("invalid shared secret: {len} bytes (must be 1..={max})")]
    InvalidSecret {
        /// Provisioned length.
        len: usize,
        /// Longest secret that still fits a response.
        max: usize,
    },
}

impl LockError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Fatal errors mean the device cannot safely operate. Input errors only
    /// concern the current request.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Entropy(_) | Self::InvalidSecret { .. } => true,
            Self::ResponseTooLong { .. } | Self::NoData => false,
        }
    }
}
