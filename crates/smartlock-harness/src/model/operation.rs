//! Operations for model-based testing.
//!
//! Operations represent everything a client (or the clock) can do to the
//! lock. They are generated randomly and applied to both the model and the
//! real implementation.

use arbitrary::Arbitrary;

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Fetch a new challenge.
    IssueChallenge,

    /// Submit `current challenge ++ secret`.
    ///
    /// With no challenge outstanding this submits the bare secret.
    SubmitCorrect,

    /// Submit `previous challenge ++ secret`, i.e. replay a superseded
    /// challenge.
    SubmitStale,

    /// Submit arbitrary bytes that fit the length bound.
    SubmitGarbage {
        /// Content seed.
        seed: u8,
        /// Length hint, mapped into `1..=63`.
        len: u8,
    },

    /// Submit a response longer than the bound.
    SubmitOversized {
        /// Bytes past the bound, plus one.
        extra: u8,
    },

    /// Submit an empty body.
    SubmitEmpty,

    /// Advance simulation time.
    ///
    /// Fires the re-lock in both model and real system once its delay has
    /// elapsed.
    AdvanceTime {
        /// Milliseconds to advance.
        millis: u16,
    },
}

impl Operation {
    /// Bytes to submit for a submit operation, `None` for the others.
    ///
    /// `current` and `previous` are the challenges the client has seen.
    pub fn response(
        &self,
        secret: &[u8],
        current: Option<&str>,
        previous: Option<&str>,
    ) -> Option<Vec<u8>> {
        let with_secret = |challenge: Option<&str>| {
            let mut bytes = challenge.unwrap_or_default().as_bytes().to_vec();
            bytes.extend_from_slice(secret);
            bytes
        };

        match self {
            Self::SubmitCorrect => Some(with_secret(current)),
            Self::SubmitStale => Some(with_secret(previous)),
            Self::SubmitGarbage { seed, len } => {
                let len = usize::from(*len % smartlock_core::MAX_RESPONSE_LEN as u8) + 1;
                Some((0..len).map(|i| seed.wrapping_add(i as u8)).collect())
            },
            Self::SubmitOversized { extra } => {
                let mut bytes = with_secret(current);
                bytes.resize(smartlock_core::MAX_RESPONSE_LEN + usize::from(*extra) + 1, b'x');
                Some(bytes)
            },
            Self::SubmitEmpty => Some(Vec::new()),
            Self::IssueChallenge | Self::AdvanceTime { .. } => None,
        }
    }
}

/// Result of applying an operation.
///
/// Used to compare model and real system behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Challenge issued (text).
    Issued(String),

    /// Response accepted.
    Unlocked,

    /// Response rejected.
    Rejected,

    /// Response refused as too long.
    TooLong,

    /// Response refused as empty.
    NoData,

    /// Time advanced.
    Ok,
}
