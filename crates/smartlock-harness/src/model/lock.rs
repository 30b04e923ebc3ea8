//! Model lock.
//!
//! Tracks lock state, the live challenge and the re-lock deadline in
//! milliseconds of simulated time.

use smartlock_core::{LockState, MAX_RESPONSE_LEN, Signal};

use super::operation::OperationResult;

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Lock state.
    pub state: LockState,
    /// Last signal shown on the indicator.
    pub indicator: Signal,
    /// Whether a challenge is live.
    pub challenge_issued: bool,
    /// Whether a re-lock is pending.
    pub relock_pending: bool,
}

/// Model lock - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelLock {
    secret: Vec<u8>,
    relock_delay_ms: u64,
    state: LockState,
    indicator: Signal,
    challenge: Option<String>,
    relock_at: Option<u64>,
    now_ms: u64,
}

impl ModelLock {
    /// Create a model in its boot state.
    pub fn new(secret: &[u8], relock_delay_ms: u64) -> Self {
        Self {
            secret: secret.to_vec(),
            relock_delay_ms,
            state: LockState::Locked,
            indicator: Signal::Locked,
            challenge: None,
            relock_at: None,
            now_ms: 0,
        }
    }

    /// Record a challenge issued by the real system.
    pub fn issue(&mut self, challenge: &str) -> OperationResult {
        self.challenge = Some(challenge.to_string());
        OperationResult::Issued(challenge.to_string())
    }

    /// Verify a response.
    pub fn verify(&mut self, response: &[u8]) -> OperationResult {
        if response.len() > MAX_RESPONSE_LEN {
            return OperationResult::TooLong;
        }
        if response.is_empty() {
            return OperationResult::NoData;
        }

        let expected = self.challenge.as_ref().map(|c| {
            let mut bytes = c.as_bytes().to_vec();
            bytes.extend_from_slice(&self.secret);
            bytes
        });

        if expected.as_deref() == Some(response) {
            self.state = LockState::Unlocked;
            self.indicator = Signal::Unlocked;
            self.relock_at = None;
            OperationResult::Unlocked
        } else {
            self.indicator = Signal::Rejected;
            self.relock_at = Some(self.now_ms + self.relock_delay_ms);
            OperationResult::Rejected
        }
    }

    /// Advance simulated time, firing a due re-lock.
    pub fn advance(&mut self, millis: u64) -> OperationResult {
        self.now_ms += millis;
        if self.relock_at.is_some_and(|at| at <= self.now_ms) {
            self.relock_at = None;
            self.state = LockState::Locked;
            self.indicator = Signal::Locked;
        }
        OperationResult::Ok
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            state: self.state,
            indicator: self.indicator,
            challenge_issued: self.challenge.is_some(),
            relock_pending: self.relock_at.is_some(),
        }
    }
}
