//! Lock State Machine
//!
//! Owns the lock state, the shared secret and the single live challenge.
//!
//! ## Responsibilities
//!
//! - Challenge issuance: one live challenge, overwritten on every fetch
//! - Verification: compare a response against `challenge ++ secret`
//! - Transitions: `Locked -> Unlocked` on a match, back to `Locked` after a
//!   delay on any mismatch
//!
//! ## Design
//!
//! - Action-based: methods return [`LockAction`]s, the driver performs the
//!   indicator update and runs the re-lock timer
//! - Tickets: each scheduled re-lock carries a [`RelockTicket`]. Any later
//!   verify supersedes it, so a late timer can never undo a newer unlock
//!
//! The comparison is plain byte equality over the concatenation, exactly as
//! the device protocol defines it. It is not a MAC and not constant time.

use std::{fmt, time::Duration};

use serde::Serialize;

use crate::{
    challenge::{Challenge, MAX_CHALLENGE_LEN},
    env::Environment,
    error::LockError,
    indicator::Signal,
};

/// Longest response accepted for comparison, in bytes.
pub const MAX_RESPONSE_LEN: usize = 63;

/// Longest shared secret that still fits in a response after any challenge.
pub const MAX_SECRET_LEN: usize = MAX_RESPONSE_LEN - MAX_CHALLENGE_LEN;

/// Delay between a rejected response and the automatic re-lock.
pub const DEFAULT_RELOCK_DELAY: Duration = Duration::from_secs(4);

/// Secret provisioned on the device and known to legitimate clients.
///
/// Never transmitted and never printed; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Validate and wrap a secret.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, LockError> {
        let bytes = bytes.into();
        if bytes.is_empty() || bytes.len() > MAX_SECRET_LEN {
            return Err(LockError::InvalidSecret { len: bytes.len(), max: MAX_SECRET_LEN });
        }
        Ok(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Default for SharedSecret {
    fn default() -> Self {
        Self(b"DEFAULT_KEY".to_vec())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// What happens to the live challenge after a verify attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChallengePolicy {
    /// The challenge stays valid until the next issuance, so a client may
    /// retry against it. This is the device's historical behavior.
    #[default]
    Reusable,

    /// Every verify attempt consumes the challenge, successful or not.
    SingleUse,
}

/// Lock machine configuration.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Shared secret.
    pub secret: SharedSecret,
    /// Delay before re-locking after a rejected response.
    pub relock_delay: Duration,
    /// Challenge lifetime policy.
    pub challenge_policy: ChallengePolicy,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            secret: SharedSecret::default(),
            relock_delay: DEFAULT_RELOCK_DELAY,
            challenge_policy: ChallengePolicy::default(),
        }
    }
}

/// Lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    /// Engaged.
    Locked,
    /// Released by a valid response.
    Unlocked,
}

/// Result of a verify attempt that reached the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Response matched; the lock is open.
    Unlocked,
    /// Response did not match; a re-lock is scheduled.
    Rejected,
}

/// Identifies one scheduled re-lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelockTicket(u64);

impl RelockTicket {
    /// Raw ticket number.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Side effects requested by the lock machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAction {
    /// Render a signal on the indicator.
    Indicate(Signal),

    /// Call [`LockMachine::relock`] with `ticket` after `delay`.
    ///
    /// Replaces any previously scheduled re-lock.
    ScheduleRelock {
        /// Ticket to hand back when the timer fires.
        ticket: RelockTicket,
        /// How long to wait.
        delay: Duration,
    },

    /// Drop any scheduled re-lock.
    CancelRelock,
}

/// Outcome plus the actions the driver must execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Verify result.
    pub outcome: VerifyOutcome,
    /// Side effects, in order.
    pub actions: Vec<LockAction>,
}

/// Read-only snapshot of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    /// Current lock state.
    pub state: LockState,
    /// Whether a challenge is live.
    pub challenge_issued: bool,
    /// Whether a re-lock is scheduled.
    pub relock_pending: bool,
}

/// Challenge-response lock state machine.
///
/// Pure state machine: returns actions, the caller handles timers and the
/// indicator. Exactly one instance exists per device.
///
/// # Type Parameters
///
/// - `E`: Environment implementation for entropy
pub struct LockMachine<E: Environment> {
    /// Environment for entropy.
    env: E,
    /// Secret, delay and challenge policy.
    config: LockConfig,
    /// Current lock state.
    state: LockState,
    /// The single live challenge, if one was issued.
    challenge: Option<Challenge>,
    /// Ticket of the re-lock currently scheduled.
    pending_relock: Option<RelockTicket>,
    /// Source of ticket numbers.
    next_ticket: u64,
}

impl<E: Environment> LockMachine<E> {
    /// Create a machine in its boot state: locked, no challenge.
    pub fn new(env: E, config: LockConfig) -> Self {
        Self {
            env,
            config,
            state: LockState::Locked,
            challenge: None,
            pending_relock: None,
            next_ticket: 0,
        }
    }

    /// Actions to run once at boot.
    pub fn boot(&self) -> Vec<LockAction> {
        vec![LockAction::Indicate(Signal::Locked)]
    }

    /// Current lock state.
    pub fn state(&self) -> LockState {
        self.state
    }

    /// The live challenge, if any.
    pub fn current_challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// Snapshot for observation.
    pub fn status(&self) -> LockStatus {
        LockStatus {
            state: self.state,
            challenge_issued: self.challenge.is_some(),
            relock_pending: self.pending_relock.is_some(),
        }
    }

    /// Issue a fresh challenge, replacing the live one.
    ///
    /// Does not change the lock state. On entropy failure the previous
    /// challenge is left untouched and nothing predictable is issued.
    pub fn issue_challenge(&mut self) -> Result<Challenge, LockError> {
        let challenge = Challenge::generate(&self.env)?;
        tracing::debug!(challenge = %challenge, "challenge issued");
        self.challenge = Some(challenge.clone());
        Ok(challenge)
    }

    /// Verify a client response.
    ///
    /// Oversized and empty responses are refused before any comparison and
    /// leave the machine untouched.
    pub fn verify(&mut self, response: &[u8]) -> Result<Verification, LockError> {
        if response.len() > MAX_RESPONSE_LEN {
            return Err(LockError::ResponseTooLong { len: response.len(), max: MAX_RESPONSE_LEN });
        }
        if response.is_empty() {
            return Err(LockError::NoData);
        }

        let matched = self.challenge.as_ref().is_some_and(|challenge| {
            matches_expected(response, challenge.as_bytes(), self.config.secret.as_bytes())
        });

        if self.config.challenge_policy == ChallengePolicy::SingleUse {
            self.challenge = None;
        }

        if matched {
            Ok(self.unlock())
        } else {
            Ok(self.reject())
        }
    }

    /// Complete a scheduled re-lock.
    ///
    /// Stale tickets (superseded by a later verify) are ignored.
    pub fn relock(&mut self, ticket: RelockTicket) -> Vec<LockAction> {
        if self.pending_relock != Some(ticket) {
            tracing::debug!(ticket = ticket.get(), "ignoring stale re-lock");
            return Vec::new();
        }

        self.pending_relock = None;
        self.state = LockState::Locked;
        tracing::info!("re-locked");
        vec![LockAction::Indicate(Signal::Locked)]
    }

    fn unlock(&mut self) -> Verification {
        self.state = LockState::Unlocked;
        tracing::info!("unlock successful");

        let mut actions = Vec::with_capacity(2);
        if self.pending_relock.take().is_some() {
            actions.push(LockAction::CancelRelock);
        }
        actions.push(LockAction::Indicate(Signal::Unlocked));

        Verification { outcome: VerifyOutcome::Unlocked, actions }
    }

    fn reject(&mut self) -> Verification {
        let ticket = RelockTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.pending_relock = Some(ticket);
        tracing::warn!(ticket = ticket.get(), "invalid token");

        Verification {
            outcome: VerifyOutcome::Rejected,
            actions: vec![
                LockAction::Indicate(Signal::Rejected),
                LockAction::ScheduleRelock { ticket, delay: self.config.relock_delay },
            ],
        }
    }
}

/// `response == challenge ++ secret`, without building the concatenation.
fn matches_expected(response: &[u8], challenge: &[u8], secret: &[u8]) -> bool {
    if response.len() != challenge.len() + secret.len() {
        return false;
    }
    let (head, tail) = response.split_at(challenge.len());
    head == challenge && tail == secret
}
