//! Fuzz target for the [`LockMachine`] state machine
//!
//! Prevent unlock bypass via unexpected event orderings
//!
//! # Strategy
//!
//! - Event sequences: Arbitrary interleavings of challenge issuance, verify
//!   attempts and (possibly stale) re-lock timer firings
//! - Response shapes: exact, stale, random, empty and oversized responses
//! - Entropy faults: the scripted entropy stream may run dry mid-sequence
//!
//! # Invariants
//!
//! - `Unlocked` ONLY reachable via `verify(current challenge ++ secret)`
//! - Oversized and empty responses never change any state
//! - A stale re-lock ticket is a no-op
//! - Issuing a challenge never changes the lock state
//! - NEVER panic on any input

#![no_main]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use smartlock_core::{
    EntropyError, Environment, LockAction, LockConfig, LockError, LockMachine, LockState,
    RelockTicket, VerifyOutcome,
};

#[derive(Clone)]
struct FuzzEnv(Arc<Mutex<VecDeque<u32>>>);

impl Environment for FuzzEnv {
    async fn sleep(&self, _duration: Duration) {}

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let value = self
            .0
            .lock()
            .map_err(|_| EntropyError::new("poisoned"))?
            .pop_front()
            .ok_or_else(|| EntropyError::new("fuzz entropy exhausted"))?;
        for (dst, src) in buffer.iter_mut().zip(value.to_be_bytes().iter().cycle()) {
            *dst = *src;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Arbitrary)]
enum LockEvent {
    IssueChallenge,
    SubmitCorrect,
    SubmitBytes(Vec<u8>),
    SubmitOversized { extra: u8 },
    FireRelock { index: u8 },
}

/// Fuzz input with scripted entropy.
#[derive(Debug, Clone, Arbitrary)]
struct FuzzInput {
    /// Values handed out as challenges, in order.
    entropy: Vec<u32>,
    /// Event sequence to process.
    events: Vec<LockEvent>,
}

fuzz_target!(|input: FuzzInput| {
    let env = FuzzEnv(Arc::new(Mutex::new(input.entropy.into_iter().collect())));
    let config = LockConfig::default();
    let secret = b"DEFAULT_KEY";
    let mut machine = LockMachine::new(env, config);
    let mut tickets: Vec<RelockTicket> = Vec::new();

    for event in input.events {
        let before = machine.status();

        match event {
            LockEvent::IssueChallenge => {
                let _ = machine.issue_challenge();
                assert_eq!(machine.state(), before.state);
            },

            LockEvent::SubmitCorrect => {
                let mut response =
                    machine.current_challenge().map(|c| c.as_bytes().to_vec()).unwrap_or_default();
                response.extend_from_slice(secret);
                let had_challenge = before.challenge_issued;

                match machine.verify(&response) {
                    Ok(v) => {
                        assert_eq!(v.outcome == VerifyOutcome::Unlocked, had_challenge);
                        record_tickets(&v.actions, &mut tickets);
                    },
                    Err(e) => panic!("well-formed response refused: {e}"),
                }
            },

            LockEvent::SubmitBytes(bytes) => {
                let expected = machine.current_challenge().map(|c| {
                    let mut expected = c.as_bytes().to_vec();
                    expected.extend_from_slice(secret);
                    expected
                });

                match machine.verify(&bytes) {
                    Ok(v) => {
                        if v.outcome == VerifyOutcome::Unlocked {
                            assert_eq!(expected.as_deref(), Some(bytes.as_slice()));
                            assert_eq!(machine.state(), LockState::Unlocked);
                        }
                        record_tickets(&v.actions, &mut tickets);
                    },
                    Err(LockError::ResponseTooLong { .. } | LockError::NoData) => {
                        assert_eq!(machine.status(), before);
                    },
                    Err(e) => panic!("unexpected verify error: {e}"),
                }
            },

            LockEvent::SubmitOversized { extra } => {
                let response = vec![b'0'; smartlock_core::MAX_RESPONSE_LEN + 1 + extra as usize];
                assert!(matches!(
                    machine.verify(&response),
                    Err(LockError::ResponseTooLong { .. })
                ));
                assert_eq!(machine.status(), before);
            },

            LockEvent::FireRelock { index } => {
                if tickets.is_empty() {
                    continue;
                }
                let ticket = tickets[index as usize % tickets.len()];
                let newest = tickets.last().copied() == Some(ticket);
                let actions = machine.relock(ticket);

                if !before.relock_pending || !newest {
                    assert!(actions.is_empty(), "stale ticket must be a no-op");
                    assert_eq!(machine.status(), before);
                } else {
                    assert_eq!(machine.state(), LockState::Locked);
                    assert!(!machine.status().relock_pending);
                }
            },
        }
    }
});

fn record_tickets(actions: &[LockAction], tickets: &mut Vec<RelockTicket>) {
    for action in actions {
        if let LockAction::ScheduleRelock { ticket, .. } = action {
            tickets.push(*ticket);
        }
    }
}
