//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! lock machine behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelLock     RealWorld       Compare
//!      (reference)   (LockMachine)   Results + ObservableState
//! ```

use std::time::Duration;

use proptest::prelude::*;
use smartlock_core::{
    LockAction, LockConfig, LockError, LockMachine, RelockTicket, SharedSecret, Signal,
    VerifyOutcome,
};
use smartlock_harness::{ModelLock, ObservableState, Operation, OperationResult, SimEnv};

const SECRET: &[u8] = b"DEFAULT_KEY";
const RELOCK_DELAY_MS: u64 = 4000;

/// Real system wrapper that mirrors ModelLock's interface.
///
/// Executes the machine's actions itself with a millisecond clock instead of
/// tokio timers.
struct RealWorld {
    machine: LockMachine<SimEnv>,
    indicator: Signal,
    pending: Option<(RelockTicket, u64)>,
    now_ms: u64,
}

impl RealWorld {
    fn new(seed: u64) -> Self {
        let config = LockConfig {
            secret: SharedSecret::new(SECRET).expect("valid secret"),
            relock_delay: Duration::from_millis(RELOCK_DELAY_MS),
            ..LockConfig::default()
        };
        let machine = LockMachine::new(SimEnv::with_seed(seed), config);
        let mut world = Self { indicator: Signal::Locked, pending: None, now_ms: 0, machine };
        let boot = world.machine.boot();
        world.execute(boot);
        world
    }

    fn execute(&mut self, actions: Vec<LockAction>) {
        for action in actions {
            match action {
                LockAction::Indicate(signal) => self.indicator = signal,
                LockAction::ScheduleRelock { ticket, delay } => {
                    let delay_ms = u64::try_from(delay.as_millis()).expect("delay fits u64");
                    self.pending = Some((ticket, self.now_ms + delay_ms));
                },
                LockAction::CancelRelock => self.pending = None,
            }
        }
    }

    fn issue(&mut self) -> OperationResult {
        let challenge = self.machine.issue_challenge().expect("seeded entropy never fails");
        OperationResult::Issued(challenge.to_string())
    }

    fn verify(&mut self, response: &[u8]) -> OperationResult {
        match self.machine.verify(response) {
            Ok(verification) => {
                let outcome = verification.outcome;
                self.execute(verification.actions);
                match outcome {
                    VerifyOutcome::Unlocked => OperationResult::Unlocked,
                    VerifyOutcome::Rejected => OperationResult::Rejected,
                }
            },
            Err(LockError::ResponseTooLong { .. }) => OperationResult::TooLong,
            Err(LockError::NoData) => OperationResult::NoData,
            Err(e) => panic!("unexpected lock error: {e}"),
        }
    }

    fn advance(&mut self, millis: u64) -> OperationResult {
        self.now_ms += millis;
        if let Some((ticket, at)) = self.pending {
            if at <= self.now_ms {
                self.pending = None;
                let actions = self.machine.relock(ticket);
                self.execute(actions);
            }
        }
        OperationResult::Ok
    }

    fn observable_state(&self) -> ObservableState {
        let status = self.machine.status();
        ObservableState {
            state: status.state,
            indicator: self.indicator,
            challenge_issued: status.challenge_issued,
            relock_pending: status.relock_pending,
        }
    }
}

/// Challenges the simulated client has received.
#[derive(Default)]
struct ClientView {
    current: Option<String>,
    previous: Option<String>,
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        // Weight towards more interesting operations
        3 => Just(Operation::IssueChallenge),
        3 => Just(Operation::SubmitCorrect),
        1 => Just(Operation::SubmitStale),
        3 => (any::<u8>(), any::<u8>())
            .prop_map(|(seed, len)| Operation::SubmitGarbage { seed, len }),
        1 => any::<u8>().prop_map(|extra| Operation::SubmitOversized { extra }),
        1 => Just(Operation::SubmitEmpty),
        3 => (0u16..6000).prop_map(|millis| Operation::AdvanceTime { millis }),
    ]
}

/// Apply one operation to both worlds, returning both results.
fn apply(
    op: &Operation,
    model: &mut ModelLock,
    real: &mut RealWorld,
    client: &mut ClientView,
) -> (OperationResult, OperationResult) {
    match op {
        Operation::IssueChallenge => {
            let real_result = real.issue();
            let OperationResult::Issued(challenge) = &real_result else {
                unreachable!("issue always returns Issued");
            };
            client.previous = client.current.replace(challenge.clone());
            (model.issue(challenge), real_result)
        },
        Operation::AdvanceTime { millis } => {
            (model.advance(u64::from(*millis)), real.advance(u64::from(*millis)))
        },
        submit => {
            let response = submit
                .response(SECRET, client.current.as_deref(), client.previous.as_deref())
                .expect("submit operations produce a response");
            (model.verify(&response), real.verify(&response))
        },
    }
}

proptest! {
    /// Verify that operation results and observable state match between the
    /// model and the real machine after every step.
    #[test]
    fn prop_model_matches_real(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        let mut model = ModelLock::new(SECRET, RELOCK_DELAY_MS);
        let mut real = RealWorld::new(seed);
        let mut client = ClientView::default();

        prop_assert_eq!(model.observable_state(), real.observable_state());

        for (i, op) in ops.iter().enumerate() {
            let (model_result, real_result) = apply(op, &mut model, &mut real, &mut client);

            prop_assert_eq!(
                &model_result,
                &real_result,
                "Divergence at operation {}: {:?}",
                i, op
            );
            prop_assert_eq!(
                model.observable_state(),
                real.observable_state(),
                "State divergence after operation {}: {:?}",
                i, op
            );
        }
    }

    /// After any sequence, letting the full delay pass leaves the lock in a
    /// settled state: no pending re-lock, indicator matching the state.
    #[test]
    fn prop_settles_after_delay(
        seed in any::<u64>(),
        ops in prop::collection::vec(operation_strategy(), 0..60)
    ) {
        let mut model = ModelLock::new(SECRET, RELOCK_DELAY_MS);
        let mut real = RealWorld::new(seed);
        let mut client = ClientView::default();

        for op in &ops {
            apply(op, &mut model, &mut real, &mut client);
        }
        real.advance(RELOCK_DELAY_MS);

        let state = real.observable_state();
        prop_assert!(!state.relock_pending);
        let expected = match state.state {
            smartlock_core::LockState::Locked => Signal::Locked,
            smartlock_core::LockState::Unlocked => Signal::Unlocked,
        };
        prop_assert_eq!(state.indicator, expected);
    }
}

#[cfg(test)]
mod smoke_tests {
    use super::*;

    /// Basic walk through the protocol.
    #[test]
    fn model_basic_operations() {
        let mut model = ModelLock::new(SECRET, RELOCK_DELAY_MS);
        let mut real = RealWorld::new(1);
        let mut client = ClientView::default();

        let steps = [
            Operation::SubmitCorrect,
            Operation::IssueChallenge,
            Operation::SubmitCorrect,
            Operation::SubmitGarbage { seed: 1, len: 5 },
            Operation::AdvanceTime { millis: 4000 },
            Operation::IssueChallenge,
            Operation::SubmitStale,
        ];
        let expected = [
            OperationResult::Rejected,
            OperationResult::Unlocked,
            OperationResult::Rejected,
            OperationResult::Ok,
            OperationResult::Rejected,
        ];

        let results: Vec<OperationResult> = steps
            .iter()
            .map(|op| apply(op, &mut model, &mut real, &mut client).1)
            .filter(|r| !matches!(r, OperationResult::Issued(_)))
            .collect();

        assert_eq!(results, expected);
        assert_eq!(model.observable_state(), real.observable_state());
    }
}
