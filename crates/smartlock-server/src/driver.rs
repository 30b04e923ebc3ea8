//! Lock driver.
//!
//! Serializes every access to the [`LockMachine`] behind one async mutex and
//! executes the actions it returns: indicator updates run inline, re-locks
//! run as deferred tokio tasks.
//!
//! ## Re-lock lifecycle
//!
//! ```text
//! verify (mismatch) ──► Indicate(Rejected) + ScheduleRelock { ticket, delay }
//!                                                 │
//!                          spawn: env.sleep(delay) ──► machine.relock(ticket)
//!
//! later verify ──► CancelRelock / newer ScheduleRelock ──► abort old task
//! ```
//!
//! The ticket check inside the machine covers the window where an aborted
//! task has already woken up and is waiting for the lock.

use std::sync::Arc;

use smartlock_core::{
    Challenge, Environment, Indicator, LockAction, LockConfig, LockError, LockMachine, LockStatus,
    Signal, VerifyOutcome,
};
use tokio::{sync::Mutex, task::JoinHandle};

/// State guarded by the driver mutex.
struct DriverState<E: Environment, I: Indicator> {
    /// The lock state machine.
    machine: LockMachine<E>,
    /// Indicator sink.
    indicator: I,
    /// Timer task for the scheduled re-lock.
    relock_task: Option<JoinHandle<()>>,
}

impl<E: Environment, I: Indicator> DriverState<E, I> {
    fn show(&mut self, signal: Signal) {
        if let Err(e) = self.indicator.show(signal) {
            tracing::warn!(?signal, error = %e, "indicator update failed");
        }
    }

    fn abort_relock(&mut self) {
        if let Some(task) = self.relock_task.take() {
            task.abort();
        }
    }
}

/// Shared handle to the single lock instance.
///
/// Cloning is cheap; all clones drive the same machine.
pub struct LockDriver<E: Environment, I: Indicator> {
    inner: Arc<Mutex<DriverState<E, I>>>,
    env: E,
}

impl<E: Environment, I: Indicator> Clone for LockDriver<E, I> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner), env: self.env.clone() }
    }
}

impl<E: Environment, I: Indicator> LockDriver<E, I> {
    /// Build the machine and run its boot actions (locked color).
    pub async fn boot(env: E, indicator: I, config: LockConfig) -> Self {
        let machine = LockMachine::new(env.clone(), config);
        let actions = machine.boot();
        let driver = Self {
            inner: Arc::new(Mutex::new(DriverState { machine, indicator, relock_task: None })),
            env,
        };

        {
            let mut state = driver.inner.lock().await;
            driver.execute(&mut state, actions);
        }

        tracing::info!("lock engaged");
        driver
    }

    /// Issue a new challenge, replacing the live one.
    pub async fn issue_challenge(&self) -> Result<Challenge, LockError> {
        let mut state = self.inner.lock().await;
        state.machine.issue_challenge().inspect_err(|e| {
            tracing::error!(error = %e, "refusing to issue challenge");
        })
    }

    /// Verify a response and execute the resulting side effects.
    ///
    /// Returns as soon as the indicator shows the outcome; a re-lock after a
    /// rejection happens later on its own task.
    pub async fn verify(&self, response: &[u8]) -> Result<VerifyOutcome, LockError> {
        let mut state = self.inner.lock().await;
        let verification = state.machine.verify(response)?;
        self.execute(&mut state, verification.actions);
        Ok(verification.outcome)
    }

    /// Snapshot of the machine.
    pub async fn status(&self) -> LockStatus {
        self.inner.lock().await.machine.status()
    }

    fn execute(&self, state: &mut DriverState<E, I>, actions: Vec<LockAction>) {
        for action in actions {
            match action {
                LockAction::Indicate(signal) => state.show(signal),

                LockAction::ScheduleRelock { ticket, delay } => {
                    state.abort_relock();

                    let driver = self.clone();
                    state.relock_task = Some(tokio::spawn(async move {
                        driver.env.sleep(delay).await;

                        let mut state = driver.inner.lock().await;
                        let actions = state.machine.relock(ticket);
                        if !actions.is_empty() {
                            // Our own handle; dropping it detaches.
                            state.relock_task = None;
                        }
                        driver.execute(&mut state, actions);
                    }));
                    tracing::debug!(ticket = ticket.get(), ?delay, "re-lock scheduled");
                },

                LockAction::CancelRelock => {
                    state.abort_relock();
                    tracing::debug!("pending re-lock cancelled");
                },
            }
        }
    }
}
