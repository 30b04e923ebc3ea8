//! Smartlock core protocol.
//!
//! Sans-IO implementation of the device's challenge-response unlock protocol:
//!
//! - [`Challenge`]: one-time decimal token drawn from the [`Environment`]
//! - [`LockMachine`]: lock state, shared secret and live challenge; returns
//!   [`LockAction`]s instead of touching hardware or timers
//! - [`Indicator`]: narrow sink the driver renders [`Signal`]s on
//!
//! ## Architecture
//!
//! ```text
//! GET /challenge ──► LockMachine::issue_challenge ──► Challenge::generate(env)
//! POST /response ──► LockMachine::verify ──► [Indicate, ScheduleRelock, ...]
//!                                                │
//!                    driver executes ◄───────────┘
//!                    (Indicator::show, timer ──► LockMachine::relock)
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod challenge;
pub mod env;
pub mod error;
pub mod indicator;
pub mod lock;

pub use challenge::{Challenge, MAX_CHALLENGE_LEN};
pub use env::{EntropyError, Environment};
pub use error::LockError;
pub use indicator::{Indicator, IndicatorError, Rgb, Signal};
pub use lock::{
    ChallengePolicy, DEFAULT_RELOCK_DELAY, LockAction, LockConfig, LockMachine, LockState,
    LockStatus, MAX_RESPONSE_LEN, MAX_SECRET_LEN, RelockTicket, SharedSecret, Verification,
    VerifyOutcome,
};
