//! Deterministic test harness for the smartlock protocol.
//!
//! - [`SimEnv`]: seeded, scripted or exhausted entropy plus tokio's (pausable)
//!   clock, so every challenge and every re-lock is reproducible
//! - [`RecordingIndicator`]: captures every signal the driver renders
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation for model-based
//! testing. Operations are applied to both the model and real implementation,
//! and their observable states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod recording;
pub mod sim_env;

pub use model::{ModelLock, ObservableState, Operation, OperationResult};
pub use recording::RecordingIndicator;
pub use sim_env::SimEnv;
