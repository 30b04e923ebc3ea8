//! Reference model for model-based testing.
//!
//! The model is a simplified implementation that captures the rules of the
//! unlock protocol with plain integers and strings. It serves as the oracle
//! against which the real lock machine is verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - Observable behavior only: no tickets, no actions, just state and colors
//! - Deterministic: Same inputs produce same outputs

mod lock;
pub mod operation;

pub use lock::{ModelLock, ObservableState};
pub use operation::{Operation, OperationResult};
