//! Indicator that records every signal it is asked to show.

use std::sync::{Arc, Mutex, PoisonError};

use smartlock_core::{Indicator, IndicatorError, Rgb, Signal};

/// Recording indicator.
///
/// Clones share one log, so a test keeps a clone while the driver owns the
/// other. A disconnected recorder logs the attempt and then fails, which
/// exercises the "hardware not initialized" path.
#[derive(Clone, Debug, Default)]
pub struct RecordingIndicator {
    signals: Arc<Mutex<Vec<Signal>>>,
    disconnected: bool,
}

impl RecordingIndicator {
    /// Working indicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicator whose every update fails.
    pub fn disconnected() -> Self {
        Self { disconnected: true, ..Self::default() }
    }

    /// Every signal shown so far, oldest first.
    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Most recent signal.
    pub fn last(&self) -> Option<Signal> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner).last().copied()
    }

    /// Color currently displayed.
    pub fn last_color(&self) -> Option<Rgb> {
        self.last().map(Signal::color)
    }
}

impl Indicator for RecordingIndicator {
    fn show(&mut self, signal: Signal) -> Result<(), IndicatorError> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner).push(signal);
        if self.disconnected {
            return Err(IndicatorError::Disconnected);
        }
        Ok(())
    }
}
