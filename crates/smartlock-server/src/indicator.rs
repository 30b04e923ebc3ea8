//! Indicator sinks available to the server binary.
//!
//! The LED itself is platform plumbing. On a host the color is rendered as a
//! structured log event instead.

use smartlock_core::{Indicator, IndicatorError, Rgb, Signal};

/// Which sink the server drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum IndicatorKind {
    /// Render colors as `tracing` events.
    #[default]
    Tracing,
    /// No indicator hardware; every update fails and is ignored.
    Disconnected,
}

impl IndicatorKind {
    /// Build the sink.
    pub fn build(self) -> Box<dyn Indicator> {
        match self {
            Self::Tracing => Box::new(TracingIndicator::default()),
            Self::Disconnected => Box::new(DisconnectedIndicator),
        }
    }
}

/// Indicator that logs every color change.
#[derive(Debug, Default)]
pub struct TracingIndicator {
    current: Option<Rgb>,
}

impl TracingIndicator {
    /// Color currently displayed, if any update happened.
    pub fn current(&self) -> Option<Rgb> {
        self.current
    }
}

impl Indicator for TracingIndicator {
    fn show(&mut self, signal: Signal) -> Result<(), IndicatorError> {
        let color = signal.color();
        tracing::info!(?signal, r = color.r, g = color.g, b = color.b, "indicator");
        self.current = Some(color);
        Ok(())
    }
}

/// Indicator whose hardware was never initialized.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisconnectedIndicator;

impl Indicator for DisconnectedIndicator {
    fn show(&mut self, _signal: Signal) -> Result<(), IndicatorError> {
        Err(IndicatorError::Disconnected)
    }
}
