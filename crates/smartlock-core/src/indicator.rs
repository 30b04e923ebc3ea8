//! Indicator contract.
//!
//! The lock machine never touches an LED directly. It emits
//! [`LockAction::Indicate`](crate::LockAction::Indicate) and the driver hands
//! the signal to whatever [`Indicator`] the device has.

use serde::Serialize;
use thiserror::Error;

/// Event or state rendered on the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Lock is engaged.
    Locked,
    /// A response was accepted.
    Unlocked,
    /// A response was rejected; shown until the re-lock fires.
    Rejected,
}

/// Color triple driven onto the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    /// Red intensity.
    pub r: u8,
    /// Green intensity.
    pub g: u8,
    /// Blue intensity.
    pub b: u8,
}

impl Rgb {
    /// Build a color from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Signal {
    /// Fixed color for this signal.
    pub const fn color(self) -> Rgb {
        match self {
            Self::Locked => Rgb::new(255, 0, 0),
            Self::Unlocked => Rgb::new(0, 255, 0),
            Self::Rejected => Rgb::new(0, 0, 255),
        }
    }
}

/// Errors from driving the physical indicator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// Hardware was never initialized.
    #[error("indicator not initialized")]
    Disconnected,

    /// The device rejected the update.
    #[error("indicator device error: {0}")]
    Device(String),
}

/// Sink that renders signals as a visible color.
///
/// Failures are reported to the caller, which logs and ignores them. A broken
/// LED must never block a lock transition.
pub trait Indicator: Send + 'static {
    /// Render `signal`.
    fn show(&mut self, signal: Signal) -> Result<(), IndicatorError>;
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn show(&mut self, signal: Signal) -> Result<(), IndicatorError> {
        (**self).show(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_colors() {
        assert_eq!(Signal::Locked.color(), Rgb::new(255, 0, 0));
        assert_eq!(Signal::Unlocked.color(), Rgb::new(0, 255, 0));
        assert_eq!(Signal::Rejected.color(), Rgb::new(0, 0, 255));
    }

    #[test]
    fn boxed_indicator_forwards() {
        struct Last(Option<Signal>);

        impl Indicator for Last {
            fn show(&mut self, signal: Signal) -> Result<(), IndicatorError> {
                self.0 = Some(signal);
                Ok(())
            }
        }

        let mut boxed: Box<Last> = Box::new(Last(None));
        boxed.show(Signal::Rejected).unwrap();
        assert_eq!(boxed.0, Some(Signal::Rejected));
    }
}
