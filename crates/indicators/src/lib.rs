pub mod ema;
pub mod functional;
pub mod pso;
pub mod sma;
pub mod stochastic;

use chrono::{DateTime, Utc};
use premier_core::{Bar, DataPoint};
use rust_decimal::Decimal;

pub use functional::FunctionalIndicator;
pub use pso::PremierStochasticOscillator;

/// Anything that can be fed to an indicator carries the time it was observed.
pub trait Input {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Input for DataPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Input for Bar {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Trait for streaming (incremental) indicators.
/// Feed one input at a time; the indicator maintains internal state.
pub trait Indicator: Send + Sync {
    type Input: Input;

    /// Process the next input and return the indicator output (if ready).
    fn next(&mut self, input: &Self::Input) -> Option<Decimal>;

    /// The most recent value, stamped with the input that produced it.
    ///
    /// Available before the indicator is ready, but only meaningful once
    /// [`Indicator::is_ready`] returns true.
    fn current(&self) -> DataPoint;

    /// Number of inputs processed since construction or the last reset.
    fn samples(&self) -> usize;

    /// Reset the indicator to its initial state.
    fn reset(&mut self);

    /// The minimum number of data points needed before the indicator produces output.
    fn period(&self) -> usize;

    /// Whether the indicator has enough data to produce output.
    fn is_ready(&self) -> bool;
}
