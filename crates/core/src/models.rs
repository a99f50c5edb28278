use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub instrument: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// Build a bar from high/low/close only; open is set to the close and volume to zero.
    pub fn hlc(
        instrument: &str,
        timestamp: DateTime<Utc>,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            instrument: instrument.to_string(),
            timestamp,
            open: close,
            high,
            low,
            close,
            volume: Decimal::ZERO,
        }
    }

    /// High minus low.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }
}

// ---------------------------------------------------------------------------
// Indicator samples
// ---------------------------------------------------------------------------

/// A timestamped scalar, the unit passed between chained indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

impl DataPoint {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self { timestamp, value }
    }
}

impl Default for DataPoint {
    fn default() -> Self {
        Self {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            value: Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hlc_bar() {
        let ts = DateTime::<Utc>::UNIX_EPOCH;
        let bar = Bar::hlc("SPY", ts, dec!(105), dec!(95), dec!(100));
        assert_eq!(bar.open, dec!(100));
        assert_eq!(bar.volume, Decimal::ZERO);
        assert_eq!(bar.range(), dec!(10));
    }

    #[test]
    fn test_default_data_point_is_zero() {
        let point = DataPoint::default();
        assert_eq!(point.value, Decimal::ZERO);
        assert_eq!(point.timestamp, DateTime::<Utc>::UNIX_EPOCH);
    }
}
