use crate::Indicator;
use chrono::{DateTime, Utc};
use premier_core::DataPoint;
use rust_decimal::Decimal;

/// Exponential Moving Average (EMA).
///
/// Seeded with the simple average of the first `period` samples. Sample
/// timestamps are carried through to [`Indicator::current`] but never enter
/// the arithmetic, so the result depends only on the order of updates.
#[derive(Debug, Clone)]
pub struct Ema {
    len: usize,
    multiplier: Decimal,
    current: Option<Decimal>,
    last_timestamp: DateTime<Utc>,
    count: usize,
    /// Accumulates values for the initial SMA seed.
    seed_sum: Decimal,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        let multiplier = Decimal::TWO / (Decimal::from(period) + Decimal::ONE);
        Self {
            len: period,
            multiplier,
            current: None,
            last_timestamp: DateTime::<Utc>::UNIX_EPOCH,
            count: 0,
            seed_sum: Decimal::ZERO,
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        self.current
    }
}

impl Indicator for Ema {
    type Input = DataPoint;

    fn next(&mut self, input: &DataPoint) -> Option<Decimal> {
        let value = input.value;
        self.count += 1;
        self.last_timestamp = input.timestamp;

        match self.current {
            None => {
                // Accumulate for SMA seed
                self.seed_sum = self.seed_sum.saturating_add(value);
                if self.count >= self.len {
                    let sma = self.seed_sum / Decimal::from(self.len);
                    self.current = Some(sma);
                }
            }
            Some(prev) => {
                let ema = value
                    .saturating_sub(prev)
                    .saturating_mul(self.multiplier)
                    .saturating_add(prev);
                self.current = Some(ema);
            }
        }

        self.current
    }

    fn current(&self) -> DataPoint {
        DataPoint::new(self.last_timestamp, self.current.unwrap_or(Decimal::ZERO))
    }

    fn samples(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.current = None;
        self.last_timestamp = DateTime::<Utc>::UNIX_EPOCH;
        self.count = 0;
        self.seed_sum = Decimal::ZERO;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn point(value: Decimal) -> DataPoint {
        DataPoint::new(DateTime::<Utc>::UNIX_EPOCH, value)
    }

    #[test]
    fn test_ema_seed() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.next(&point(dec!(2))), None);
        assert_eq!(ema.next(&point(dec!(4))), None);
        // Third value → SMA seed = (2+4+6)/3 = 4
        let result = ema.next(&point(dec!(6)));
        assert_eq!(result, Some(dec!(4)));
        assert!(ema.is_ready());
    }

    #[test]
    fn test_ema_after_seed() {
        let mut ema = Ema::new(3);
        ema.next(&point(dec!(2)));
        ema.next(&point(dec!(4)));
        ema.next(&point(dec!(6))); // seed = 4
        // EMA = (8 - 4) * 0.5 + 4 = 6
        let result = ema.next(&point(dec!(8)));
        assert_eq!(result, Some(dec!(6)));
    }

    #[test]
    fn test_ema_ignores_timestamp_values() {
        let base = DateTime::<Utc>::UNIX_EPOCH;
        let mut early = Ema::new(2);
        let mut late = Ema::new(2);
        for (i, v) in [dec!(1), dec!(3), dec!(7)].into_iter().enumerate() {
            early.next(&DataPoint::new(base + Duration::seconds(i as i64), v));
            late.next(&DataPoint::new(base + Duration::days(1000 + i as i64 * 7), v));
        }
        assert_eq!(early.value(), late.value());
        assert_eq!(late.current().timestamp, base + Duration::days(1014));
    }

    #[test]
    fn test_ema_current_is_zero_before_seed() {
        let mut ema = Ema::new(5);
        ema.next(&point(dec!(3)));
        assert!(!ema.is_ready());
        assert_eq!(ema.current().value, Decimal::ZERO);
        assert_eq!(ema.samples(), 1);
    }

    #[test]
    fn test_ema_extreme_values_saturate() {
        let mut ema = Ema::new(2);
        ema.next(&point(Decimal::MAX));
        ema.next(&point(Decimal::MAX));
        assert!(ema.is_ready());
        ema.next(&point(Decimal::MIN));
        assert!(ema.value().is_some());
    }

    #[test]
    fn test_ema_reset() {
        let mut ema = Ema::new(2);
        ema.next(&point(dec!(1)));
        ema.next(&point(dec!(2)));
        assert!(ema.is_ready());
        ema.reset();
        assert!(!ema.is_ready());
        assert_eq!(ema.samples(), 0);
        assert_eq!(ema.next(&point(dec!(4))), None);
    }
}
