use crate::Indicator;
use premier_core::DataPoint;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Simple Moving Average (SMA).
#[derive(Debug, Clone)]
pub struct Sma {
    len: usize,
    buffer: VecDeque<Decimal>,
    sum: Decimal,
    current: DataPoint,
    count: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            len: period,
            buffer: VecDeque::with_capacity(period),
            sum: Decimal::ZERO,
            current: DataPoint::default(),
            count: 0,
        }
    }

    /// Get the current SMA value without feeding new data.
    pub fn value(&self) -> Option<Decimal> {
        if self.buffer.len() == self.len {
            Some(self.sum / Decimal::from(self.len))
        } else {
            None
        }
    }
}

impl Indicator for Sma {
    type Input = DataPoint;

    fn next(&mut self, input: &DataPoint) -> Option<Decimal> {
        self.count += 1;
        self.sum = self.sum.saturating_add(input.value);
        self.buffer.push_back(input.value);

        if self.buffer.len() > self.len {
            if let Some(removed) = self.buffer.pop_front() {
                self.sum = self.sum.saturating_sub(removed);
            }
        }

        let value = self.value();
        self.current = DataPoint::new(input.timestamp, value.unwrap_or(Decimal::ZERO));
        value
    }

    fn current(&self) -> DataPoint {
        self.current
    }

    fn samples(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.sum = Decimal::ZERO;
        self.current = DataPoint::default();
        self.count = 0;
    }

    fn period(&self) -> usize {
        self.len
    }

    fn is_ready(&self) -> bool {
        self.buffer.len() == self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;

    fn point(value: Decimal) -> DataPoint {
        DataPoint::new(DateTime::<Utc>::UNIX_EPOCH, value)
    }

    #[test]
    fn test_sma_basic() {
        let mut sma = Sma::new(3);
        assert_eq!(sma.next(&point(dec!(1))), None);
        assert_eq!(sma.next(&point(dec!(2))), None);
        assert_eq!(sma.next(&point(dec!(3))), Some(dec!(2)));
        assert_eq!(sma.next(&point(dec!(4))), Some(dec!(3)));
        assert_eq!(sma.next(&point(dec!(5))), Some(dec!(4)));
        assert_eq!(sma.samples(), 5);
    }

    #[test]
    fn test_sma_reset() {
        let mut sma = Sma::new(2);
        sma.next(&point(dec!(10)));
        sma.next(&point(dec!(20)));
        sma.reset();
        assert!(!sma.is_ready());
        assert_eq!(sma.samples(), 0);
        assert_eq!(sma.next(&point(dec!(5))), None);
        assert_eq!(sma.next(&point(dec!(15))), Some(dec!(10)));
    }
}
