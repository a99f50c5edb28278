use crate::sma::Sma;
use crate::Indicator;
use premier_core::{Bar, DataPoint};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;

/// Stochastic Oscillator (%K and %D).
///
/// %K = (Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(%K, d_period)
///
/// %K is produced from the first bar, over however many bars the window holds
/// so far. The indicator reports ready once the window is full.
///
/// %K is not clamped: a close outside the window's high/low range gives a
/// value above 100 or below 0, saturating at the `Decimal` bounds.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    highs: VecDeque<Decimal>,
    lows: VecDeque<Decimal>,
    d_sma: Sma,
    current_k: Option<Decimal>,
    current_d: Option<Decimal>,
    current: DataPoint,
    count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StochasticOutput {
    pub k: Decimal,
    pub d: Decimal,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        assert!(k_period > 0, "Stochastic %K period must be > 0");
        Self {
            k_period,
            highs: VecDeque::with_capacity(k_period),
            lows: VecDeque::with_capacity(k_period),
            d_sma: Sma::new(d_period),
            current_k: None,
            current_d: None,
            current: DataPoint::default(),
            count: 0,
        }
    }

    fn roll_window(&mut self, high: Decimal, low: Decimal, close: Decimal) -> Decimal {
        self.highs.push_back(high);
        self.lows.push_back(low);

        if self.highs.len() > self.k_period {
            self.highs.pop_front();
            self.lows.pop_front();
        }

        let highest = self.highs.iter().copied().max().unwrap_or(high);
        let lowest = self.lows.iter().copied().min().unwrap_or(low);

        let range = highest.saturating_sub(lowest);
        if range.is_zero() {
            return dec!(50);
        }

        // A close far outside a tight range can exceed Decimal; saturate instead.
        let offset = close.saturating_sub(lowest);
        offset
            .checked_div(range)
            .and_then(|ratio| ratio.checked_mul(dec!(100)))
            .unwrap_or_else(|| {
                if offset.is_sign_negative() == range.is_sign_negative() {
                    Decimal::MAX
                } else {
                    Decimal::MIN
                }
            })
    }

    /// Latest %K, present from the first bar.
    pub fn k(&self) -> Option<Decimal> {
        self.current_k
    }

    /// Latest %D, present once `d_period` %K values have been averaged.
    pub fn d(&self) -> Option<Decimal> {
        self.current_d
    }

    pub fn output(&self) -> Option<StochasticOutput> {
        match (self.current_k, self.current_d) {
            (Some(k), Some(d)) => Some(StochasticOutput { k, d }),
            _ => None,
        }
    }
}

impl Indicator for Stochastic {
    type Input = Bar;

    fn next(&mut self, bar: &Bar) -> Option<Decimal> {
        self.count += 1;
        let k = self.roll_window(bar.high, bar.low, bar.close);
        self.current_k = Some(k);
        self.current_d = self.d_sma.next(&DataPoint::new(bar.timestamp, k));
        self.current = DataPoint::new(bar.timestamp, k);

        if self.is_ready() {
            Some(k)
        } else {
            None
        }
    }

    fn current(&self) -> DataPoint {
        self.current
    }

    fn samples(&self) -> usize {
        self.count
    }

    fn reset(&mut self) {
        self.highs.clear();
        self.lows.clear();
        self.d_sma.reset();
        self.current_k = None;
        self.current_d = None;
        self.current = DataPoint::default();
        self.count = 0;
    }

    fn period(&self) -> usize {
        self.k_period
    }

    fn is_ready(&self) -> bool {
        self.count >= self.k_period
    }
}
