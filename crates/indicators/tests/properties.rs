//! Property tests for the Premier Stochastic Oscillator.
//!
//! Uses proptest to verify:
//! 1. Bounds: the transform stays inside (-1, 1) and is zero only at zero
//! 2. Monotonicity: a higher close on the same bar never lowers the output
//! 3. Determinism: replaying a series, fresh or after reset, is exact

use chrono::{DateTime, Duration, Utc};
use premier_core::Bar;
use premier_indicators::pso::{normalize_k, premier_transform};
use premier_indicators::{Indicator, PremierStochasticOscillator};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Smoothed values of practical magnitude, in hundredths.
fn arb_ss() -> impl Strategy<Value = Decimal> {
    (-3_000i64..3_000).prop_map(|v| Decimal::new(v, 2))
}

/// (high, low, close) in cents with low <= close <= high.
fn arb_hlc() -> impl Strategy<Value = (i64, i64, i64)> {
    (9_000i64..11_000, 0i64..500, 0u8..=100).prop_map(|(low, spread, pos)| {
        let high = low + spread;
        let close = low + spread * i64::from(pos) / 100;
        (high, low, close)
    })
}

fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec(arb_hlc(), 1..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (h, l, c))| bar(i as i64, h, l, c))
            .collect()
    })
}

fn bar(i: i64, high: i64, low: i64, close: i64) -> Bar {
    Bar::hlc(
        "PROP",
        DateTime::<Utc>::UNIX_EPOCH + Duration::hours(i),
        Decimal::new(high, 2),
        Decimal::new(low, 2),
        Decimal::new(close, 2),
    )
}

fn replay(pso: &mut PremierStochasticOscillator, bars: &[Bar]) -> Vec<Option<Decimal>> {
    bars.iter().map(|b| pso.next(b)).collect()
}

// ── 1. Bounds ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn transform_is_bounded(ss in arb_ss()) {
        let pso = premier_transform(ss);
        prop_assert!(pso > -Decimal::ONE && pso < Decimal::ONE);
        prop_assert_eq!(pso.is_zero(), ss.is_zero());
    }

    #[test]
    fn transform_is_monotonic(a in arb_ss(), b in arb_ss()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(premier_transform(lo) <= premier_transform(hi));
    }

    #[test]
    fn normalize_is_increasing(a in 0i64..10_000, b in 0i64..10_000) {
        prop_assume!(a != b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(normalize_k(Decimal::new(lo, 2)) < normalize_k(Decimal::new(hi, 2)));
    }

    #[test]
    fn outputs_stay_bounded(bars in arb_bars(), period in 1usize..20) {
        let mut pso = PremierStochasticOscillator::new(period);
        for value in replay(&mut pso, &bars).into_iter().flatten() {
            prop_assert!(value > -Decimal::ONE && value < Decimal::ONE);
        }
    }
}

// ── 2. Monotonicity ──────────────────────────────────────────────────

proptest! {
    /// Same history, same final high/low: the higher close never yields a lower value.
    #[test]
    fn higher_close_never_lowers_output(
        history in arb_bars(),
        (high, low, close) in arb_hlc(),
        bump in 0u8..=100,
        period in 1usize..20,
    ) {
        let n = history.len() as i64;
        let higher = close + (high - close) * i64::from(bump) / 100;

        let mut a = PremierStochasticOscillator::new(period);
        let mut b = PremierStochasticOscillator::new(period);
        replay(&mut a, &history);
        replay(&mut b, &history);
        a.next(&bar(n, high, low, close));
        b.next(&bar(n, high, low, higher));

        prop_assert!(a.current().value <= b.current().value);
    }
}

// ── 3. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn fresh_instances_agree(bars in arb_bars(), period in 1usize..20) {
        let mut a = PremierStochasticOscillator::new(period);
        let mut b = PremierStochasticOscillator::new(period);
        prop_assert_eq!(replay(&mut a, &bars), replay(&mut b, &bars));
    }

    #[test]
    fn reset_then_replay_matches(bars in arb_bars(), period in 1usize..20) {
        let mut pso = PremierStochasticOscillator::new(period);
        let first = replay(&mut pso, &bars);
        pso.reset();
        prop_assert_eq!(first, replay(&mut pso, &bars));
    }

    #[test]
    fn readiness_waits_for_both_stages(bars in arb_bars(), period in 1usize..20) {
        let mut pso = PremierStochasticOscillator::new(period);
        for (i, b) in bars.iter().enumerate() {
            pso.next(b);
            prop_assert_eq!(pso.is_ready(), i + 1 >= period.max(5));
        }
    }
}
