use chrono::{DateTime, Utc};
use premier_data::ReferenceRow;
use premier_indicators::{Indicator, PremierStochasticOscillator};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// A row where the computed value strayed from the reference by more than the tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub timestamp: DateTime<Utc>,
    pub expected: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub rows: usize,
    /// Rows where the oscillator was ready and a reference value existed.
    pub compared: usize,
    pub max_deviation: f64,
    pub mismatches: Vec<Mismatch>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.compared > 0 && self.mismatches.is_empty()
    }
}

/// Run a fresh oscillator over the reference rows and compare each ready value.
pub fn verify_series(rows: &[ReferenceRow], period: usize, tolerance: f64) -> VerifyReport {
    let mut pso = PremierStochasticOscillator::new(period);
    let mut report = VerifyReport {
        rows: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let (Some(actual), Some(expected)) = (pso.next(&row.bar), row.expected) else {
            continue;
        };

        report.compared += 1;
        let deviation = (actual - expected).abs().to_f64().unwrap_or(f64::INFINITY);
        report.max_deviation = report.max_deviation.max(deviation);

        if deviation > tolerance {
            tracing::warn!(
                timestamp = %row.bar.timestamp,
                %expected,
                %actual,
                deviation,
                "Reference mismatch"
            );
            report.mismatches.push(Mismatch {
                timestamp: row.bar.timestamp,
                expected,
                actual,
            });
        }
    }

    report
}
