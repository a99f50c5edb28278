use crate::ema::Ema;
use crate::functional::FunctionalIndicator;
use crate::stochastic::Stochastic;
use crate::Indicator;
use premier_core::{Bar, DataPoint};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Period of the exponential filter applied to normalized %K. Not configurable.
pub const SMOOTHING_PERIOD: usize = 5;

const NORMALIZATION_FACTOR: Decimal = dec!(0.1);
const K_MIDPOINT: Decimal = dec!(50);

/// Map %K from its nominal 0..100 range onto roughly -5..5, centred on zero.
pub fn normalize_k(k: Decimal) -> Decimal {
    NORMALIZATION_FACTOR * k.saturating_sub(K_MIDPOINT)
}

/// Squash a smoothed, normalized %K into (-1, 1).
///
/// Equal to `(e^ss - 1) / (e^ss + 1)`, evaluated as `tanh(ss / 2)` so that
/// large magnitudes saturate toward ±1 instead of overflowing.
///
/// The open interval only holds for `|ss|` below roughly 38. Past that `tanh`
/// rounds to exactly ±1 in `f64`, and that is what is returned.
pub fn premier_transform(ss: Decimal) -> Decimal {
    let half = ss.to_f64().unwrap_or(0.0) / 2.0;
    Decimal::from_f64(half.tanh()).unwrap_or(Decimal::ZERO)
}

/// The two sub-indicators the oscillator is composed from.
#[derive(Debug, Clone)]
pub struct PremierStages {
    stochastic: Stochastic,
    smoothing: Ema,
}

impl PremierStages {
    fn new(period: usize) -> Self {
        Self {
            stochastic: Stochastic::new(period, period),
            smoothing: Ema::new(SMOOTHING_PERIOD),
        }
    }

    pub fn stochastic(&self) -> &Stochastic {
        &self.stochastic
    }

    pub fn smoothing(&self) -> &Ema {
        &self.smoothing
    }

    fn compute(&mut self, bar: &Bar) -> Decimal {
        self.stochastic.next(bar);
        let k = self.stochastic.current().value;

        // The filter is fed the bar's own timestamp; only call order matters to it.
        self.smoothing.next(&DataPoint::new(bar.timestamp, normalize_k(k)));
        let ss = self.smoothing.current().value;

        premier_transform(ss)
    }

    fn is_ready(&self) -> bool {
        self.smoothing.is_ready() && self.stochastic.is_ready()
    }

    fn reset(&mut self) {
        self.stochastic.reset();
        self.smoothing.reset();
    }
}

/// Premier Stochastic Oscillator (PSO).
///
/// Normalizes the stochastic %K around zero, smooths it with a 5-period EMA
/// and squashes the result with `tanh(ss / 2)`:
///
/// ```text
/// nsk = 0.1 * (%K - 50)
/// ss  = EMA(nsk, 5)
/// pso = (e^ss - 1) / (e^ss + 1)
/// ```
///
/// Output lies in (-1, 1). Descriptions of this oscillator commonly quote a
/// 0..100 scale; the formula above does not produce one and is kept as is.
///
/// [`Indicator::period`] reports the stochastic period only. When that period
/// is shorter than [`SMOOTHING_PERIOD`] the oscillator becomes ready later than
/// advertised, at `max(period, 5)` updates. Values read through
/// [`Indicator::current`] before [`Indicator::is_ready`] are not meaningful.
#[derive(Debug)]
pub struct PremierStochasticOscillator {
    name: String,
    warm_up_period: usize,
    pso: FunctionalIndicator<PremierStages, Bar>,
}

impl PremierStochasticOscillator {
    /// Create an oscillator named `PSO(period)`.
    pub fn new(period: usize) -> Self {
        Self::with_name(format!("PSO({period})"), period)
    }

    pub fn with_name(name: impl Into<String>, period: usize) -> Self {
        assert!(period > 0, "PSO period must be > 0");
        let name = name.into();
        let pso = FunctionalIndicator::new(
            format!("{name}_PSO"),
            period,
            PremierStages::new(period),
            PremierStages::compute,
            PremierStages::is_ready,
            PremierStages::reset,
        );

        Self {
            name,
            warm_up_period: period,
            pso,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stochastic lookback, which is also the advertised warm-up.
    pub fn warm_up_period(&self) -> usize {
        self.warm_up_period
    }

    /// The composed indicator that does the actual work.
    pub fn pso(&self) -> &FunctionalIndicator<PremierStages, Bar> {
        &self.pso
    }

    pub fn stochastic(&self) -> &Stochastic {
        self.pso.state().stochastic()
    }

    pub fn smoothing(&self) -> &Ema {
        self.pso.state().smoothing()
    }
}

impl Indicator for PremierStochasticOscillator {
    type Input = Bar;

    fn next(&mut self, bar: &Bar) -> Option<Decimal> {
        let was_ready = self.pso.is_ready();
        let value = self.pso.next(bar);

        if !was_ready && value.is_some() {
            tracing::debug!(
                indicator = %self.name,
                samples = self.pso.samples(),
                "indicator ready"
            );
        }

        value
    }

    fn current(&self) -> DataPoint {
        self.pso.current()
    }

    fn samples(&self) -> usize {
        self.pso.samples()
    }

    fn reset(&mut self) {
        self.pso.reset();
    }

    fn period(&self) -> usize {
        self.warm_up_period
    }

    fn is_ready(&self) -> bool {
        self.pso.is_ready()
    }
}
