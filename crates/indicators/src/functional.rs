use crate::{Indicator, Input};
use premier_core::DataPoint;
use rust_decimal::Decimal;
use std::fmt;
use std::marker::PhantomData;

/// Computes the next value from the owned state and the incoming input.
pub type ComputeFn<S, I> = Box<dyn FnMut(&mut S, &I) -> Decimal + Send + Sync>;
/// Decides readiness from the owned state.
pub type ReadyFn<S> = Box<dyn Fn(&S) -> bool + Send + Sync>;
/// Returns the owned state to its initial condition.
pub type ResetFn<S> = Box<dyn FnMut(&mut S) + Send + Sync>;

/// An indicator assembled from injected behaviours instead of a dedicated type.
///
/// The wrapper owns a piece of state `S` (typically other indicators) and hands
/// it to each behaviour explicitly:
///
/// - `compute` turns an input into the next value,
/// - `ready` is consulted on every [`Indicator::is_ready`] call,
/// - `reset` clears the state when the indicator is reset.
///
/// The wrapper itself only tracks the current value and the sample count.
pub struct FunctionalIndicator<S, I> {
    name: String,
    warm_up_period: usize,
    state: S,
    compute: ComputeFn<S, I>,
    ready: ReadyFn<S>,
    reset: ResetFn<S>,
    current: DataPoint,
    count: usize,
    marker: PhantomData<fn(&I)>,
}

impl<S, I> FunctionalIndicator<S, I>
where
    I: Input,
{
    pub fn new(
        name: impl Into<String>,
        warm_up_period: usize,
        state: S,
        compute: impl FnMut(&mut S, &I) -> Decimal + Send + Sync + 'static,
        ready: impl Fn(&S) -> bool + Send + Sync + 'static,
        reset: impl FnMut(&mut S) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            warm_up_period,
            state,
            compute: Box::new(compute),
            ready: Box::new(ready),
            reset: Box::new(reset),
            current: DataPoint::default(),
            count: 0,
            marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The state the behaviours operate on.
    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<S, I> Indicator for FunctionalIndicator<S, I>
where
    S: Send + Sync,
    I: Input,
{
    type Input = I;

    fn next(&mut self, input: &I) -> Option<Decimal> {
        let value = (self.compute)(&mut self.state, input);
        self.current = DataPoint::new(input.timestamp(), value);
        self.count += 1;

        if self.is_ready() {
            Some(value)
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
        (self.reset)(&mut self.state);
        self.current = DataPoint::default();
        self.count = 0;
    }

    fn period(&self) -> usize {
        self.warm_up_period
    }

    fn is_ready(&self) -> bool {
        (self.ready)(&self.state)
    }
}

impl<S: fmt::Debug, I> fmt::Debug for FunctionalIndicator<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionalIndicator")
            .field("name", &self.name)
            .field("warm_up_period", &self.warm_up_period)
            .field("state", &self.state)
            .field("current", &self.current)
            .field("count", &self.count)
            .finish()
    }
}
