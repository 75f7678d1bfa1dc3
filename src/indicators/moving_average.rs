use crate::indicators::ring_buffer::RingBuffer;
use crate::indicators::series::{Series, ValueSeries};
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// Simple Moving Average (SMA)
///
/// Arithmetic mean of the last `window` values. During warm-up the mean is
/// taken over however many values have arrived so far.
#[derive(Debug, Clone)]
pub struct Sma {
    interval_window: IntervalWindow,
    buffer: RingBuffer,
    sum: f64,
    values: ValueSeries,
}

impl Sma {
    pub fn new(interval_window: IntervalWindow) -> Self {
        Self {
            interval_window,
            buffer: RingBuffer::new(interval_window.window),
            sum: 0.0,
            values: ValueSeries::with_default_bounds(),
        }
    }

    pub fn update(&mut self, value: f64) {
        let evicted = self.buffer.push(value).unwrap_or(0.0);
        self.sum += value - evicted;
        self.values.push(self.sum / self.buffer.len() as f64);
    }

    pub fn window(&self) -> usize {
        self.interval_window.window
    }

    /// True once `window` values have been averaged
    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }
}

impl Series for Sma {
    fn index(&self, i: usize) -> f64 {
        self.values.index(i)
    }

    fn length(&self) -> usize {
        self.values.length()
    }
}

impl Indicator for Sma {
    const NAME: &'static str = "SMA";
    type Output = f64;

    fn interval(&self) -> Interval {
        self.interval_window.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn output(&self) -> f64 {
        self.last()
    }
}

/// Exponential Moving Average (EMA)
///
/// `ema = ema * (1 - α) + value * α` with `α = 2 / (window + 1)`. The first
/// observation seeds the state directly.
#[derive(Debug, Clone)]
pub struct Ema {
    interval_window: IntervalWindow,
    alpha: f64,
    state: Option<f64>,
    values: ValueSeries,
}

impl Ema {
    pub fn new(interval_window: IntervalWindow) -> Self {
        let alpha = 2.0 / (interval_window.window.max(1) as f64 + 1.0);
        Self::with_alpha(interval_window, alpha)
    }

    fn with_alpha(interval_window: IntervalWindow, alpha: f64) -> Self {
        Self {
            interval_window,
            alpha,
            state: None,
            values: ValueSeries::with_default_bounds(),
        }
    }

    pub fn update(&mut self, value: f64) {
        let next = match self.state {
            Some(prev) => prev * (1.0 - self.alpha) + value * self.alpha,
            None => value,
        };
        self.state = Some(next);
        self.values.push(next);
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Series for Ema {
    fn index(&self, i: usize) -> f64 {
        self.values.index(i)
    }

    fn length(&self) -> usize {
        self.values.length()
    }
}

impl Indicator for Ema {
    const NAME: &'static str = "EMA";
    type Output = f64;

    fn interval(&self) -> Interval {
        self.interval_window.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    fn output(&self) -> f64 {
        self.last()
    }
}

/// Wilder's smoothed moving average (RMA)
///
/// An EMA with `α = 1 / window`, seeded by the first observation.
#[derive(Debug, Clone)]
pub struct Rma {
    inner: Ema,
}

impl Rma {
    pub fn new(interval_window: IntervalWindow) -> Self {
        let alpha = 1.0 / interval_window.window.max(1) as f64;
        Self {
            inner: Ema::with_alpha(interval_window, alpha),
        }
    }

    pub fn update(&mut self, value: f64) {
        self.inner.update(value);
    }
}

impl Series for Rma {
    fn index(&self, i: usize) -> f64 {
        self.inner.index(i)
    }

    fn length(&self) -> usize {
        self.inner.length()
    }
}

impl Indicator for Rma {
    const NAME: &'static str = "RMA";
    type Output = f64;

    fn interval(&self) -> Interval {
        self.inner.interval()
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        self.inner.is_initialized()
    }

    fn output(&self) -> f64 {
        self.last()
    }
}

/// Unnormalized Wilder smoothing: `state = state - state / window + value`.
///
/// Starts from a zero state, so the first value passes through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct WilderSum {
    window: f64,
    state: f64,
}

impl WilderSum {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1) as f64,
            state: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        self.state = self.state - self.state / self.window + value;
        self.state
    }

    pub fn value(&self) -> f64 {
        self.state
    }
}
