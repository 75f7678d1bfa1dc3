/// Average True Range (ATR) indicator
///
/// Measures market volatility by smoothing the true range with Wilder's RMA.
/// True Range is the greatest of:
/// - Current High - Current Low
/// - Abs(Current High - Previous Close)
/// - Abs(Current Low - Previous Close)
///
/// The first bar only records the previous close; values start on the second.
use crate::indicators::moving_average::Rma;
use crate::indicators::series::{Series, ValueSeries};
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// True range of a bar against the previous close
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

#[derive(Debug, Clone)]
pub struct Atr {
    interval_window: IntervalWindow,
    prev_close: Option<f64>,
    rma: Rma,
}

impl Atr {
    pub fn new(interval_window: IntervalWindow) -> Self {
        Self {
            interval_window,
            prev_close: None,
            rma: Rma::new(interval_window),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        if let Some(prev_close) = self.prev_close {
            self.rma.update(true_range(high, low, prev_close));
        }
        self.prev_close = Some(close);
    }
}

impl Series for Atr {
    fn index(&self, i: usize) -> f64 {
        self.rma.index(i)
    }

    fn length(&self) -> usize {
        self.rma.length()
    }
}

impl Indicator for Atr {
    const NAME: &'static str = "ATR";
    type Output = f64;

    fn interval(&self) -> Interval {
        self.interval_window.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.high_f64(), candle.low_f64(), candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        self.prev_close.is_some()
    }

    fn output(&self) -> f64 {
        self.last()
    }
}

/// ATR expressed as a percentage of the closing price
///
/// A close of exactly zero yields 0 rather than an infinite ratio.
#[derive(Debug, Clone)]
pub struct Atrp {
    atr: Atr,
    values: ValueSeries,
}

impl Atrp {
    pub fn new(interval_window: IntervalWindow) -> Self {
        Self {
            atr: Atr::new(interval_window),
            values: ValueSeries::with_default_bounds(),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        let had_baseline = self.atr.is_initialized();
        self.atr.update(high, low, close);
        if !had_baseline {
            return;
        }

        let pct = if close == 0.0 {
            0.0
        } else {
            self.atr.last() / close * 100.0
        };
        self.values.push(pct);
    }

    pub fn atr(&self) -> &Atr {
        &self.atr
    }
}

impl Series for Atrp {
    fn index(&self, i: usize) -> f64 {
        self.values.index(i)
    }

    fn length(&self) -> usize {
        self.values.length()
    }
}

impl Indicator for Atrp {
    const NAME: &'static str = "ATRP";
    type Output = f64;

    fn interval(&self) -> Interval {
        self.atr.interval()
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.high_f64(), candle.low_f64(), candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        self.atr.is_initialized()
    }

    fn output(&self) -> f64 {
        self.last()
    }
}
