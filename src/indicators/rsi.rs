/// Relative Strength Index (RSI)
///
/// RSI measures the magnitude of recent price changes to evaluate
/// overbought or oversold conditions.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
///
/// Gains and losses are smoothed independently with Wilder's RMA. The first
/// price only seeds the baseline; no value is emitted for it.
use crate::indicators::moving_average::Rma;
use crate::indicators::series::{Series, ValueSeries};
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// RSI from smoothed gain and loss
///
/// No losses at all reads 100; no movement in either direction reads 50.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[derive(Debug, Clone)]
pub struct Rsi {
    interval_window: IntervalWindow,
    prev_price: Option<f64>,
    gains: Rma,
    losses: Rma,
    values: ValueSeries,
}

impl Rsi {
    pub fn new(interval_window: IntervalWindow) -> Self {
        Self {
            interval_window,
            prev_price: None,
            gains: Rma::new(interval_window),
            losses: Rma::new(interval_window),
            values: ValueSeries::with_default_bounds(),
        }
    }

    pub fn update(&mut self, price: f64) {
        let Some(prev_price) = self.prev_price.replace(price) else {
            return;
        };

        self.gains.update((price - prev_price).max(0.0));
        self.losses.update((prev_price - price).max(0.0));

        self.values
            .push(rsi_from_averages(self.gains.last(), self.losses.last()));
    }
}

impl Series for Rsi {
    fn index(&self, i: usize) -> f64 {
        self.values.index(i)
    }

    fn length(&self) -> usize {
        self.values.length()
    }
}

impl Indicator for Rsi {
    const NAME: &'static str = "RSI";
    type Output = f64;

    fn interval(&self) -> Interval {
        self.interval_window.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        self.prev_price.is_some()
    }

    fn output(&self) -> f64 {
        self.last()
    }
}
