use serde::{Deserialize, Serialize};

use crate::indicators::moving_average::Sma;
use crate::indicators::rsi::Rsi;
use crate::indicators::series::{Series, ValueSeries};
use crate::indicators::stoch::{KdValue, Stoch};
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// Window lengths of a [`StochRsi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochRsiConfig {
    pub k_window: usize,
    pub d_window: usize,
    pub rsi_window: usize,
    pub stoch_window: usize,
}

impl Default for StochRsiConfig {
    fn default() -> Self {
        Self {
            k_window: 3,
            d_window: 3,
            rsi_window: 14,
            stoch_window: 14,
        }
    }
}

/// Stochastic RSI
///
/// Price feeds an RSI, whose latest value feeds a STOCH as a single-point bar.
/// The stochastic %K is smoothed by an SMA over `k_window` into K, and K by
/// another SMA over `d_window` into D. K and D keep their full history.
#[derive(Debug, Clone)]
pub struct StochRsi {
    interval: Interval,
    config: StochRsiConfig,
    rsi: Rsi,
    stoch: Stoch,
    k_sma: Sma,
    d_sma: Sma,
    k: ValueSeries,
    d: ValueSeries,
}

impl StochRsi {
    pub fn new(interval: Interval, config: StochRsiConfig) -> Self {
        Self {
            interval,
            config,
            rsi: Rsi::new(IntervalWindow::new(interval, config.rsi_window)),
            stoch: Stoch::new(IntervalWindow::new(interval, config.stoch_window)),
            k_sma: Sma::new(IntervalWindow::new(interval, config.k_window)),
            d_sma: Sma::new(IntervalWindow::new(interval, config.d_window)),
            k: ValueSeries::unbounded(),
            d: ValueSeries::unbounded(),
        }
    }

    pub fn update(&mut self, price: f64) {
        self.rsi.update(price);
        let rsi = self.rsi.last();
        self.stoch.update(rsi, rsi, rsi);
        self.k_sma.update(self.stoch.last_k());
        self.d_sma.update(self.k_sma.last());

        self.k.push(self.k_sma.last());
        self.d.push(self.d_sma.last());
    }

    pub fn config(&self) -> &StochRsiConfig {
        &self.config
    }

    pub fn last_k(&self) -> f64 {
        self.k.last()
    }

    pub fn last_d(&self) -> f64 {
        self.d.last()
    }

    pub fn k(&self) -> &ValueSeries {
        &self.k
    }

    pub fn d(&self) -> &ValueSeries {
        &self.d
    }

    pub fn rsi(&self) -> &Rsi {
        &self.rsi
    }
}

impl Series for StochRsi {
    fn index(&self, i: usize) -> f64 {
        self.k.index(i)
    }

    fn length(&self) -> usize {
        self.k.length()
    }
}

impl Indicator for StochRsi {
    const NAME: &'static str = "STOCHRSI";
    type Output = KdValue;

    fn interval(&self) -> Interval {
        self.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        !self.k.is_empty()
    }

    fn output(&self) -> KdValue {
        KdValue {
            k: self.last_k(),
            d: self.last_d(),
        }
    }
}
