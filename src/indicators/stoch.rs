use serde::Serialize;
use std::collections::VecDeque;

use crate::indicators::moving_average::Sma;
use crate::indicators::series::{Series, ValueSeries};
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// Number of raw %K values averaged into %D
pub const DEFAULT_D_PERIOD: usize = 3;

/// %K / %D pair shared by the stochastic-style oscillators
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KdValue {
    pub k: f64,
    pub d: f64,
}

/// Sliding-window maximum or minimum with amortized O(1) updates
#[derive(Debug, Clone)]
struct RollingExtreme {
    window: usize,
    seen: usize,
    entries: VecDeque<(usize, f64)>,
    keep_max: bool,
}

impl RollingExtreme {
    fn max(window: usize) -> Self {
        Self::new(window, true)
    }

    fn min(window: usize) -> Self {
        Self::new(window, false)
    }

    fn new(window: usize, keep_max: bool) -> Self {
        Self {
            window: window.max(1),
            seen: 0,
            entries: VecDeque::new(),
            keep_max,
        }
    }

    fn push(&mut self, value: f64) -> f64 {
        let position = self.seen;
        self.seen += 1;

        while let Some(&(_, tail)) = self.entries.back() {
            let dominated = if self.keep_max {
                tail <= value
            } else {
                tail >= value
            };
            if !dominated {
                break;
            }
            self.entries.pop_back();
        }
        self.entries.push_back((position, value));

        while let Some(&(oldest, _)) = self.entries.front() {
            if oldest + self.window > position {
                break;
            }
            self.entries.pop_front();
        }

        self.entries.front().map(|&(_, v)| v).unwrap_or(value)
    }
}

/// Stochastic Oscillator (STOCH)
///
/// %K maps the close into [0, 100] relative to the highest high and lowest
/// low of the last `window` bars; %D is an SMA of %K over three bars.
/// A window without range reads 50.
#[derive(Debug, Clone)]
pub struct Stoch {
    interval_window: IntervalWindow,
    highest: RollingExtreme,
    lowest: RollingExtreme,
    d_sma: Sma,
    k: ValueSeries,
    d: ValueSeries,
}

impl Stoch {
    pub fn new(interval_window: IntervalWindow) -> Self {
        Self::with_d_period(interval_window, DEFAULT_D_PERIOD)
    }

    pub fn with_d_period(interval_window: IntervalWindow, d_period: usize) -> Self {
        Self {
            interval_window,
            highest: RollingExtreme::max(interval_window.window),
            lowest: RollingExtreme::min(interval_window.window),
            d_sma: Sma::new(IntervalWindow::new(interval_window.interval, d_period)),
            k: ValueSeries::with_default_bounds(),
            d: ValueSeries::with_default_bounds(),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        let highest = self.highest.push(high);
        let lowest = self.lowest.push(low);

        let k = if highest == lowest {
            50.0
        } else {
            100.0 * (close - lowest) / (highest - lowest)
        };
        self.k.push(k);

        self.d_sma.update(k);
        self.d.push(self.d_sma.last());
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
}

impl Series for Stoch {
    fn index(&self, i: usize) -> f64 {
        self.k.index(i)
    }

    fn length(&self) -> usize {
        self.k.length()
    }
}

impl Indicator for Stoch {
    const NAME: &'static str = "STOCH";
    type Output = KdValue;

    fn interval(&self) -> Interval {
        self.interval_window.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.high_f64(), candle.low_f64(), candle.close_f64());
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

#[cfg(test)]
mod tests {
    use super::*;

    fn stoch(window: usize) -> Stoch {
        Stoch::new(IntervalWindow::new(Interval::Hour1, window))
    }

    #[test]
    fn test_rolling_extreme_tracks_window() {
        let mut max = RollingExtreme::max(3);
        let mut min = RollingExtreme::min(3);
        let values = [5.0, 1.0, 4.0, 2.0, 3.0, 0.5];
        let maxes: Vec<f64> = values.iter().map(|&v| max.push(v)).collect();
        let mins: Vec<f64> = values.iter().map(|&v| min.push(v)).collect();
        assert_eq!(maxes, vec![5.0, 5.0, 5.0, 4.0, 4.0, 3.0]);
        assert_eq!(mins, vec![5.0, 1.0, 1.0, 1.0, 2.0, 0.5]);
    }

    #[test]
    fn test_close_at_top_of_range_is_100() {
        let mut stoch = stoch(3);
        stoch.update(10.0, 5.0, 6.0);
        stoch.update(12.0, 6.0, 12.0);
        assert_eq!(stoch.last_k(), 100.0);
    }

    #[test]
    fn test_close_at_bottom_of_range_is_0() {
        let mut stoch = stoch(3);
        stoch.update(10.0, 5.0, 6.0);
        stoch.update(8.0, 4.0, 4.0);
        assert_eq!(stoch.last_k(), 0.0);
    }

    #[test]
    fn test_flat_range_reads_50() {
        let mut stoch = stoch(5);
        stoch.update(7.0, 7.0, 7.0);
        assert_eq!(stoch.last_k(), 50.0);
        assert_eq!(stoch.last_d(), 50.0);
    }

    #[test]
    fn test_d_is_mean_of_last_three_k() {
        let mut stoch = stoch(2);
        stoch.update(10.0, 0.0, 10.0); // k = 100
        stoch.update(10.0, 0.0, 0.0); // k = 0
        stoch.update(10.0, 0.0, 5.0); // k = 50
        assert_eq!(stoch.last_d(), 50.0);
        stoch.update(10.0, 0.0, 10.0); // k = 100
        assert!((stoch.last_d() - 50.0).abs() < 1e-12);
        assert_eq!(stoch.k().index(3), 100.0);
    }

    #[test]
    fn test_custom_d_period_smooths_k() {
        let mut stoch = Stoch::with_d_period(IntervalWindow::new(Interval::Hour1, 2), 2);
        stoch.update(10.0, 0.0, 10.0); // k = 100
        assert_eq!(stoch.last_d(), 100.0);
        stoch.update(10.0, 0.0, 0.0); // k = 0
        assert_eq!(stoch.last_d(), 50.0);
        stoch.update(10.0, 0.0, 5.0); // k = 50
        assert_eq!(stoch.last_d(), 25.0);
        assert_eq!(stoch.d().length(), 3);
    }
}
