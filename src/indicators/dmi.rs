use serde::Serialize;

use crate::indicators::adx::{directional_index, directional_movement, percent_of, PrevBar};
use crate::indicators::atr::true_range;
use crate::indicators::moving_average::Rma;
use crate::indicators::series::{Series, ValueSeries};
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// Latest +DI / -DI / ADX triple of a [`Dmi`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DmiValue {
    pub di_plus: f64,
    pub di_minus: f64,
    pub adx: f64,
}

/// Directional Movement Index
///
/// TR, +DM and -DM go through Wilder's RMA over `window`; DX is then smoothed
/// by a second RMA over `adx_smoothing`. Values are emitted once `window`
/// true ranges have been seen. The `Series` view is the ADX line.
#[derive(Debug, Clone)]
pub struct Dmi {
    interval_window: IntervalWindow,
    prev: Option<PrevBar>,
    ranges_seen: usize,
    tr: Rma,
    plus_dm: Rma,
    minus_dm: Rma,
    di_plus: ValueSeries,
    di_minus: ValueSeries,
    adx: Rma,
}

impl Dmi {
    pub fn new(interval_window: IntervalWindow, adx_smoothing: usize) -> Self {
        let smoothing = IntervalWindow::new(interval_window.interval, adx_smoothing);
        Self {
            interval_window,
            prev: None,
            ranges_seen: 0,
            tr: Rma::new(interval_window),
            plus_dm: Rma::new(interval_window),
            minus_dm: Rma::new(interval_window),
            di_plus: ValueSeries::with_default_bounds(),
            di_minus: ValueSeries::with_default_bounds(),
            adx: Rma::new(smoothing),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        let Some(prev) = self.prev.replace(PrevBar { high, low, close }) else {
            return;
        };

        let (plus_dm, minus_dm) = directional_movement(high, low, prev.high, prev.low);
        self.tr.update(true_range(high, low, prev.close));
        self.plus_dm.update(plus_dm);
        self.minus_dm.update(minus_dm);
        self.ranges_seen += 1;

        if self.ranges_seen < self.interval_window.window {
            return;
        }

        let di_plus = percent_of(self.plus_dm.last(), self.tr.last());
        let di_minus = percent_of(self.minus_dm.last(), self.tr.last());
        self.di_plus.push(di_plus);
        self.di_minus.push(di_minus);
        self.adx.update(directional_index(di_plus, di_minus));
    }

    pub fn di_plus(&self) -> &ValueSeries {
        &self.di_plus
    }

    pub fn di_minus(&self) -> &ValueSeries {
        &self.di_minus
    }

    pub fn adx(&self) -> &Rma {
        &self.adx
    }
}

impl Series for Dmi {
    fn index(&self, i: usize) -> f64 {
        self.adx.index(i)
    }

    fn length(&self) -> usize {
        self.adx.length()
    }
}

impl Indicator for Dmi {
    const NAME: &'static str = "DMI";
    type Output = DmiValue;

    fn interval(&self) -> Interval {
        self.interval_window.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.high_f64(), candle.low_f64(), candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        self.prev.is_some()
    }

    fn output(&self) -> DmiValue {
        DmiValue {
            di_plus: self.di_plus.last(),
            di_minus: self.di_minus.last(),
            adx: self.adx.last(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dmi(window: usize) -> Dmi {
        Dmi::new(IntervalWindow::new(Interval::Hour4, window), 14)
    }

    #[test]
    fn test_warm_up_until_window_ranges() {
        let mut dmi = dmi(5);
        for i in 0..5 {
            let base = 100.0 + i as f64;
            dmi.update(base + 1.0, base - 1.0, base);
        }
        // five bars give four true ranges
        assert_eq!(dmi.length(), 0);
        assert_eq!(dmi.output().adx, 0.0);

        dmi.update(106.0, 104.0, 105.0);
        assert_eq!(dmi.length(), 1);
        assert_eq!(dmi.di_plus().length(), 1);
    }

    #[test]
    fn test_downtrend_favours_minus_di() {
        let mut dmi = dmi(14);
        for i in 0..40 {
            let base = 200.0 - 2.0 * i as f64;
            dmi.update(base + 1.0, base - 1.0, base - 0.5);
        }
        let value = dmi.output();
        assert!(value.di_minus > value.di_plus);
        assert!(value.adx > 50.0);
    }

    #[test]
    fn test_flat_market_reads_zero() {
        let mut dmi = dmi(3);
        for _ in 0..10 {
            dmi.update(50.0, 50.0, 50.0);
        }
        let value = dmi.output();
        assert_eq!(value.di_plus, 0.0);
        assert_eq!(value.di_minus, 0.0);
        assert_eq!(value.adx, 0.0);
    }
}
