/// Average Directional Index (ADX) - Measures trend strength
///
/// ADX ranges from 0 to 100:
/// - ADX > 25: Strong trend (bull or bear)
/// - ADX 20-25: Moderate trend
/// - ADX < 20: Weak trend / choppy / ranging market
///
/// True range and the directional movement pair are each smoothed with the
/// unnormalized Wilder sum; ADX is the SMA of DX over the same window.
/// +DI and -DI stay readable for trend direction:
/// - +DI > -DI: Uptrend
/// - -DI > +DI: Downtrend
use crate::indicators::atr::true_range;
use crate::indicators::moving_average::{Sma, WilderSum};
use crate::indicators::series::Series;
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// +DM and -DM of a bar relative to the previous bar
///
/// Only the larger of the two moves counts, and only when positive.
pub fn directional_movement(high: f64, low: f64, prev_high: f64, prev_low: f64) -> (f64, f64) {
    let up_move = high - prev_high;
    let down_move = prev_low - low;

    let plus_dm = if up_move > down_move {
        up_move.max(0.0)
    } else {
        0.0
    };

    let minus_dm = if down_move > up_move {
        down_move.max(0.0)
    } else {
        0.0
    };

    (plus_dm, minus_dm)
}

/// `100 * |+DI - -DI| / (+DI + -DI)`, 0 when both are zero
pub fn directional_index(di_plus: f64, di_minus: f64) -> f64 {
    let di_sum = di_plus + di_minus;
    if di_sum > 0.0 {
        (di_plus - di_minus).abs() / di_sum * 100.0
    } else {
        0.0
    }
}

pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PrevBar {
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone)]
pub struct Adx {
    interval_window: IntervalWindow,
    prev: Option<PrevBar>,
    smoothed_tr: WilderSum,
    smoothed_plus_dm: WilderSum,
    smoothed_minus_dm: WilderSum,
    di_plus: f64,
    di_minus: f64,
    dx: f64,
    sma: Sma,
}

impl Adx {
    pub fn new(interval_window: IntervalWindow) -> Self {
        Self {
            interval_window,
            prev: None,
            smoothed_tr: WilderSum::new(interval_window.window),
            smoothed_plus_dm: WilderSum::new(interval_window.window),
            smoothed_minus_dm: WilderSum::new(interval_window.window),
            di_plus: 0.0,
            di_minus: 0.0,
            dx: 0.0,
            sma: Sma::new(interval_window),
        }
    }

    pub fn update(&mut self, high: f64, low: f64, close: f64) {
        let Some(prev) = self.prev.replace(PrevBar { high, low, close }) else {
            return;
        };

        let tr = true_range(high, low, prev.close);
        let (plus_dm, minus_dm) = directional_movement(high, low, prev.high, prev.low);

        let smoothed_tr = self.smoothed_tr.update(tr);
        let smoothed_plus_dm = self.smoothed_plus_dm.update(plus_dm);
        let smoothed_minus_dm = self.smoothed_minus_dm.update(minus_dm);

        self.di_plus = percent_of(smoothed_plus_dm, smoothed_tr);
        self.di_minus = percent_of(smoothed_minus_dm, smoothed_tr);
        self.dx = directional_index(self.di_plus, self.di_minus);

        self.sma.update(self.dx);
    }

    /// Latest +DI
    pub fn di_plus(&self) -> f64 {
        self.di_plus
    }

    /// Latest -DI
    pub fn di_minus(&self) -> f64 {
        self.di_minus
    }

    /// Latest unsmoothed directional index
    pub fn dx(&self) -> f64 {
        self.dx
    }
}

impl Series for Adx {
    fn index(&self, i: usize) -> f64 {
        self.sma.index(i)
    }

    fn length(&self) -> usize {
        self.sma.length()
    }
}

impl Indicator for Adx {
    const NAME: &'static str = "ADX";
    type Output = f64;

    fn interval(&self) -> Interval {
        self.interval_window.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.high_f64(), candle.low_f64(), candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        self.prev.is_some()
    }

    fn output(&self) -> f64 {
        self.last()
    }
}
