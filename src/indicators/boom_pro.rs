use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::indicators::moving_average::Sma;
use crate::indicators::ring_buffer::RingBuffer;
use crate::indicators::series::{Series, ValueSeries};
use crate::indicators::stoch::KdValue;
use crate::indicators::Indicator;
use crate::models::{Candle, Interval, IntervalWindow};

/// Decay applied to the tracked peak on every bar
const PEAK_DECAY: f64 = 0.991;
/// Scale of the compressed output around `DISPLAY_OFFSET`
const DISPLAY_SIZE: f64 = 60.0;
const DISPLAY_OFFSET: f64 = 50.0;

/// Parameters of a [`BoomPro`] oscillator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoomProConfig {
    /// SuperSmoother cutoff of the %K chain
    pub lp_period: f64,
    /// Compression gain of the %K chain
    pub k1: f64,
    /// SuperSmoother cutoff of the %D chain
    pub lp_period2: f64,
    /// Compression gain of the %D chain
    pub k2: f64,
    /// SMA length applied to %K
    pub trigger: usize,
    /// Cutoff of the shared roofing high-pass
    pub hp_period: f64,
}

impl Default for BoomProConfig {
    fn default() -> Self {
        Self {
            lp_period: 6.0,
            k1: 0.0,
            lp_period2: 27.0,
            k2: 0.3,
            trigger: 2,
            hp_period: 100.0,
        }
    }
}

/// `(x + k) / (k * x + 1)`, 0 when the denominator vanishes
pub fn compress(x: f64, k: f64) -> f64 {
    let denominator = k * x + 1.0;
    if denominator == 0.0 {
        0.0
    } else {
        (x + k) / denominator
    }
}

/// One high-pass -> SuperSmoother -> peak-normalization chain
#[derive(Debug, Clone)]
struct FilterChain {
    hp_coefficient: f64,
    hp_feedback: f64,
    hp_feedback2: f64,
    c1: f64,
    c2: f64,
    c3: f64,
    gain: f64,
    hp: RingBuffer,
    filt: RingBuffer,
    peak: RingBuffer,
}

impl FilterChain {
    fn new(hp_alpha: f64, lp_period: f64, gain: f64) -> Self {
        let a1 = (-1.414 * PI / lp_period).exp();
        let b1 = 2.0 * a1 * (1.414 * PI / lp_period).cos();
        let c2 = b1;
        let c3 = -a1 * a1;

        Self {
            hp_coefficient: (1.0 - hp_alpha / 2.0).powi(2),
            hp_feedback: 2.0 * (1.0 - hp_alpha),
            hp_feedback2: (1.0 - hp_alpha).powi(2),
            c1: 1.0 - c2 - c3,
            c2,
            c3,
            gain,
            hp: RingBuffer::new(3),
            filt: RingBuffer::new(3),
            peak: RingBuffer::new(3),
        }
    }

    /// Advances the chain given the current close and the two previous closes
    fn update(&mut self, close: f64, closes: &RingBuffer) -> f64 {
        let hp = self.hp_coefficient * (close - 2.0 * closes.index(0) + closes.index(1))
            + self.hp_feedback * self.hp.index(0)
            - self.hp_feedback2 * self.hp.index(1);

        let filt = self.c1 * (hp + self.hp.index(0)) / 2.0
            + self.c2 * self.filt.index(0)
            + self.c3 * self.filt.index(1);

        let peak = (PEAK_DECAY * self.peak.index(0)).max(filt.abs());

        let normalized = if peak == 0.0 || !peak.is_finite() {
            0.0
        } else {
            filt / peak
        };

        self.hp.push(hp);
        self.filt.push(filt);
        self.peak.push(peak);

        compress(normalized, self.gain) * DISPLAY_SIZE + DISPLAY_OFFSET
    }
}

/// Cascaded peak-normalized oscillator
///
/// Two filter chains with different SuperSmoother cutoffs run over the same
/// closes. The first chain, smoothed by an SMA over `trigger`, becomes %K;
/// the second is %D. Both series keep their full history.
#[derive(Debug, Clone)]
pub struct BoomPro {
    interval: Interval,
    config: BoomProConfig,
    closes: RingBuffer,
    k_chain: FilterChain,
    d_chain: FilterChain,
    trigger: Sma,
    k: ValueSeries,
    d: ValueSeries,
}

impl BoomPro {
    pub fn new(interval: Interval, config: BoomProConfig) -> Self {
        let angle = 0.707 * 2.0 * PI / config.hp_period;
        let hp_alpha = (angle.cos() + angle.sin() - 1.0) / angle.cos();

        Self {
            interval,
            config,
            closes: RingBuffer::new(3),
            k_chain: FilterChain::new(hp_alpha, config.lp_period, config.k1),
            d_chain: FilterChain::new(hp_alpha, config.lp_period2, config.k2),
            trigger: Sma::new(IntervalWindow::new(interval, config.trigger)),
            k: ValueSeries::unbounded(),
            d: ValueSeries::unbounded(),
        }
    }

    pub fn update(&mut self, close: f64) {
        let k_raw = self.k_chain.update(close, &self.closes);
        self.trigger.update(k_raw);
        self.k.push(self.trigger.last());

        let d = self.d_chain.update(close, &self.closes);
        self.d.push(d);

        self.closes.push(close);
    }

    pub fn config(&self) -> &BoomProConfig {
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
}

impl Series for BoomPro {
    fn index(&self, i: usize) -> f64 {
        self.k.index(i)
    }

    fn length(&self) -> usize {
        self.k.length()
    }
}

impl Indicator for BoomPro {
    const NAME: &'static str = "BOOMPRO";
    type Output = KdValue;

    fn interval(&self) -> Interval {
        self.interval
    }

    fn push_candle(&mut self, candle: &Candle) {
        self.update(candle.close_f64());
    }

    fn is_initialized(&self) -> bool {
        !self.closes.is_empty()
    }

    fn output(&self) -> KdValue {
        KdValue {
            k: self.last_k(),
            d: self.last_d(),
        }
    }
}
