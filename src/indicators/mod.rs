// Technical indicators module
// Streaming indicators that advance one bar at a time: SMA, EMA, RMA, ATR,
// ADX, DMI, RSI, STOCH, STOCHRSI and the BOOMPRO oscillator

pub mod adx;
pub mod atr;
pub mod boom_pro;
pub mod cross;
pub mod dmi;
pub mod moving_average;
pub mod ring_buffer;
pub mod rsi;
pub mod series;
pub mod stoch;
pub mod stoch_rsi;

pub use adx::Adx;
pub use atr::{true_range, Atr, Atrp};
pub use boom_pro::{BoomPro, BoomProConfig};
pub use cross::{crossover, crossunder, Cross, CrossDirection};
pub use dmi::{Dmi, DmiValue};
pub use moving_average::{Ema, Rma, Sma, WilderSum};
pub use ring_buffer::RingBuffer;
pub use rsi::Rsi;
pub use series::{Series, ValueSeries};
pub use stoch::{KdValue, Stoch};
pub use stoch_rsi::{StochRsi, StochRsiConfig};

use std::fmt::Debug;

use crate::models::{Candle, Interval};

/// Candle-driven streaming indicator
///
/// Two phases: [`initialize`](Indicator::initialize) consumes a bulk history
/// once, then [`push_candle`](Indicator::push_candle) advances by exactly one
/// bar. Pushing bars one by one and initializing from the same bars reach the
/// same state.
pub trait Indicator: Series {
    /// Short name used in logs
    const NAME: &'static str;

    /// Value handed to update listeners
    type Output: Copy + Debug + Send + 'static;

    /// Interval of the candles this indicator consumes
    fn interval(&self) -> Interval;

    /// Advance state by one closed bar
    fn push_candle(&mut self, candle: &Candle);

    /// True once any bar has been consumed, baseline-only bars included
    fn is_initialized(&self) -> bool;

    /// Latest output
    fn output(&self) -> Self::Output;

    /// Bulk warm-up from history, oldest bar first
    ///
    /// Only effective on a fresh instance; later calls are ignored.
    fn initialize<'a, I>(&mut self, history: I)
    where
        I: IntoIterator<Item = &'a Candle>,
        Self: Sized,
    {
        if self.is_initialized() {
            tracing::warn!("{} already initialized, ignoring bulk history", Self::NAME);
            return;
        }

        let bars = replay(self, history);
        tracing::debug!(
            "{} {} initialized from {} bars, {} values",
            Self::NAME,
            self.interval(),
            bars,
            self.length()
        );
    }
}

/// Feed candles one by one, returning how many were consumed
pub fn replay<'a, T, I>(indicator: &mut T, candles: I) -> usize
where
    T: Indicator,
    I: IntoIterator<Item = &'a Candle>,
{
    let mut count = 0;
    for candle in candles {
        indicator.push_candle(candle);
        count += 1;
    }
    count
}
