use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::models::Candle;

pub const MAX_CANDLES: usize = 5_000;
pub const TRUNCATE_TO: usize = 100;

/// Size policy of a candle window
///
/// Once a window grows past `max_candles` it is cut back to the most recent
/// `truncate_to` candles in a single batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowLimits {
    pub max_candles: usize,
    pub truncate_to: usize,
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self {
            max_candles: MAX_CANDLES,
            truncate_to: TRUNCATE_TO,
        }
    }
}

impl WindowLimits {
    pub fn new(max_candles: usize, truncate_to: usize) -> Self {
        let max_candles = max_candles.max(1);
        Self {
            max_candles,
            truncate_to: truncate_to.clamp(1, max_candles),
        }
    }
}

/// Ordered, bounded run of closed candles for one interval
#[derive(Debug, Clone)]
pub struct CandleWindow {
    candles: VecDeque<Candle>,
    limits: WindowLimits,
}

impl CandleWindow {
    pub fn new(limits: WindowLimits) -> Self {
        Self {
            candles: VecDeque::with_capacity(limits.truncate_to.min(1_000)),
            limits,
        }
    }

    /// Append a candle, returning how many old candles were dropped
    pub fn push(&mut self, candle: Candle) -> usize {
        self.candles.push_back(candle);
        self.enforce_limits()
    }

    /// Append many candles, applying the size policy after each one
    pub fn extend(&mut self, candles: impl IntoIterator<Item = Candle>) -> usize {
        candles.into_iter().map(|c| self.push(c)).sum()
    }

    fn enforce_limits(&mut self) -> usize {
        if self.candles.len() <= self.limits.max_candles {
            return 0;
        }
        let excess = self.candles.len() - self.limits.truncate_to;
        self.candles.drain(..excess);
        excess
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn limits(&self) -> WindowLimits {
        self.limits
    }

    /// Most recently closed candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.front()
    }

    /// Candle at position `i`, oldest first
    pub fn get(&self, i: usize) -> Option<&Candle> {
        self.candles.get(i)
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Candle> + ExactSizeIterator {
        self.candles.iter()
    }

    /// The `n` most recent candles, oldest first
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &Candle> {
        self.candles.iter().skip(self.candles.len().saturating_sub(n))
    }

    pub fn to_vec(&self) -> Vec<Candle> {
        self.candles.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a CandleWindow {
    type Item = &'a Candle;
    type IntoIter = std::collections::vec_deque::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interval;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn create_test_candle(i: i64) -> Candle {
        let price = Decimal::from(100 + i);
        Candle::new(
            "SOL",
            Interval::Minute1,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(i),
            price,
            price,
            price,
            price,
            Decimal::from(1000),
        )
    }

    #[test]
    fn test_push_keeps_order() {
        let mut window = CandleWindow::new(WindowLimits::default());
        for i in 0..3 {
            window.push(create_test_candle(i));
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.first().unwrap().close, Decimal::from(100));
        assert_eq!(window.last().unwrap().close, Decimal::from(102));
    }

    #[test]
    fn test_truncates_to_most_recent_on_overflow() {
        let mut window = CandleWindow::new(WindowLimits::default());
        let mut dropped = 0;
        for i in 0..5_000 {
            dropped += window.push(create_test_candle(i));
        }
        assert_eq!(dropped, 0);
        assert_eq!(window.len(), 5_000);

        assert_eq!(window.push(create_test_candle(5_000)), 4_901);
        assert_eq!(window.len(), 100);
        for (offset, candle) in window.iter().enumerate() {
            assert_eq!(candle.close, Decimal::from(100 + 4_901 + offset as i64));
        }
    }

    #[test]
    fn test_small_limits() {
        let mut window = CandleWindow::new(WindowLimits::new(5, 2));
        let dropped = window.extend((0..6).map(create_test_candle));
        assert_eq!(dropped, 4);
        assert_eq!(window.len(), 2);
        assert_eq!(window.first().unwrap().close, Decimal::from(104));
    }

    #[test]
    fn test_tail_returns_most_recent() {
        let mut window = CandleWindow::new(WindowLimits::default());
        window.extend((0..10).map(create_test_candle));
        let recent: Vec<Decimal> = window.tail(3).map(|c| c.close).collect();
        assert_eq!(
            recent,
            vec![Decimal::from(107), Decimal::from(108), Decimal::from(109)]
        );
        assert_eq!(window.tail(50).count(), 10);
    }

    #[test]
    fn test_limits_are_sanitized() {
        let limits = WindowLimits::new(10, 50);
        assert_eq!(limits.truncate_to, 10);
        let limits = WindowLimits::new(0, 0);
        assert_eq!(limits, WindowLimits::new(1, 1));
    }
}
