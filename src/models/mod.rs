use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Bar duration of a candle stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "3m")]
    Minute3,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "2h")]
    Hour2,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "6h")]
    Hour6,
    #[serde(rename = "12h")]
    Hour12,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "3d")]
    Day3,
    #[serde(rename = "1w")]
    Week1,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::Minute1,
        Interval::Minute3,
        Interval::Minute5,
        Interval::Minute15,
        Interval::Minute30,
        Interval::Hour1,
        Interval::Hour2,
        Interval::Hour4,
        Interval::Hour6,
        Interval::Hour12,
        Interval::Day1,
        Interval::Day3,
        Interval::Week1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute3 => "3m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Hour2 => "2h",
            Interval::Hour4 => "4h",
            Interval::Hour6 => "6h",
            Interval::Hour12 => "12h",
            Interval::Day1 => "1d",
            Interval::Day3 => "3d",
            Interval::Week1 => "1w",
        }
    }

    /// Length of one bar in minutes
    pub fn minutes(&self) -> i64 {
        match self {
            Interval::Minute1 => 1,
            Interval::Minute3 => 3,
            Interval::Minute5 => 5,
            Interval::Minute15 => 15,
            Interval::Minute30 => 30,
            Interval::Hour1 => 60,
            Interval::Hour2 => 120,
            Interval::Hour4 => 240,
            Interval::Hour6 => 360,
            Interval::Hour12 => 720,
            Interval::Day1 => 1440,
            Interval::Day3 => 4320,
            Interval::Week1 => 10080,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .find(|interval| interval.as_str() == s.trim())
            .copied()
            .ok_or_else(|| Error::InvalidInterval(s.to_string()))
    }
}

/// Interval plus lookback length, the configuration every windowed indicator carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalWindow {
    pub interval: Interval,
    pub window: usize,
}

impl IntervalWindow {
    pub fn new(interval: Interval, window: usize) -> Self {
        Self { interval, window }
    }
}

impl fmt::Display for IntervalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.interval, self.window)
    }
}

fn default_closed() -> bool {
    true
}

/// OHLCV candlestick for one symbol and interval
///
/// Prices stay in fixed-precision decimals; indicators convert through the
/// `*_f64` accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub interval: Interval,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    #[serde(default = "default_closed")]
    pub closed: bool,
}

impl Candle {
    /// Closed candle with `end_time` derived from the interval
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        start_time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start_time,
            end_time: start_time + interval.duration() - Duration::milliseconds(1),
            open,
            high,
            low,
            close,
            volume,
            closed: true,
        }
    }

    pub fn open_f64(&self) -> f64 {
        self.open.to_f64().unwrap_or_default()
    }

    pub fn high_f64(&self) -> f64 {
        self.high.to_f64().unwrap_or_default()
    }

    pub fn low_f64(&self) -> f64 {
        self.low.to_f64().unwrap_or_default()
    }

    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or_default()
    }

    pub fn volume_f64(&self) -> f64 {
        self.volume.to_f64().unwrap_or_default()
    }

    /// Checks high/low bracket open and close and nothing is negative
    pub fn validate(&self) -> Result<(), Error> {
        if self.high < self.low {
            return Err(Error::InvalidCandle(format!(
                "{} {} at {}: high {} below low {}",
                self.symbol, self.interval, self.start_time, self.high, self.low
            )));
        }
        let bracketed = |price: Decimal| price >= self.low && price <= self.high;
        if !bracketed(self.open) || !bracketed(self.close) {
            return Err(Error::InvalidCandle(format!(
                "{} {} at {}: open/close outside high/low range",
                self.symbol, self.interval, self.start_time
            )));
        }
        if self.volume.is_sign_negative() || self.low.is_sign_negative() {
            return Err(Error::InvalidCandle(format!(
                "{} {} at {}: negative price or volume",
                self.symbol, self.interval, self.start_time
            )));
        }
        if self.end_time < self.start_time {
            return Err(Error::InvalidCandle(format!(
                "{} {} at {}: end time before start time",
                self.symbol, self.interval, self.start_time
            )));
        }
        Ok(())
    }
}
