use crate::models::{Candle, Interval};
use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+2% daily average)
    Uptrend,
    /// Steady downtrend with noise (-2% daily average)
    Downtrend,
    /// Sideways/choppy market (±1% around mean)
    Sideways,
    /// High volatility (±5% large swings)
    Volatile,
}

impl MarketScenario {
    pub const ALL: [MarketScenario; 4] = [
        MarketScenario::Uptrend,
        MarketScenario::Downtrend,
        MarketScenario::Sideways,
        MarketScenario::Volatile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketScenario::Uptrend => "uptrend",
            MarketScenario::Downtrend => "downtrend",
            MarketScenario::Sideways => "sideways",
            MarketScenario::Volatile => "volatile",
        }
    }
}

impl fmt::Display for MarketScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketScenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown scenario '{}', expected one of uptrend, downtrend, sideways, volatile",
                    s
                )
            })
    }
}

/// Generates reproducible closed candles for replays and tests
pub struct SyntheticDataGenerator {
    rng: StdRng,
    symbol: String,
    base_price: f64,
    base_volume: f64,
    start_time: DateTime<Utc>,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64, symbol: impl Into<String>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            symbol: symbol.into(),
            base_price: 150.0,
            base_volume: 1_000_000.0,
            start_time: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        }
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn base_price(&self) -> f64 {
        self.base_price
    }

    /// Generate `num_candles` consecutive candles of `interval`
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_candles: usize,
        interval: Interval,
    ) -> Vec<Candle> {
        // ±2% per day spread over the bars of one day
        let bars_per_day = (24 * 60) as f64 / interval.minutes() as f64;
        let daily_drift = 0.02 / bars_per_day;

        let mut candles = Vec::with_capacity(num_candles);
        let mut current_price = self.base_price;
        let mean_price = self.base_price;

        for i in 0..num_candles {
            current_price = match scenario {
                MarketScenario::Uptrend => {
                    let noise = self.rng.gen_range(-0.001..0.001);
                    current_price * (1.0 + daily_drift + noise)
                }
                MarketScenario::Downtrend => {
                    let noise = self.rng.gen_range(-0.001..0.001);
                    current_price * (1.0 - daily_drift + noise)
                }
                MarketScenario::Sideways => {
                    // 10% pull to the mean plus ±1% noise
                    let reversion = (mean_price - current_price) * 0.1;
                    current_price + reversion + current_price * self.rng.gen_range(-0.01..0.01)
                }
                MarketScenario::Volatile => {
                    let change = current_price * self.rng.gen_range(-0.05..0.05);
                    (current_price + change).max(self.base_price * 0.5)
                }
            };

            let start_time = self.start_time + interval.duration() * i as i32;
            candles.push(self.create_candle(current_price, start_time, interval));
        }

        tracing::debug!(
            "Generated {} {} {} candles for {}",
            candles.len(),
            scenario,
            interval,
            self.symbol
        );
        candles
    }

    /// Realistic OHLC around the close price
    fn create_candle(
        &mut self,
        price: f64,
        start_time: DateTime<Utc>,
        interval: Interval,
    ) -> Candle {
        let noise_pct = 0.002; // ±0.2% intrabar movement

        let high = price * (1.0 + self.rng.gen_range(0.0..noise_pct));
        let low = price * (1.0 - self.rng.gen_range(0.0..noise_pct));

        // Open clamped between low and high
        let open = (price * (1.0 + self.rng.gen_range(-noise_pct..noise_pct))).clamp(low, high);

        // Vary volume ±30%
        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Candle::new(
            self.symbol.as_str(),
            interval,
            start_time,
            to_decimal(open),
            to_decimal(high),
            to_decimal(low),
            to_decimal(price),
            to_decimal(volume),
        )
    }
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(6)
}
