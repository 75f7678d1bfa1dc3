use chrono::{DateTime, TimeZone, Utc};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::models::{Candle, Interval};

/// Bulk-history accessor used once at startup to warm indicators up
///
/// `None` means no history exists for the pair; callers decide whether that
/// aborts initialization.
pub trait CandleHistory {
    fn candles(&self, symbol: &str, interval: Interval) -> Option<&[Candle]>;

    /// Like [`candles`](Self::candles) but turns absence into an error
    fn require(&self, symbol: &str, interval: Interval) -> Result<&[Candle]> {
        self.candles(symbol, interval)
            .ok_or_else(|| Error::HistoryNotFound {
                symbol: symbol.to_string(),
                interval,
            })
    }
}

/// History kept in memory, keyed by symbol and interval
#[derive(Debug, Default, Clone)]
pub struct InMemoryHistory {
    series: HashMap<(String, Interval), Vec<Candle>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add candles, keeping each series sorted by start time
    pub fn insert(&mut self, candles: impl IntoIterator<Item = Candle>) {
        let mut touched = Vec::new();
        for candle in candles {
            let key = (candle.symbol.clone(), candle.interval);
            if !touched.contains(&key) {
                touched.push(key.clone());
            }
            self.series.entry(key).or_default().push(candle);
        }

        for key in touched {
            if let Some(series) = self.series.get_mut(&key) {
                series.sort_by_key(|c| c.start_time);
                series.dedup_by_key(|c| c.start_time);
                tracing::debug!("History {} {} holds {} candles", key.0, key.1, series.len());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<Candle> for InMemoryHistory {
    fn from_iter<T: IntoIterator<Item = Candle>>(iter: T) -> Self {
        let mut history = Self::new();
        history.insert(iter);
        history
    }
}

impl CandleHistory for InMemoryHistory {
    fn candles(&self, symbol: &str, interval: Interval) -> Option<&[Candle]> {
        self.series
            .get(&(symbol.to_string(), interval))
            .filter(|series| !series.is_empty())
            .map(Vec::as_slice)
    }
}

// CSV header: timestamp,open,high,low,close,volume
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

/// Accepts RFC 3339 or unix epoch milliseconds
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(millis) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_decimal(raw: &str, field: &str, line: usize) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| {
        Error::InvalidCandle(format!("line {}: cannot parse {} '{}': {}", line, field, raw, e))
    })
}

/// Load closed candles for one symbol and interval from a CSV file
///
/// Rows must be in chronological order; every row is validated.
pub fn load_csv(path: impl AsRef<Path>, symbol: &str, interval: Interval) -> Result<Vec<Candle>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut candles: Vec<Candle> = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        let line = idx + 2;
        let row = row?;

        let start_time = parse_timestamp(&row.timestamp).ok_or_else(|| {
            Error::InvalidCandle(format!("line {}: bad timestamp '{}'", line, row.timestamp))
        })?;

        let candle = Candle::new(
            symbol,
            interval,
            start_time,
            parse_decimal(&row.open, "open", line)?,
            parse_decimal(&row.high, "high", line)?,
            parse_decimal(&row.low, "low", line)?,
            parse_decimal(&row.close, "close", line)?,
            parse_decimal(&row.volume, "volume", line)?,
        );
        candle.validate()?;

        if let Some(prev) = candles.last() {
            if candle.start_time <= prev.start_time {
                return Err(Error::InvalidCandle(format!(
                    "line {}: timestamp {} not after {}",
                    line, candle.start_time, prev.start_time
                )));
            }
        }
        candles.push(candle);
    }

    tracing::info!(
        "Loaded {} {} {} candles from {}",
        candles.len(),
        symbol,
        interval,
        path.display()
    );
    Ok(candles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    fn create_test_candle(symbol: &str, interval: Interval, hour: u32) -> Candle {
        Candle::new(
            symbol,
            interval,
            Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            Decimal::from(10),
            Decimal::from(11),
            Decimal::from(9),
            Decimal::from(10),
            Decimal::from(100),
        )
    }

    #[test]
    fn test_load_csv_valid_rows() {
        let file = create_test_csv(
            "\
timestamp,open,high,low,close,volume
2024-01-01T00:00:00Z,100.5,101.25,99.75,101.0,1500
1704070800000,101.0,102.0,100.0,101.5,1200.5",
        );

        let candles = load_csv(file.path(), "BTCUSDT", Interval::Hour1).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].symbol, "BTCUSDT");
        assert_eq!(candles[0].close, Decimal::from_str("101.0").unwrap());
        assert_eq!(
            candles[1].start_time,
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()
        );
        assert!(candles.iter().all(|c| c.closed && c.interval == Interval::Hour1));
    }

    #[test]
    fn test_load_csv_header_only() {
        let file = create_test_csv("timestamp,open,high,low,close,volume");
        let candles = load_csv(file.path(), "BTCUSDT", Interval::Hour1).unwrap();
        assert!(candles.is_empty());
    }

    #[test]
    fn test_load_csv_rejects_bad_price() {
        let file = create_test_csv(
            "\
timestamp,open,high,low,close,volume
2024-01-01T00:00:00Z,abc,101,99,100,10",
        );
        let err = load_csv(file.path(), "BTCUSDT", Interval::Hour1).unwrap_err();
        assert!(err.to_string().contains("cannot parse open"));
    }

    #[test]
    fn test_load_csv_rejects_inconsistent_candle() {
        let file = create_test_csv(
            "\
timestamp,open,high,low,close,volume
2024-01-01T00:00:00Z,100,99,101,100,10",
        );
        assert!(matches!(
            load_csv(file.path(), "BTCUSDT", Interval::Hour1),
            Err(Error::InvalidCandle(_))
        ));
    }

    #[test]
    fn test_load_csv_rejects_out_of_order_rows() {
        let file = create_test_csv(
            "\
timestamp,open,high,low,close,volume
2024-01-01T01:00:00Z,100,101,99,100,10
2024-01-01T00:00:00Z,100,101,99,100,10",
        );
        let err = load_csv(file.path(), "BTCUSDT", Interval::Hour1).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_load_csv_missing_file() {
        assert!(load_csv("/nonexistent/candles.csv", "BTCUSDT", Interval::Hour1).is_err());
    }

    #[test]
    fn test_in_memory_history_lookup() {
        let history: InMemoryHistory = vec![
            create_test_candle("BTCUSDT", Interval::Hour1, 2),
            create_test_candle("BTCUSDT", Interval::Hour1, 1),
            create_test_candle("ETHUSDT", Interval::Hour1, 1),
        ]
        .into_iter()
        .collect();

        let btc = history.candles("BTCUSDT", Interval::Hour1).unwrap();
        assert_eq!(btc.len(), 2);
        assert!(btc[0].start_time < btc[1].start_time);
        assert_eq!(history.len(), 3);

        assert!(history.candles("BTCUSDT", Interval::Minute1).is_none());
        assert!(history.candles("SOLUSDT", Interval::Hour1).is_none());
    }

    #[test]
    fn test_require_reports_missing_history() {
        let history = InMemoryHistory::new();
        match history.require("BTCUSDT", Interval::Hour4) {
            Err(Error::HistoryNotFound { symbol, interval }) => {
                assert_eq!(symbol, "BTCUSDT");
                assert_eq!(interval, Interval::Hour4);
            }
            other => panic!("unexpected {:?}", other.map(|c| c.len())),
        }
    }
}
