use std::collections::HashMap;

use crate::market_data::history::CandleHistory;
use crate::market_data::store::MarketDataStore;
use crate::market_data::window::WindowLimits;
use crate::models::{Candle, Interval};

/// Routes closed candles to one isolated store per symbol
#[derive(Debug, Default)]
pub struct MarketDataSession {
    limits: WindowLimits,
    stores: HashMap<String, MarketDataStore>,
}

impl MarketDataSession {
    pub fn new(limits: WindowLimits) -> Self {
        Self {
            limits,
            stores: HashMap::new(),
        }
    }

    /// Store for `symbol`, created on first use
    pub fn subscribe(&mut self, symbol: &str) -> &mut MarketDataStore {
        let limits = self.limits;
        self.stores.entry(symbol.to_string()).or_insert_with(|| {
            tracing::info!("Subscribed to {}", symbol);
            MarketDataStore::with_limits(symbol, limits)
        })
    }

    pub fn store(&self, symbol: &str) -> Option<&MarketDataStore> {
        self.stores.get(symbol)
    }

    pub fn store_mut(&mut self, symbol: &str) -> Option<&mut MarketDataStore> {
        self.stores.get_mut(symbol)
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.stores.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    /// Forward a candle to its symbol's store
    ///
    /// Returns false for unsubscribed symbols or candles the store ignored.
    pub fn add_candle(&mut self, candle: Candle) -> bool {
        match self.stores.get_mut(&candle.symbol) {
            Some(store) => store.add_candle(candle),
            None => {
                tracing::trace!("No store for {}, dropping candle", candle.symbol);
                false
            }
        }
    }

    /// Seed every subscribed store from bulk history
    ///
    /// Returns the `(symbol, interval)` pairs that had no history.
    pub fn warm_up<H: CandleHistory>(
        &mut self,
        history: &H,
        intervals: &[Interval],
    ) -> Vec<(String, Interval)> {
        let mut missing = Vec::new();
        for (symbol, store) in self.stores.iter_mut() {
            for &interval in intervals {
                match history.candles(symbol, interval) {
                    Some(candles) => store.seed_window(interval, candles.iter().cloned()),
                    None => {
                        tracing::warn!("No history for {} {}", symbol, interval);
                        missing.push((symbol.clone(), interval));
                    }
                }
            }
        }
        missing.sort();
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::history::InMemoryHistory;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn create_test_candle(symbol: &str, i: i64) -> Candle {
        let price = Decimal::from(100 + i);
        Candle::new(
            symbol,
            Interval::Minute15,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Interval::Minute15.duration() * i as i32,
            price,
            price,
            price,
            price,
            Decimal::from(10),
        )
    }

    #[test]
    fn test_routes_by_symbol() {
        let mut session = MarketDataSession::default();
        session.subscribe("BTCUSDT");
        session.subscribe("ETHUSDT");

        assert!(session.add_candle(create_test_candle("BTCUSDT", 0)));
        assert!(session.add_candle(create_test_candle("BTCUSDT", 1)));
        assert!(session.add_candle(create_test_candle("ETHUSDT", 0)));
        assert!(!session.add_candle(create_test_candle("SOLUSDT", 0)));

        let btc = session.store("BTCUSDT").unwrap();
        assert_eq!(btc.window(Interval::Minute15).unwrap().len(), 2);
        let eth = session.store("ETHUSDT").unwrap();
        assert_eq!(eth.window(Interval::Minute15).unwrap().len(), 1);
        assert!(session.store("SOLUSDT").is_none());
        assert_eq!(session.symbols(), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_subscribe_is_idempotent() {
        let mut session = MarketDataSession::default();
        session.subscribe("BTCUSDT").on_window_update(|_, _| {});
        assert_eq!(session.subscribe("BTCUSDT").listener_count(), 1);
    }

    #[test]
    fn test_warm_up_reports_missing_history() {
        let history: InMemoryHistory = (0..5).map(|i| create_test_candle("BTCUSDT", i)).collect();

        let mut session = MarketDataSession::default();
        session.subscribe("BTCUSDT");
        session.subscribe("ETHUSDT");

        let missing = session.warm_up(&history, &[Interval::Minute15]);
        assert_eq!(missing, vec![("ETHUSDT".to_string(), Interval::Minute15)]);
        let btc = session.store("BTCUSDT").unwrap();
        assert_eq!(btc.window(Interval::Minute15).unwrap().len(), 5);
    }
}
