use barstream::backtest::{MarketScenario, SyntheticDataGenerator};
use barstream::indicators::*;
use barstream::market_data::{lock, shared, InMemoryHistory, MarketDataSession, WindowLimits};
use barstream::models::{Candle, Interval, IntervalWindow};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

fn create_test_candle(symbol: &str, i: i64, high: i64, low: i64, close: i64) -> Candle {
    Candle::new(
        symbol,
        Interval::Hour1,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Interval::Hour1.duration() * i as i32,
        Decimal::from(close),
        Decimal::from(high),
        Decimal::from(low),
        Decimal::from(close),
        Decimal::from(1_000),
    )
}

#[test]
fn test_e2e_pipeline() {
    let _ = tracing_subscriber::fmt::try_init();

    println!("=== Starting E2E Test ===\n");

    // 1. Warm-up history
    println!("1. Seeding history...");
    let candles = SyntheticDataGenerator::new(42, "BTCUSDT").generate(
        MarketScenario::Uptrend,
        400,
        Interval::Hour1,
    );
    let (warm_up, live) = candles.split_at(200);
    let history: InMemoryHistory = warm_up.iter().cloned().collect();

    let mut session = MarketDataSession::new(WindowLimits::default());
    session.subscribe("BTCUSDT");
    let missing = session.warm_up(&history, &[Interval::Hour1]);
    assert!(missing.is_empty());
    println!("   ✓ {} bars seeded", warm_up.len());

    // 2. Initialize and bind indicators
    println!("\n2. Binding indicators...");
    let adx = shared(Adx::new(IntervalWindow::new(Interval::Hour1, 14)));
    let boom = shared(BoomPro::new(Interval::Hour1, BoomProConfig::default()));
    let updates = Arc::new(Mutex::new(0usize));

    let store = session.store_mut("BTCUSDT").unwrap();
    lock(&adx).initialize(store.window(Interval::Hour1).unwrap());
    store.bind(adx.clone());
    let counter = Arc::clone(&updates);
    store.bind_with(boom.clone(), move |value: KdValue| {
        assert!(value.k.is_finite() && value.d.is_finite());
        *counter.lock().unwrap() += 1;
    });
    assert_eq!(lock(&adx).length(), 199);
    println!("   ✓ ADX warmed up: {:.2}", lock(&adx).last());

    // 3. Stream live bars
    println!("\n3. Streaming live bars...");
    for candle in live {
        assert!(session.add_candle(candle.clone()));
    }
    assert_eq!(*updates.lock().unwrap(), live.len());
    assert_eq!(lock(&boom).length(), 400);
    assert_eq!(lock(&adx).length(), 399);

    let window_len = session
        .store("BTCUSDT")
        .and_then(|store| store.window(Interval::Hour1))
        .map(|window| window.len());
    assert_eq!(window_len, Some(400));
    println!("   ✓ ADX(14): {:.2}", lock(&adx).last());
    println!("   ✓ BOOMPRO K/D: {:?}", lock(&boom).output());

    println!("\n=== E2E Test Passed ===");
}

#[test]
fn test_adx_rises_in_sustained_trend() {
    let mut adx = Adx::new(IntervalWindow::new(Interval::Hour1, 14));
    let candles: Vec<Candle> = (0..40)
        .map(|i| create_test_candle("BTCUSDT", i, 102 + 2 * i, 98 + 2 * i, 101 + 2 * i))
        .collect();
    replay(&mut adx, &candles);
    assert!(adx.last() > 40.0, "ADX {}", adx.last());
    assert!(adx.di_plus() > adx.di_minus());
}

#[test]
fn test_rsi_bounds_on_monotonic_prices() {
    let mut rising = Rsi::new(IntervalWindow::new(Interval::Hour1, 14));
    let mut falling = Rsi::new(IntervalWindow::new(Interval::Hour1, 14));
    for i in 0..60 {
        rising.update(100.0 + i as f64);
        falling.update(200.0 - i as f64);
        assert!((0.0..=100.0).contains(&rising.last()));
        assert!((0.0..=100.0).contains(&falling.last()));
    }
    assert!(rising.last() > 99.0);
    assert!(falling.last() < 1.0);
}

#[test]
fn test_crossover_and_crossunder_never_fire_together() {
    let mut boom = BoomPro::new(Interval::Hour1, BoomProConfig::default());
    let candles = SyntheticDataGenerator::new(3, "BTCUSDT").generate(
        MarketScenario::Volatile,
        300,
        Interval::Hour1,
    );

    let mut overs = 0;
    let mut unders = 0;
    for candle in &candles {
        boom.push_candle(candle);
        let over = crossover(boom.k(), boom.d()).last();
        let under = crossunder(boom.k(), boom.d()).last();
        assert!(!(over && under));
        overs += over as usize;
        unders += under as usize;
    }
    assert!(overs > 0 && unders > 0, "overs {} unders {}", overs, unders);
}

#[test]
fn test_unknown_symbol_is_not_found() {
    let mut session = MarketDataSession::default();
    session.subscribe("BTCUSDT");
    assert!(!session.add_candle(create_test_candle("ETHUSDT", 0, 11, 9, 10)));
    assert!(session.store("ETHUSDT").is_none());
    assert!(session
        .store("BTCUSDT")
        .and_then(|store| store.window(Interval::Hour1))
        .is_none());
}
