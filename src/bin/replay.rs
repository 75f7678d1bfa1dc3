use anyhow::{bail, Context, Result};
use barstream::backtest::{MarketScenario, SyntheticDataGenerator};
use barstream::indicators::{
    crossover, crossunder, Adx, Atrp, BoomPro, Dmi, Indicator, Rsi, Series, StochRsi,
};
use barstream::market_data::{lock, load_csv, shared, InMemoryHistory, MarketDataSession};
use barstream::models::{Candle, Interval, IntervalWindow};
use barstream::Settings;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Replay candles through the indicator pipeline
#[derive(Debug, Parser)]
#[command(name = "replay", version, about)]
struct Args {
    /// CSV file with timestamp,open,high,low,close,volume rows
    #[arg(long, conflicts_with = "synthetic")]
    csv: Option<PathBuf>,

    /// Synthetic scenario: uptrend, downtrend, sideways or volatile
    #[arg(long, default_value = "uptrend")]
    synthetic: MarketScenario,

    /// Symbol, overrides the configured one
    #[arg(long)]
    symbol: Option<String>,

    /// Interval such as 1m, 15m, 1h, overrides the configured one
    #[arg(long)]
    interval: Option<Interval>,

    /// Number of synthetic bars
    #[arg(long, default_value_t = 500)]
    bars: usize,

    /// RNG seed for synthetic bars
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Settings file (defaults to ./barstream.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print one JSON object per live bar instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("barstream=info")),
        )
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    if let Some(symbol) = &args.symbol {
        settings.symbol = symbol.clone();
    }
    if let Some(interval) = args.interval {
        settings.interval = interval;
    }
    let symbol = settings.symbol.clone();
    let interval = settings.interval;

    let candles = match &args.csv {
        Some(path) => load_csv(path, &symbol, interval)
            .with_context(|| format!("reading candles from {}", path.display()))?,
        None => SyntheticDataGenerator::new(args.seed, symbol.as_str()).generate(
            args.synthetic,
            args.bars,
            interval,
        ),
    };
    if candles.len() < 2 {
        bail!("need at least 2 candles to replay, got {}", candles.len());
    }

    let split = candles.len() / 2;
    let (warm_up, live) = candles.split_at(split);
    tracing::info!(
        "Replaying {} {}: {} warm-up bars, {} live bars",
        symbol,
        interval,
        warm_up.len(),
        live.len()
    );

    let history: InMemoryHistory = warm_up.iter().cloned().collect();
    let mut session = MarketDataSession::new(settings.window);
    session.subscribe(&symbol);
    let missing = session.warm_up(&history, &[interval]);
    if !missing.is_empty() {
        bail!("no warm-up history for {:?}", missing);
    }

    let adx = shared(Adx::new(settings.adx_window()));
    let dmi = shared(Dmi::new(settings.dmi_window(), settings.dmi.adx_smoothing));
    let atrp = shared(Atrp::new(settings.atr_window()));
    let rsi = shared(Rsi::new(IntervalWindow::new(interval, settings.stoch_rsi.rsi_window)));
    let stoch_rsi = shared(StochRsi::new(interval, settings.stoch_rsi));
    let boom_pro = shared(BoomPro::new(interval, settings.boom_pro));

    let store = session
        .store_mut(&symbol)
        .context("store missing after subscribe")?;

    if let Some(window) = store.window(interval) {
        lock(&adx).initialize(window);
        lock(&dmi).initialize(window);
        lock(&atrp).initialize(window);
        lock(&rsi).initialize(window);
        lock(&stoch_rsi).initialize(window);
        lock(&boom_pro).initialize(window);
    }

    store.bind(adx.clone());
    store.bind(atrp.clone());
    store.bind(rsi.clone());
    store.bind(stoch_rsi.clone());
    store.bind(boom_pro.clone());
    store.bind_with(dmi.clone(), |value| {
        tracing::debug!(
            "DMI +DI {:.2} -DI {:.2} ADX {:.2}",
            value.di_plus,
            value.di_minus,
            value.adx
        );
    });

    if !args.json {
        println!(
            "{:<20} {:>12} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}  signals",
            "time", "close", "ADX", "DMI.ADX", "ATR%", "RSI", "SRSI.K", "BOOM.K", "BOOM.D"
        );
        println!("{}", "─".repeat(110));
    }

    let mut crossings = 0;
    for candle in live {
        session.add_candle(candle.clone());

        let signals = signals(&lock(&stoch_rsi), &lock(&boom_pro));
        crossings += signals.len();

        let boom = lock(&boom_pro).output();
        if args.json {
            let row = serde_json::json!({
                "start_time": candle.start_time,
                "close": candle.close,
                "adx": lock(&adx).last(),
                "dmi": lock(&dmi).output(),
                "atrp": lock(&atrp).last(),
                "rsi": lock(&rsi).last(),
                "stoch_rsi": lock(&stoch_rsi).output(),
                "boom_pro": boom,
                "signals": signals,
            });
            println!("{}", row);
            continue;
        }

        let values = [
            lock(&adx).last(),
            lock(&dmi).output().adx,
            lock(&atrp).last(),
            lock(&rsi).last(),
            lock(&stoch_rsi).last_k(),
            boom.k,
            boom.d,
        ];
        print_row(candle, &values, &signals);
    }

    if !args.json {
        println!("{}", "─".repeat(110));
        println!(
            "{} live bars, {} crossovers/crossunders",
            live.len(),
            crossings
        );
    }
    tracing::info!("Replay finished: {} crossovers/crossunders", crossings);
    Ok(())
}

fn signals(stoch_rsi: &StochRsi, boom_pro: &BoomPro) -> Vec<&'static str> {
    let mut signals = Vec::new();
    if crossover(stoch_rsi.k(), stoch_rsi.d()).last() {
        signals.push("STOCHRSI K>D");
    }
    if crossunder(stoch_rsi.k(), stoch_rsi.d()).last() {
        signals.push("STOCHRSI K<D");
    }
    if crossover(boom_pro.k(), boom_pro.d()).last() {
        signals.push("BOOMPRO K>D");
    }
    if crossunder(boom_pro.k(), boom_pro.d()).last() {
        signals.push("BOOMPRO K<D");
    }
    signals
}

fn print_row(candle: &Candle, values: &[f64], signals: &[&str]) {
    let mut line = format!(
        "{:<20} {:>12.4}",
        candle.start_time.format("%Y-%m-%d %H:%M"),
        candle.close_f64()
    );
    for value in values {
        line.push_str(&format!(" {:>8.2}", value));
    }
    if !signals.is_empty() {
        line.push_str("  ");
        line.push_str(&signals.join(", "));
    }
    println!("{}", line);
}
