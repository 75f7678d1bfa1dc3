use thiserror::Error;

use crate::models::Interval;

/// Errors raised at the loading and configuration boundary.
///
/// The indicator pipeline itself never fails; these only come from reading
/// history, parsing input or building settings.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown interval: {0}")]
    InvalidInterval(String),

    #[error("invalid candle: {0}")]
    InvalidCandle(String),

    #[error("no history for {symbol} {interval}")]
    HistoryNotFound { symbol: String, interval: Interval },
}

pub type Result<T> = std::result::Result<T, Error>;
