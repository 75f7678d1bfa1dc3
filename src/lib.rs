// Core modules
pub mod backtest;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod models;
pub mod settings;

// Re-export commonly used types
pub use error::{Error, Result};
pub use indicators::Indicator;
pub use market_data::{CandleWindow, MarketDataSession, MarketDataStore};
pub use models::*;
pub use settings::Settings;
