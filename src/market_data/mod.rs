// Market data module
// Candle windows per interval, the per-symbol store that fans out window
// updates to bound indicators, and bulk-history loading

pub mod history;
pub mod session;
pub mod store;
pub mod window;

pub use history::{load_csv, CandleHistory, InMemoryHistory};
pub use session::MarketDataSession;
pub use store::{lock, shared, ListenerId, MarketDataStore, Shared, WindowListener};
pub use window::{CandleWindow, WindowLimits};
