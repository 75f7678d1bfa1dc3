use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::indicators::{BoomProConfig, StochRsiConfig};
use crate::market_data::WindowLimits;
use crate::models::{Interval, IntervalWindow};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_NAME: &str = "barstream";
pub const ENV_PREFIX: &str = "BARSTREAM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub window: usize,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self { window: 14 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmiSettings {
    pub window: usize,
    pub adx_smoothing: usize,
}

impl Default for DmiSettings {
    fn default() -> Self {
        Self {
            window: 14,
            adx_smoothing: 14,
        }
    }
}

/// Runtime settings
///
/// Layered as: built-in defaults, then `barstream.toml` (or an explicit
/// file), then `BARSTREAM__SECTION__KEY` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub symbol: String,
    pub interval: Interval,
    pub window: WindowLimits,
    pub adx: WindowSettings,
    pub dmi: DmiSettings,
    pub stoch_rsi: StochRsiConfig,
    pub boom_pro: BoomProConfig,
    pub atr: WindowSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Interval::Hour1,
            window: WindowLimits::default(),
            adx: WindowSettings::default(),
            dmi: DmiSettings::default(),
            stoch_rsi: StochRsiConfig::default(),
            boom_pro: BoomProConfig::default(),
            atr: WindowSettings::default(),
        }
    }
}

impl Settings {
    /// Load `.env`, then build settings from `path` (required) or the
    /// optional default file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }
        Self::build(path, ENV_PREFIX)
    }

    fn build(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!("Settings: {:?}", settings);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("adx.window", self.adx.window),
            ("dmi.window", self.dmi.window),
            ("dmi.adx_smoothing", self.dmi.adx_smoothing),
            ("atr.window", self.atr.window),
            ("stoch_rsi.k_window", self.stoch_rsi.k_window),
            ("stoch_rsi.d_window", self.stoch_rsi.d_window),
            ("stoch_rsi.rsi_window", self.stoch_rsi.rsi_window),
            ("stoch_rsi.stoch_window", self.stoch_rsi.stoch_window),
            ("boom_pro.trigger", self.boom_pro.trigger),
            ("window.max_candles", self.window.max_candles),
            ("window.truncate_to", self.window.truncate_to),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, value)| *value == 0) {
            return Err(invalid(format!("{} must be positive", name)));
        }
        if self.window.truncate_to > self.window.max_candles {
            return Err(invalid(format!(
                "window.truncate_to ({}) exceeds window.max_candles ({})",
                self.window.truncate_to, self.window.max_candles
            )));
        }
        let periods = [
            ("boom_pro.lp_period", self.boom_pro.lp_period),
            ("boom_pro.lp_period2", self.boom_pro.lp_period2),
            ("boom_pro.hp_period", self.boom_pro.hp_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, value)| !(*value > 0.0)) {
            return Err(invalid(format!("{} must be positive", name)));
        }
        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn adx_window(&self) -> IntervalWindow {
        IntervalWindow::new(self.interval, self.adx.window)
    }

    pub fn dmi_window(&self) -> IntervalWindow {
        IntervalWindow::new(self.interval, self.dmi.window)
    }

    pub fn atr_window(&self) -> IntervalWindow {
        IntervalWindow::new(self.interval, self.atr.window)
    }
}

fn invalid(message: String) -> Error {
    Error::Config(config::ConfigError::Message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    // prefix nobody sets, so the environment never leaks into these tests
    const TEST_PREFIX: &str = "BARSTREAM_SETTINGS_TEST_UNSET";

    fn create_test_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.symbol, "BTCUSDT");
        assert_eq!(settings.interval, Interval::Hour1);
        assert_eq!(settings.window, WindowLimits::new(5_000, 100));
        assert_eq!(settings.dmi.adx_smoothing, 14);
        assert_eq!(settings.stoch_rsi, StochRsiConfig::default());
        assert_eq!(settings.boom_pro.trigger, 2);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_defaults_partially() {
        let file = create_test_config(
            r#"
symbol = "ETHUSDT"
interval = "4h"

[window]
max_candles = 1000

[boom_pro]
lp_period = 8.0
"#,
        );

        let settings = Settings::build(Some(file.path()), TEST_PREFIX).unwrap();
        assert_eq!(settings.symbol, "ETHUSDT");
        assert_eq!(settings.interval, Interval::Hour4);
        assert_eq!(settings.window.max_candles, 1000);
        assert_eq!(settings.window.truncate_to, 100);
        assert_eq!(settings.boom_pro.lp_period, 8.0);
        assert_eq!(settings.boom_pro.k2, 0.3);
        assert_eq!(settings.adx.window, 14);
    }

    #[test]
    fn test_environment_overrides_file() {
        let prefix = "BARSTREAM_SETTINGS_TEST_ENV";
        std::env::set_var(format!("{}__ADX__WINDOW", prefix), "21");
        let file = create_test_config("[adx]\nwindow = 7\n");

        let settings = Settings::build(Some(file.path()), prefix).unwrap();
        assert_eq!(settings.adx.window, 21);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::build(Some(Path::new("/nonexistent/barstream.toml")), TEST_PREFIX);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_window() {
        let file = create_test_config("[atr]\nwindow = 0\n");
        let err = Settings::build(Some(file.path()), TEST_PREFIX).unwrap_err();
        assert!(err.to_string().contains("atr.window"));
    }

    #[test]
    fn test_rejects_unknown_interval() {
        let file = create_test_config("interval = \"7m\"\n");
        assert!(Settings::build(Some(file.path()), TEST_PREFIX).is_err());
    }
}
