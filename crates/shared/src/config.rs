//! Application configuration management.

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Schedule computation settings.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Schedule computation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    /// Currency used when a scenario does not name one.
    #[serde(default)]
    pub default_currency: Currency,
    /// Post generated moves dated on or before the as-of date.
    #[serde(default = "default_auto_post")]
    pub auto_post: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_currency: Currency::default(),
            auto_post: default_auto_post(),
        }
    }
}

fn default_auto_post() -> bool {
    true
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "deprecia=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DEPRECIA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
