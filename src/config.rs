//! Configuration loading and typed config structures for the exchange.
//!
//! Configuration is a YAML document with three optional sections:
//!
//! ```yaml
//! simulation:
//!   ticks: 100
//!   reset_books_each_tick: false
//!   history_len: 64
//!   book_capacity: 1024
//! pricing:
//!   increase_base: 0.02
//!   increase_rate: 0.01
//!   decrease_base: 0.01
//!   decrease_rate: 0.01
//!   price_floor: 0.00001
//!   shortage_threshold: 0.8
//! logging:
//!   level: info
//!   json: false
//! ```
//!
//! Every field has a default, so an empty document is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml { source: serde_yml::Error },

    /// Parsed, but a value is out of range.
    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level exchange configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Yaml`]
    /// if it is not valid YAML, [`ConfigError::Invalid`] if a value is out of
    /// range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as all defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the market cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing.validate()
    }
}

/// Tick driver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Ticks the demo binary runs.
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Drop every resting order at the start of each tick.
    #[serde(default)]
    pub reset_books_each_tick: bool,

    /// Per-tick market snapshots kept in history.
    #[serde(default = "default_history_len")]
    pub history_len: usize,

    /// Orders pre-allocated per order book.
    #[serde(default = "default_book_capacity")]
    pub book_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            reset_books_each_tick: false,
            history_len: default_history_len(),
            book_capacity: default_book_capacity(),
        }
    }
}

/// Price adjustment applied to goods that did not clear in a tick.
///
/// With `sd` the supply/demand ratio and `p` the price:
/// - `sd < 1`: `p += increase_base + p * increase_rate`
/// - `sd > 1`: `p -= decrease_base + p * decrease_rate`, floored at `price_floor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_increase_base")]
    pub increase_base: f64,

    #[serde(default = "default_increase_rate")]
    pub increase_rate: f64,

    #[serde(default = "default_decrease_base")]
    pub decrease_base: f64,

    #[serde(default = "default_decrease_rate")]
    pub decrease_rate: f64,

    /// Lowest price a decrease can reach.
    #[serde(default = "default_price_floor")]
    pub price_floor: f64,

    /// Shortage fraction above which a good counts as chronically short.
    #[serde(default = "default_shortage_threshold")]
    pub shortage_threshold: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            increase_base: default_increase_base(),
            increase_rate: default_increase_rate(),
            decrease_base: default_decrease_base(),
            decrease_rate: default_decrease_rate(),
            price_floor: default_price_floor(),
            shortage_threshold: default_shortage_threshold(),
        }
    }
}

impl PricingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("increase_base", self.increase_base),
            ("increase_rate", self.increase_rate),
            ("decrease_base", self.decrease_base),
            ("decrease_rate", self.decrease_rate),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("pricing.{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        if self.decrease_rate >= 1.0 {
            return Err(ConfigError::Invalid {
                reason: format!("pricing.decrease_rate must be below 1, got {}", self.decrease_rate),
            });
        }
        if !self.price_floor.is_finite() || self.price_floor <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!("pricing.price_floor must be positive, got {}", self.price_floor),
            });
        }
        if !self.shortage_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                reason: "pricing.shortage_threshold must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_ticks() -> u64 {
    100
}

fn default_history_len() -> usize {
    64
}

fn default_book_capacity() -> usize {
    1024
}

fn default_increase_base() -> f64 {
    0.02
}

fn default_increase_rate() -> f64 {
    0.01
}

fn default_decrease_base() -> f64 {
    0.01
}

fn default_decrease_rate() -> f64 {
    0.01
}

fn default_price_floor() -> f64 {
    0.00001
}

fn default_shortage_threshold() -> f64 {
    0.8
}

fn default_log_level() -> String {
    "info".to_string()
}
