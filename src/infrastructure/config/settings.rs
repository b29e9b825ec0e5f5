//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; `CROSSEDGE_DATABASE` overrides
//! the database path.
//!
//! # Example
//!
//! ```no_run
//! use crossedge::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::application::batch::BatchSettings;
use crate::application::matcher::{CandidateMatcher, ScorerKind};
use crate::application::normalizer::{PlatformConfig, PriceNormalizer, PriceScale};
use crate::domain::Platform;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "CROSSEDGE_DATABASE";

/// Candidate matching settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MatchingConfig {
    /// Minimum similarity for an option pair to become a candidate.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default)]
    pub scorer: ScorerKind,
}

fn default_threshold() -> f64 {
    0.1
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            scorer: ScorerKind::default(),
        }
    }
}

/// Detection run settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Pairs priced and evaluated concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout for a single price lookup.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Close expired markets at the start of each run.
    #[serde(default = "default_true")]
    pub close_expired: bool,

    /// Refresh option matches from market matches before evaluating.
    #[serde(default)]
    pub rematch: bool,
}

fn default_concurrency() -> usize {
    num_cpus::get().max(1)
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            close_expired: true,
            rematch: false,
        }
    }
}

impl BatchConfig {
    #[must_use]
    pub fn settings(&self) -> BatchSettings {
        BatchSettings {
            concurrency: self.concurrency,
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            close_expired: self.close_expired,
            rematch: self.rematch,
        }
    }
}

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Path to SQLite database file.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    /// Per-platform price scale and fees, keyed by lowercase platform name.
    ///
    /// Defaults to Kalshi and Polymarket. A `[platforms]` table in the file
    /// replaces the defaults entirely. A platform missing here is rejected
    /// when its prices are first used.
    #[serde(default = "default_platforms")]
    pub platforms: HashMap<Platform, PlatformConfig>,
}

fn default_database_path() -> String {
    "crossedge.db".to_string()
}

/// Kalshi quotes in cents and charges `0.07 * p * (1 - p)` per contract;
/// Polymarket quotes fractions of a dollar without fees.
fn default_platforms() -> HashMap<Platform, PlatformConfig> {
    HashMap::from([
        (
            Platform::new("kalshi"),
            PlatformConfig {
                scale: PriceScale::Percent,
                fees: true,
                fee_coefficient: Some(Decimal::new(7, 2)),
            },
        ),
        (
            Platform::new("polymarket"),
            PlatformConfig {
                scale: PriceScale::Fraction,
                fees: false,
                fee_coefficient: None,
            },
        ),
    ])
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            logging: LoggingConfig::default(),
            matching: MatchingConfig::default(),
            batch: BatchConfig::default(),
            platforms: default_platforms(),
        }
    }
}

impl Config {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML is invalid or a value fails validation.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Defaults with environment overrides applied.
    ///
    /// # Errors
    /// Returns an error if an override fails validation.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(DATABASE_ENV) {
            if !path.trim().is_empty() {
                self.database = path;
            }
        }
    }

    /// Check value ranges.
    ///
    /// A fee-charging platform without a coefficient passes: only pairs on
    /// that platform fail, at evaluation time.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for the first invalid value.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if !(0.0..=1.0).contains(&self.matching.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "threshold",
                reason: "must be between 0 and 1".to_string(),
            }
            .into());
        }
        if self.batch.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "concurrency",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.batch.fetch_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_timeout_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if !self.logging.is_known_format() {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        for (platform, settings) in &self.platforms {
            if settings
                .fee_coefficient
                .is_some_and(|theta| theta.is_sign_negative() && !theta.is_zero())
            {
                return Err(ConfigError::InvalidValue {
                    field: "fee_coefficient",
                    reason: format!("{platform}: must be 0 or greater"),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Fee-charging platforms configured without a coefficient.
    #[must_use]
    pub fn platforms_missing_fee_coefficient(&self) -> Vec<&Platform> {
        let mut missing: Vec<&Platform> = self
            .platforms
            .iter()
            .filter(|(_, c)| c.fees && c.fee_coefficient.is_none())
            .map(|(p, _)| p)
            .collect();
        missing.sort();
        missing
    }

    #[must_use]
    pub fn normalizer(&self) -> PriceNormalizer {
        PriceNormalizer::new(self.platforms.clone())
    }

    #[must_use]
    pub fn matcher(&self) -> CandidateMatcher {
        CandidateMatcher::new(self.matching.scorer.build(), self.matching.threshold)
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }
}
