//! Engine configuration.
//!
//! The solvency constants (threshold, precision, minimum health factor) are
//! fixed. What an operator may tune:
//! - Oracle staleness timeout
//! - Liquidation bonus percentage
//! - Capacity of the in-memory event log

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::constants::{
    DEFAULT_MAX_EVENTS, LIQUIDATION_BONUS, LIQUIDATION_PRECISION, ORACLE_TIMEOUT_SECS,
};

// ═══════════════════════════════════════════════════════════════════════════════
// ENGINE CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Tunable engine parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum age of a price round in seconds
    pub oracle_timeout_secs: u64,

    /// Bonus paid to liquidators, in percent of the covered collateral
    pub liquidation_bonus: u128,

    /// Events retained before the oldest are dropped
    pub max_events: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            oracle_timeout_secs: ORACLE_TIMEOUT_SECS,
            liquidation_bonus: LIQUIDATION_BONUS,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl EngineConfig {
    /// Override the oracle timeout
    pub fn with_oracle_timeout(mut self, secs: u64) -> Self {
        self.oracle_timeout_secs = secs;
        self
    }

    /// Override the liquidation bonus
    pub fn with_liquidation_bonus(mut self, bonus: u128) -> Self {
        self.liquidation_bonus = bonus;
        self
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
            }
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Defaults overridden by `DSC_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = env_parse("DSC_ORACLE_TIMEOUT_SECS") {
            config.oracle_timeout_secs = secs;
        }

        if let Some(bonus) = env_parse("DSC_LIQUIDATION_BONUS") {
            config.liquidation_bonus = bonus;
        }

        if let Some(max) = env_parse("DSC_MAX_EVENTS") {
            config.max_events = max;
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oracle_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "Oracle timeout must be greater than 0".into(),
            ));
        }

        if self.liquidation_bonus >= LIQUIDATION_PRECISION {
            return Err(ConfigError::Validation(format!(
                "Liquidation bonus must be below {}%",
                LIQUIDATION_PRECISION
            )));
        }

        if self.max_events == 0 {
            return Err(ConfigError::Validation(
                "Event log capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Parse error
    Parse(String),
    /// Serialization error
    Serialize(String),
    /// Validation error
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(err: ConfigError) -> Self {
        crate::error::Error::Configuration(err.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════
