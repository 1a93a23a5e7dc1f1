//! Tunable campaign settings.
//!
//! Fixed balance numbers live in `constants`. The knobs here are the ones
//! tooling varies between runs.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    AMBUSH_CHANCE, CAPTIVITY_DAYS, ENEMY_TURN_DELAY_MS, MARKET_OFFER_SIZE, MESSAGE_LOG_LEN,
    ORACLE_TIMEOUT_MS,
};
use crate::items::market_catalog;

/// Errors raised when campaign configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("market size {size} exceeds the {catalog}-item catalog")]
    MarketTooLarge { size: usize, catalog: usize },
    #[error("invalid campaign config JSON: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Per-hour chance that travel is cut short by bandits.
    #[serde(default = "CampaignConfig::default_ambush_chance")]
    pub ambush_chance: f64,
    #[serde(default = "CampaignConfig::default_market_size")]
    pub market_size: usize,
    #[serde(default = "CampaignConfig::default_message_log_len")]
    pub message_log_len: usize,
    #[serde(default = "CampaignConfig::default_captivity_days")]
    pub captivity_days: u32,
    #[serde(default = "CampaignConfig::default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,
    /// Advisory pause before the enemy acts; only meaningful when deferred.
    #[serde(default = "CampaignConfig::default_enemy_turn_delay_ms")]
    pub enemy_turn_delay_ms: u64,
    /// Leave the enemy turn for an explicit `EnemyTurn` intent instead of
    /// running it right after the player's attack.
    #[serde(default)]
    pub defer_enemy_turn: bool,
}

impl CampaignConfig {
    const fn default_ambush_chance() -> f64 {
        AMBUSH_CHANCE
    }

    const fn default_market_size() -> usize {
        MARKET_OFFER_SIZE
    }

    const fn default_message_log_len() -> usize {
        MESSAGE_LOG_LEN
    }

    const fn default_captivity_days() -> u32 {
        CAPTIVITY_DAYS
    }

    const fn default_oracle_timeout_ms() -> u64 {
        ORACLE_TIMEOUT_MS
    }

    const fn default_enemy_turn_delay_ms() -> u64 {
        ENEMY_TURN_DELAY_MS
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// `Parse` for bad JSON, otherwise whatever [`Self::validate`] reports.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.ambush_chance) {
            return Err(ConfigError::RangeViolation {
                field: "ambush_chance",
                min: 0.0,
                max: 1.0,
                value: self.ambush_chance,
            });
        }
        let catalog = market_catalog().len();
        if self.market_size > catalog {
            return Err(ConfigError::MarketTooLarge {
                size: self.market_size,
                catalog,
            });
        }
        let log_len = u64::try_from(self.message_log_len).unwrap_or(u64::MAX);
        Self::at_least("message_log_len", 1, log_len)?;
        Self::at_least("captivity_days", 1, u64::from(self.captivity_days))?;
        Self::at_least("oracle_timeout_ms", 1, self.oracle_timeout_ms)?;
        Ok(())
    }

    const fn at_least(field: &'static str, min: u64, value: u64) -> Result<(), ConfigError> {
        if value < min {
            return Err(ConfigError::MinViolation { field, min, value });
        }
        Ok(())
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            ambush_chance: Self::default_ambush_chance(),
            market_size: Self::default_market_size(),
            message_log_len: Self::default_message_log_len(),
            captivity_days: Self::default_captivity_days(),
            oracle_timeout_ms: Self::default_oracle_timeout_ms(),
            enemy_turn_delay_ms: Self::default_enemy_turn_delay_ms(),
            defer_enemy_turn: false,
        }
    }
}
