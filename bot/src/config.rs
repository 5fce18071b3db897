use fortuna_execution::{BiasConfig, BiasConfigError};
use fortuna_types::casino::STARTING_BALANCE;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};
use thiserror::Error;
use tracing::Level;

fn default_log_level() -> String {
    "info".to_string()
}

fn default_store() -> String {
    "players.json".to_string()
}

fn default_starting_balance() -> u64 {
    STARTING_BALANCE
}

/// Configuration for the bot, read from YAML.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Path of the JSON player store.
    #[serde(default = "default_store")]
    pub store: String,
    #[serde(default = "default_starting_balance")]
    pub starting_balance: u64,
    #[serde(default)]
    pub deterministic_seed: Option<u64>,

    /// Bias model tuning; missing fields keep the reference values.
    #[serde(default)]
    pub bias: BiasConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            store: default_store(),
            starting_balance: default_starting_balance(),
            deterministic_seed: None,
            bias: BiasConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("invalid bias configuration: {0}")]
    InvalidBias(#[from] BiasConfigError),
}

#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub log_level: Level,
    pub store: PathBuf,
    pub starting_balance: u64,
    pub deterministic_seed: Option<u64>,
    pub bias: BiasConfig,
}

fn ensure_nonzero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

impl Config {
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        ensure_nonzero("starting_balance", self.starting_balance)?;
        if self.store.trim().is_empty() {
            return Err(ConfigError::Empty { field: "store" });
        }
        self.bias.validate()?;

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        Ok(ValidatedConfig {
            log_level,
            store: PathBuf::from(self.store),
            starting_balance: self.starting_balance,
            deterministic_seed: self.deterministic_seed,
            bias: self.bias,
        })
    }
}
