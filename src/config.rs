//! Configuration management for Cultura
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{CulturaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Cultura
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Engagement simulator tuning
    #[serde(default)]
    pub simulator: SimulatorConfig,
    /// Persona catalog source
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engagement simulator configuration
///
/// Tick period and activation probability are tuning knobs; different
/// screens of the app used different values, none of them load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Period between scheduler ticks (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Chance that a tick emits a message rather than only marking the
    /// chosen persona active (0.0-1.0)
    #[serde(default = "default_activation_probability")]
    pub activation_probability: f64,

    /// Chance that a tick sends one other online persona offline (0.0-1.0)
    #[serde(default = "default_presence_churn_probability")]
    pub presence_churn_probability: f64,

    /// Lower bound of the simulated typing delay before a reply (milliseconds)
    #[serde(default = "default_reply_delay_min_ms")]
    pub reply_delay_min_ms: u64,

    /// Upper bound of the simulated typing delay before a reply (milliseconds)
    #[serde(default = "default_reply_delay_max_ms")]
    pub reply_delay_max_ms: u64,

    /// Never send the same persona message twice in a row on one thread
    #[serde(default)]
    pub avoid_immediate_repeat: bool,

    /// RNG seed; `None` draws one from the OS
    #[serde(default)]
    pub seed: Option<u64>,

    /// Capacity of the store event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_tick_interval_ms() -> u64 {
    4_000
}

fn default_activation_probability() -> f64 {
    0.4
}

fn default_presence_churn_probability() -> f64 {
    0.1
}

fn default_reply_delay_min_ms() -> u64 {
    2_000
}

fn default_reply_delay_max_ms() -> u64 {
    5_000
}

fn default_event_buffer() -> usize {
    crate::store::DEFAULT_EVENT_BUFFER
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            activation_probability: default_activation_probability(),
            presence_churn_probability: default_presence_churn_probability(),
            reply_delay_min_ms: default_reply_delay_min_ms(),
            reply_delay_max_ms: default_reply_delay_max_ms(),
            avoid_immediate_repeat: false,
            seed: None,
            event_buffer: default_event_buffer(),
        }
    }
}

/// Persona catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// YAML file with personas; the built-in seed is used when unset
    #[serde(default)]
    pub path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json_format: bool,

    /// Also append logs to this file
    #[serde(default)]
    pub file_path: Option<String>,
}

fn default_log_level() -> String {
    "cultura=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CulturaError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| CulturaError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(interval) = std::env::var("CULTURA_TICK_INTERVAL_MS") {
            if let Ok(value) = interval.parse() {
                self.simulator.tick_interval_ms = value;
            } else {
                tracing::warn!("Invalid CULTURA_TICK_INTERVAL_MS: {}", interval);
            }
        }

        if let Ok(probability) = std::env::var("CULTURA_ACTIVATION_PROBABILITY") {
            if let Ok(value) = probability.parse() {
                self.simulator.activation_probability = value;
            } else {
                tracing::warn!("Invalid CULTURA_ACTIVATION_PROBABILITY: {}", probability);
            }
        }

        if let Ok(seed) = std::env::var("CULTURA_SEED") {
            if let Ok(value) = seed.parse() {
                self.simulator.seed = Some(value);
            } else {
                tracing::warn!("Invalid CULTURA_SEED: {}", seed);
            }
        }

        if let Ok(path) = std::env::var("CULTURA_CATALOG_PATH") {
            self.catalog.path = Some(path);
        }

        if let Ok(level) = std::env::var("CULTURA_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(seed) = cli.seed {
            self.simulator.seed = Some(seed);
        }

        if let Some(path) = &cli.catalog {
            self.catalog.path = Some(path.clone());
        }

        if cli.verbose {
            self.logging.level = "cultura=debug".to_string();
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `CulturaError::Config` if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulator;

        if sim.tick_interval_ms == 0 {
            return Err(CulturaError::Config(
                "simulator.tick_interval_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if !(0.0..=1.0).contains(&sim.activation_probability) {
            return Err(CulturaError::Config(
                "simulator.activation_probability must be between 0.0 and 1.0".to_string(),
            )
            .into());
        }

        if !(0.0..=1.0).contains(&sim.presence_churn_probability) {
            return Err(CulturaError::Config(
                "simulator.presence_churn_probability must be between 0.0 and 1.0".to_string(),
            )
            .into());
        }

        if sim.reply_delay_min_ms > sim.reply_delay_max_ms {
            return Err(CulturaError::Config(
                "simulator.reply_delay_min_ms must not exceed reply_delay_max_ms".to_string(),
            )
            .into());
        }

        if sim.event_buffer == 0 {
            return Err(CulturaError::Config(
                "simulator.event_buffer must be greater than 0".to_string(),
            )
            .into());
        }

        if self.logging.level.trim().is_empty() {
            return Err(
                CulturaError::Config("logging.level cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}
