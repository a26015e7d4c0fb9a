use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::Serialize;
use thiserror::Error;

use crate::adapters::airtable::client::is_valid_id;
use crate::domain::models::config::{Config, LogFormat};

/// Config file read from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "gitable.yaml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "GITABLE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GitHub token is missing. Set GITHUB_TOKEN or github.token")]
    MissingGitHubToken,

    #[error("Airtable API key is missing. Set AIRTABLE_APIKEY or airtable.api_key")]
    MissingAirtableKey,

    #[error("Invalid Airtable base id: '{0}'. Expected 'app' followed by 14 alphanumerics")]
    InvalidBaseId(String),

    #[error("Airtable table is missing. Set AIRTABLE_TABLE or airtable.table")]
    MissingTable,

    #[error("Invalid interval '{0}': {1}")]
    InvalidInterval(String, String),

    #[error("Interval must be greater than zero")]
    ZeroInterval,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid retry_delay_ms: 0. Must be positive")]
    ZeroRetryDelay,
}

/// Values given on the command line. Unset fields leave the lower layers
/// untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    pub github: GitHubOverrides,
    pub airtable: AirtableOverrides,
    pub sync: SyncOverrides,
    pub logging: LoggingOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GitHubOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AirtableOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autofill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orgs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_keys: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub once: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch_since: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_going: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoggingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. YAML file: `path` if given, else `gitable.yaml` (optional)
    /// 3. Environment variables (`GITABLE_*`, `__` separates sections)
    /// 4. Command-line overrides
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
        if let Some(path) = path {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
        }

        let config: Config = Self::figment(path)
            .merge(Serialized::defaults(overrides))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Defaults, YAML file and environment, without command-line values.
    pub fn figment(path: Option<&Path>) -> Figment {
        let file = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.github.token.trim().is_empty() {
            return Err(ConfigError::MissingGitHubToken);
        }

        if config.airtable.api_key.trim().is_empty() {
            return Err(ConfigError::MissingAirtableKey);
        }

        if !is_valid_id(&config.airtable.base_id, "app") {
            return Err(ConfigError::InvalidBaseId(config.airtable.base_id.clone()));
        }

        if config.airtable.table.trim().is_empty() {
            return Err(ConfigError::MissingTable);
        }

        let interval = config
            .sync
            .interval_duration()
            .map_err(|e| ConfigError::InvalidInterval(config.sync.interval.clone(), e.to_string()))?;
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.rate_limit.retry_delay_ms == 0 {
            return Err(ConfigError::ZeroRetryDelay);
        }

        Ok(())
    }
}
