use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Main configuration structure for gitable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// GitHub credentials and endpoint
    #[serde(default)]
    pub github: GitHubConfig,

    /// Airtable credentials and target table
    #[serde(default)]
    pub airtable: AirtableConfig,

    /// Sync behaviour
    #[serde(default)]
    pub sync: SyncConfig,

    /// Rate limiting and retry behaviour of the HTTP clients
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// Personal access token
    #[serde(default)]
    pub token: String,

    /// REST API base URL
    #[serde(default = "default_github_api_url")]
    pub api_url: String,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_github_api_url(),
        }
    }
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &redact(&self.token))
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Airtable configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AirtableConfig {
    /// API key or personal access token
    #[serde(default)]
    pub api_key: String,

    /// Base id (`app...`)
    #[serde(default)]
    pub base_id: String,

    /// Table name or id
    #[serde(default)]
    pub table: String,

    /// Optional view used to restrict the listed rows
    #[serde(default)]
    pub view: Option<String>,

    /// REST API base URL
    #[serde(default = "default_airtable_api_url")]
    pub api_url: String,

    /// Ask Airtable to coerce values (e.g. create missing select options)
    #[serde(default)]
    pub typecast: bool,
}

fn default_airtable_api_url() -> String {
    "https://api.airtable.com/v0".to_string()
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_id: String::new(),
            table: String::new(),
            view: None,
            api_url: default_airtable_api_url(),
            typecast: false,
        }
    }
}

impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("view", &self.view)
            .field("api_url", &self.api_url)
            .field("typecast", &self.typecast)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Sync behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncConfig {
    /// Update interval in humantime syntax (`5ms`, `10s`, `1m`, `3h`)
    #[serde(default = "default_interval")]
    pub interval: String,

    /// Index every issue of the user's (and orgs') repositories
    #[serde(default)]
    pub autofill: bool,

    /// Index recently updated issues of watched repositories
    #[serde(default)]
    pub watch: bool,

    /// Organisations included by autofill, in addition to the current user
    #[serde(default)]
    pub orgs: Vec<String>,

    /// Write references as `owner/repo#N - title`
    #[serde(default)]
    pub verbose_keys: bool,

    /// Run a single sync and exit
    #[serde(default)]
    pub once: bool,

    /// Lower bound for the watch sweep when the table has no timestamps
    #[serde(default)]
    pub watch_since: Option<DateTime<Utc>>,

    /// Keep the daemon running after a failed run
    #[serde(default)]
    pub keep_going: bool,

    /// Run immediately on startup instead of waiting one interval
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_interval() -> String {
    "1m".to_string()
}

const fn default_true() -> bool {
    true
}

impl SyncConfig {
    /// Parse the configured interval.
    pub fn interval_duration(&self) -> Result<Duration, humantime::DurationError> {
        humantime::parse_duration(&self.interval)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            autofill: false,
            watch: false,
            orgs: vec![],
            verbose_keys: false,
            once: false,
            watch_since: None,
            keep_going: false,
            run_on_startup: default_true(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Fixed delay before retrying a rate-limited Airtable request
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Retries per request before giving up; `null` retries forever
    #[serde(default = "default_max_retries")]
    pub max_retries: Option<u32>,

    /// Client-side budget for GitHub requests
    #[serde(default = "default_github_requests_per_hour")]
    pub github_requests_per_hour: u32,

    /// Client-side budget for Airtable requests
    #[serde(default = "default_airtable_requests_per_second")]
    pub airtable_requests_per_second: u32,
}

const fn default_retry_delay_ms() -> u64 {
    5_000
}

#[allow(clippy::unnecessary_wraps)]
const fn default_max_retries() -> Option<u32> {
    Some(12)
}

const fn default_github_requests_per_hour() -> u32 {
    5_000
}

const fn default_airtable_requests_per_second() -> u32 {
    5
}

impl RateLimitConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            max_retries: default_max_retries(),
            github_requests_per_hour: default_github_requests_per_hour(),
            airtable_requests_per_second: default_airtable_requests_per_second(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Stdout format
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for JSON log files (stdout only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}
