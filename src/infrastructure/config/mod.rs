//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Programmatic defaults
//! - YAML file loading
//! - Environment variable and command-line overrides
//! - Configuration validation

pub mod loader;

pub use loader::{
    AirtableOverrides, ConfigError, ConfigLoader, ConfigOverrides, GitHubOverrides,
    LoggingOverrides, SyncOverrides, DEFAULT_CONFIG_FILE, ENV_PREFIX,
};
