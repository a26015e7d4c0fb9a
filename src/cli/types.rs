//! CLI type definitions
//!
//! This module contains the clap structure that defines the CLI interface.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};

use crate::domain::models::LogFormat;
use crate::infrastructure::config::{
    AirtableOverrides, ConfigOverrides, GitHubOverrides, LoggingOverrides, SyncOverrides,
};

#[derive(Parser, Debug)]
#[command(name = "gitable")]
#[command(about = "Mirror GitHub issues and pull requests into an Airtable table", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Time between runs (e.g. 5ms, 10s, 1m, 3h)
    #[arg(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Add every issue of your repositories (and of --orgs) to the table
    #[arg(long)]
    pub autofill: bool,

    /// Add recently updated issues of watched repositories to the table
    #[arg(long)]
    pub watch: bool,

    /// Oldest update considered by --watch when the table has no timestamps (RFC 3339)
    #[arg(long, value_name = "TIMESTAMP")]
    pub watch_since: Option<DateTime<Utc>>,

    /// Run a single sync and exit
    #[arg(long)]
    pub once: bool,

    /// Keep running after a failed sync
    #[arg(long)]
    pub keep_going: bool,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Organisations whose repositories autofill includes
    #[arg(long, value_delimiter = ',', value_name = "ORG")]
    pub orgs: Vec<String>,

    /// Airtable API key
    #[arg(long = "airtable-apikey", env = "AIRTABLE_APIKEY", hide_env_values = true)]
    pub airtable_api_key: Option<String>,

    /// Airtable base id (app...)
    #[arg(long = "airtable-baseid", env = "AIRTABLE_BASEID")]
    pub airtable_base_id: Option<String>,

    /// Airtable table name
    #[arg(long, env = "AIRTABLE_TABLE")]
    pub airtable_table: Option<String>,

    /// Only list rows visible in this Airtable view
    #[arg(long)]
    pub airtable_view: Option<String>,

    /// Write references as "owner/repo#N - title"
    #[arg(long)]
    pub verbose_keys: bool,

    /// Configuration file (defaults to ./gitable.yaml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormatArg>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Pretty,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Pretty => Self::Pretty,
        }
    }
}

impl Cli {
    /// Command-line values as the top configuration layer.
    pub fn to_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            github: GitHubOverrides {
                token: self.github_token.clone(),
            },
            airtable: AirtableOverrides {
                api_key: self.airtable_api_key.clone(),
                base_id: self.airtable_base_id.clone(),
                table: self.airtable_table.clone(),
                view: self.airtable_view.clone(),
            },
            sync: SyncOverrides {
                interval: self.interval.clone(),
                autofill: self.autofill.then_some(true),
                watch: self.watch.then_some(true),
                orgs: (!self.orgs.is_empty()).then(|| self.orgs.clone()),
                verbose_keys: self.verbose_keys.then_some(true),
                once: self.once.then_some(true),
                watch_since: self.watch_since,
                keep_going: self.keep_going.then_some(true),
            },
            logging: LoggingOverrides {
                level: self.debug.then(|| "debug".to_string()),
                format: self.log_format.map(LogFormat::from),
            },
        }
    }
}
