//! gitable - GitHub to Airtable issue sync
//!
//! gitable mirrors the state of GitHub issues and pull requests into the
//! rows of an Airtable table, keyed by `owner/repo#number` references. It
//! runs once or on a fixed interval, refreshing the rows already in the
//! table and optionally adding issues discovered in the user's, the
//! organisations' or the watched repositories.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and the port traits
//! - **Adapter Layer** (`adapters`): GitHub and Airtable HTTP clients
//! - **Service Layer** (`services`): Discovery, mapping, reconciliation and the daemon
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gitable::{AirtableClient, GitHubClient, Reconciler, SyncOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let tracker = Arc::new(GitHubClient::new(token));
//!     let store = Arc::new(AirtableClient::new(key, AIRTABLE_API_BASE, base, "Issues", 5)?);
//!     let report = Reconciler::new(tracker, store, SyncOptions::default()).run().await?;
//!     println!("{report:?}");
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::airtable::AirtableClient;
pub use adapters::github::GitHubClient;
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, FieldSet, Reference, RemoteIssue, TableRow};
pub use domain::ports::{IssueTracker, RecordStore};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Reconciler, RunReport, SyncDaemon, SyncOptions};
