//! gitable CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use gitable::adapters::airtable::AirtableClient;
use gitable::adapters::github::GitHubClient;
use gitable::cli::{format_report, log_fatal, Cli};
use gitable::domain::models::Config;
use gitable::domain::ports::{IssueTracker, RecordStore};
use gitable::infrastructure::config::ConfigLoader;
use gitable::infrastructure::logging::LoggerImpl;
use gitable::services::{shutdown_signal, Reconciler, SyncDaemon, SyncDaemonConfig, SyncOptions};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref(), &cli.to_overrides())
        .context("Failed to load configuration")?;
    let _logger = LoggerImpl::init(&config.logging)?;

    // Logged here so the error reaches the file sink before the guard drops.
    sync(&config).await.inspect_err(|err| {
        log_fatal(err);
    })
}

async fn sync(config: &Config) -> Result<()> {
    let interval = config
        .sync
        .interval_duration()
        .context("Invalid sync interval")?;

    let tracker: Arc<dyn IssueTracker> =
        Arc::new(GitHubClient::from_config(&config.github, &config.rate_limit));
    let store: Arc<dyn RecordStore> = Arc::new(
        AirtableClient::from_config(&config.airtable, &config.rate_limit)
            .context("Failed to create Airtable client")?,
    );

    let reconciler = Reconciler::new(tracker, store, SyncOptions::from(&config.sync));
    let daemon = SyncDaemon::new(
        reconciler,
        SyncDaemonConfig::from_sync_config(&config.sync, interval),
    );

    if config.sync.once {
        let report = daemon.run_once().await.context("Sync run failed")?;
        println!("{}", format_report(&report));
        return Ok(());
    }

    let status = daemon
        .run_until(shutdown_signal())
        .await
        .context("Sync daemon stopped after a failed run")?;
    info!(
        runs = status.total_runs,
        failed = status.failed_runs,
        "sync daemon stopped"
    );
    Ok(())
}
