//! Sync daemon.
//!
//! Drives the [`Reconciler`] either once or on a fixed interval until a
//! shutdown signal arrives.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::domain::errors::DomainResult;
use crate::domain::models::SyncConfig;
use crate::services::reconciler::{Reconciler, RunReport};

/// Configuration for the sync daemon.
#[derive(Debug, Clone)]
pub struct SyncDaemonConfig {
    /// Interval between runs.
    pub interval: Duration,
    /// Whether to run immediately instead of after the first interval.
    pub run_on_startup: bool,
    /// Log failed runs and carry on instead of stopping.
    pub keep_going: bool,
}

impl Default for SyncDaemonConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            run_on_startup: true,
            keep_going: false,
        }
    }
}

impl SyncDaemonConfig {
    pub fn from_sync_config(sync: &SyncConfig, interval: Duration) -> Self {
        Self {
            interval,
            run_on_startup: sync.run_on_startup,
            keep_going: sync.keep_going,
        }
    }
}

/// Counters accumulated over the daemon's lifetime.
#[derive(Debug, Clone, Default)]
pub struct DaemonStatus {
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    /// Report of the last successful run.
    pub last_report: Option<RunReport>,
}

/// Fixed-interval driver around a [`Reconciler`].
pub struct SyncDaemon {
    reconciler: Reconciler,
    config: SyncDaemonConfig,
}

impl SyncDaemon {
    pub fn new(reconciler: Reconciler, config: SyncDaemonConfig) -> Self {
        Self { reconciler, config }
    }

    /// Execute a single run.
    pub async fn run_once(&self) -> DomainResult<RunReport> {
        let start = Instant::now();
        let report = self.reconciler.run().await?;
        info!(
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "run completed"
        );
        Ok(report)
    }

    /// Run on the configured interval until `shutdown` resolves.
    ///
    /// Runs never overlap: ticks missed while a run is in progress are
    /// skipped. `shutdown` is also raced against the in-flight run, whose
    /// partial writes are kept. A failed run ends the loop with its error
    /// unless `keep_going` is set.
    pub async fn run_until<F>(&self, shutdown: F) -> DomainResult<DaemonStatus>
    where
        F: Future<Output = ()>,
    {
        let mut status = DaemonStatus::default();
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        if !self.config.run_on_startup {
            // The first tick completes immediately.
            ticker.tick().await;
        }

        info!(
            interval = %humantime::format_duration(self.config.interval),
            keep_going = self.config.keep_going,
            "sync daemon started"
        );

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("shutdown requested, stopping");
                    break;
                }
                _ = ticker.tick() => {}
            }

            status.total_runs += 1;
            let run_number = status.total_runs;

            let result = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(run_number, "shutdown requested during run, stopping");
                    break;
                }
                result = self.run_once() => result,
            };

            match result {
                Ok(report) => {
                    status.successful_runs += 1;
                    status.last_report = Some(report);
                }
                Err(err) if self.config.keep_going => {
                    status.failed_runs += 1;
                    error!(run_number, error = %err, "run failed, waiting for next tick");
                }
                Err(err) => {
                    error!(run_number, error = %err, "run failed, stopping");
                    return Err(err);
                }
            }
        }

        Ok(status)
    }
}

/// Resolves on Ctrl-C, or on SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SyncDaemonConfig::default();
        assert_eq!(config.interval, Duration::from_secs(60));
        assert!(config.run_on_startup);
        assert!(!config.keep_going);
    }

    #[test]
    fn test_config_from_sync_config() {
        let sync = SyncConfig {
            keep_going: true,
            run_on_startup: false,
            ..Default::default()
        };
        let config = SyncDaemonConfig::from_sync_config(&sync, Duration::from_secs(5));
        assert_eq!(config.interval, Duration::from_secs(5));
        assert!(config.keep_going);
        assert!(!config.run_on_startup);
    }

    #[test]
    fn test_status_default() {
        let status = DaemonStatus::default();
        assert_eq!(status.total_runs, 0);
        assert!(status.last_report.is_none());
    }
}
