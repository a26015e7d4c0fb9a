//! Application services: discovery, mapping, reconciliation and the daemon
//! that drives them.

pub mod field_mapper;
pub mod issue_fetcher;
pub mod issue_index;
pub mod reconciler;
pub mod sync_daemon;

pub use issue_fetcher::IssueFetcher;
pub use issue_index::IssueIndex;
pub use reconciler::{Reconciler, RunReport, SyncOptions};
pub use sync_daemon::{shutdown_signal, DaemonStatus, SyncDaemon, SyncDaemonConfig};
