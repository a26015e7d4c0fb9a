//! One sync run: reconcile the table against the remote tracker.
//!
//! A run lists the table, optionally sweeps repositories into an
//! [`IssueIndex`], brings every existing row up to date and finally creates
//! rows for discovered issues that no row claimed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{FieldSet, Reference, RemoteIssue, SyncConfig, TableRow};
use crate::domain::ports::{IssueTracker, RecordStore};
use crate::services::field_mapper;
use crate::services::issue_fetcher::IssueFetcher;
use crate::services::issue_index::IssueIndex;

/// Options controlling what a run discovers and how it writes.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub autofill: bool,
    pub watch: bool,
    /// Organisations included by the autofill sweep.
    pub orgs: Vec<String>,
    /// Write references with the issue title appended.
    pub verbose_keys: bool,
    /// Lower bound for the watch sweep.
    pub watch_floor: Option<DateTime<Utc>>,
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            autofill: config.autofill,
            watch: config.watch,
            orgs: config.orgs.clone(),
            verbose_keys: config.verbose_keys,
            watch_floor: config.watch_since,
        }
    }
}

/// Counters for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub rows_seen: usize,
    pub rows_updated: usize,
    pub rows_created: usize,
    /// Rows whose issue no longer exists.
    pub rows_deleted: usize,
    /// Rows whose issue no longer exists but whose delete was rejected.
    pub deletes_failed: usize,
    /// Rows with a reference that does not parse.
    pub rows_skipped: usize,
    pub label_patches_failed: usize,
    /// Discovered issues whose row could not be created.
    pub creates_failed: usize,
    /// Issues recorded by the autofill and watch sweeps.
    pub issues_indexed: usize,
}

impl RunReport {
    /// Label/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, usize); 9] {
        [
            ("Rows seen", self.rows_seen),
            ("Rows updated", self.rows_updated),
            ("Rows created", self.rows_created),
            ("Rows deleted", self.rows_deleted),
            ("Deletes failed", self.deletes_failed),
            ("Rows skipped", self.rows_skipped),
            ("Label patches failed", self.label_patches_failed),
            ("Creates failed", self.creates_failed),
            ("Issues indexed", self.issues_indexed),
        ]
    }
}

/// Latest `Updated` timestamp across `rows`, bounded below by `floor`.
pub fn watch_since(rows: &[TableRow], floor: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    rows.iter()
        .filter_map(|row| row.fields.updated)
        .chain(floor)
        .max()
}

/// Reconciles the table with the remote tracker.
pub struct Reconciler {
    tracker: Arc<dyn IssueTracker>,
    store: Arc<dyn RecordStore>,
    options: SyncOptions,
}

impl Reconciler {
    pub fn new(tracker: Arc<dyn IssueTracker>, store: Arc<dyn RecordStore>, options: SyncOptions) -> Self {
        Self {
            tracker,
            store,
            options,
        }
    }

    /// Execute one full run.
    ///
    /// Per-row problems (malformed reference, vanished issue, failed delete
    /// of a vanished issue's row, failed label patch, failed create of a
    /// discovered issue) are counted in the report.
    /// Anything else aborts the run with the error.
    pub async fn run(&self) -> DomainResult<RunReport> {
        let mut report = RunReport::default();

        let rows = self.store.list_rows().await?;
        report.rows_seen = rows.len();
        debug!(rows = rows.len(), "listed table rows");

        let mut index = IssueIndex::new();
        let fetcher = IssueFetcher::new(Arc::clone(&self.tracker));
        if self.options.autofill {
            report.issues_indexed += fetcher.autofill(&self.options.orgs, &mut index).await?;
        }
        if self.options.watch {
            let since = watch_since(&rows, self.options.watch_floor);
            report.issues_indexed += fetcher.watch(since, &mut index).await?;
        }

        for row in rows {
            self.sync_row(row, &mut index, &mut report).await?;
        }

        for issue in index.drain() {
            self.create_discovered(&issue, &mut report).await;
        }

        info!(
            rows_seen = report.rows_seen,
            updated = report.rows_updated,
            created = report.rows_created,
            deleted = report.rows_deleted,
            deletes_failed = report.deletes_failed,
            skipped = report.rows_skipped,
            creates_failed = report.creates_failed,
            "sync run finished"
        );
        Ok(report)
    }

    async fn sync_row(&self, row: TableRow, index: &mut IssueIndex, report: &mut RunReport) -> DomainResult<()> {
        let row_id = row.id.as_deref().unwrap_or_default();

        let reference = match Reference::parse(&row.fields.reference) {
            Ok(reference) => reference,
            Err(err) => {
                warn!(row_id, error = %err, "skipping row");
                report.rows_skipped += 1;
                return Ok(());
            }
        };

        let issue = if let Some(issue) = index.take(&reference) {
            issue
        } else {
            match self.tracker.get_issue(&reference).await {
                Ok(issue) => issue,
                Err(err) if err.is_not_found() => {
                    warn!(row_id, reference = %reference, "issue no longer exists, deleting row");
                    if let Some(id) = row.id.as_deref() {
                        match self.store.delete_row(id).await {
                            Ok(()) => report.rows_deleted += 1,
                            Err(err) => {
                                warn!(row_id, error = %err, "failed to delete row");
                                report.deletes_failed += 1;
                            }
                        }
                    }
                    return Ok(());
                }
                Err(err) => return Err(err),
            }
        };

        let fields = field_mapper::map(self.tracker.as_ref(), &issue, self.options.verbose_keys).await?;
        let id = match row.id {
            Some(id) => {
                self.store.update_row(&id, &fields.without_labels()).await?;
                report.rows_updated += 1;
                id
            }
            None => {
                let id = self.store.create_row(&fields.without_labels()).await?;
                report.rows_created += 1;
                id
            }
        };
        debug!(row_id = %id, reference = %reference, "row written");

        self.patch_labels(&id, &fields, report).await;
        Ok(())
    }

    async fn create_discovered(&self, issue: &RemoteIssue, report: &mut RunReport) {
        let reference = &issue.reference;
        let fields = match field_mapper::map(self.tracker.as_ref(), issue, self.options.verbose_keys).await {
            Ok(fields) => fields,
            Err(err) => {
                warn!(reference = %reference, error = %err, "failed to map discovered issue");
                report.creates_failed += 1;
                return;
            }
        };

        match self.store.create_row(&fields.without_labels()).await {
            Ok(id) => {
                report.rows_created += 1;
                debug!(row_id = %id, reference = %reference, "row created");
                self.patch_labels(&id, &fields, report).await;
            }
            Err(err) => {
                warn!(reference = %reference, error = %err, "failed to create row");
                report.creates_failed += 1;
            }
        }
    }

    /// Second write carrying `Labels`. Unknown select options make the
    /// store reject it, which must not undo the primary write.
    async fn patch_labels(&self, id: &str, fields: &FieldSet, report: &mut RunReport) {
        if let Err(err) = self.store.update_row(id, fields).await {
            warn!(row_id = id, error = %err, "failed to update labels");
            report.label_patches_failed += 1;
        }
    }
}
