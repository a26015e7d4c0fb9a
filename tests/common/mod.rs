//! Common test utilities for integration tests
//!
//! In-memory implementations of the two ports that record every call, plus
//! fixture builders for issues and rows.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use gitable::domain::models::{FieldSet, IssueState, Page, Reference, RemoteIssue, Repository, TableRow};
use gitable::domain::ports::{Affiliation, IssueTracker, RecordStore};
use gitable::{DomainError, DomainResult};

/// Fixed timestamp `day` days into January 2024.
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

/// An open plain issue updated on January 10th.
pub fn issue(owner: &str, repo: &str, number: u64) -> RemoteIssue {
    let title = format!("Issue {number}");
    RemoteIssue {
        reference: Reference::new(owner, repo, number).unwrap().with_title(title.clone()),
        title,
        body: "Something is wrong.".to_string(),
        state: IssueState::Open,
        author: "octocat".to_string(),
        is_pull_request: false,
        labels: vec![],
        comment_count: 0,
        url: format!("https://github.com/{owner}/{repo}/issues/{number}"),
        created_at: jan(1),
        updated_at: jan(10),
        closed_at: None,
    }
}

/// A closed pull request.
pub fn closed_pull_request(owner: &str, repo: &str, number: u64) -> RemoteIssue {
    RemoteIssue {
        state: IssueState::Closed,
        is_pull_request: true,
        closed_at: Some(jan(11)),
        url: format!("https://github.com/{owner}/{repo}/pull/{number}"),
        ..issue(owner, repo, number)
    }
}

/// A valid-looking record id for `n`.
pub fn record_id(n: usize) -> String {
    format!("rec{n:014}")
}

pub fn row(id: &str, reference: &str) -> TableRow {
    TableRow::new(
        id,
        FieldSet {
            reference: reference.to_string(),
            ..Default::default()
        },
    )
}

pub fn row_updated_at(id: &str, reference: &str, updated: DateTime<Utc>) -> TableRow {
    let mut row = row(id, reference);
    row.fields.updated = Some(updated);
    row
}

/// Serve `items` as pages of `page_size`, numbered from 1.
fn paged<T: Clone>(items: &[T], page: u32, page_size: usize) -> Page<T> {
    let start = (page as usize - 1) * page_size;
    let chunk: Vec<T> = items.iter().skip(start).take(page_size).cloned().collect();
    let next = (start + page_size < items.len()).then_some(page + 1);
    Page::new(chunk, next)
}

/// In-memory issue tracker.
pub struct FakeIssueTracker {
    user: String,
    page_size: usize,
    repositories: Vec<Repository>,
    watched: Vec<Repository>,
    issues: HashMap<String, RemoteIssue>,
    merged: HashSet<String>,
    fetch_failures: HashSet<String>,
    merge_failures: HashSet<String>,
    missing_listings: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeIssueTracker {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            page_size: 100,
            repositories: vec![],
            watched: vec![],
            issues: HashMap::new(),
            merged: HashSet::new(),
            fetch_failures: HashSet::new(),
            merge_failures: HashSet::new(),
            missing_listings: HashSet::new(),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Make `issue` visible both in its repository listing and by direct fetch.
    pub fn with_issue(mut self, issue: RemoteIssue) -> Self {
        self.issues.insert(issue.reference.key(), issue);
        self
    }

    pub fn with_repository(mut self, owner: &str, name: &str) -> Self {
        self.repositories.push(Repository::new(owner, name));
        self
    }

    pub fn with_watched(mut self, owner: &str, name: &str) -> Self {
        self.watched.push(Repository::new(owner, name));
        self
    }

    pub fn with_merged(mut self, key: &str) -> Self {
        self.merged.insert(key.to_string());
        self
    }

    /// Direct fetches of `key` fail with a non-404 error.
    pub fn with_fetch_failure(mut self, key: &str) -> Self {
        self.fetch_failures.insert(key.to_string());
        self
    }

    pub fn with_merge_failure(mut self, key: &str) -> Self {
        self.merge_failures.insert(key.to_string());
        self
    }

    /// Issue listings of `owner/repo` answer not-found, like a repository
    /// with issues disabled.
    pub fn with_missing_listing(mut self, full_name: &str) -> Self {
        self.missing_listings.insert(full_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls starting with `prefix`.
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IssueTracker for FakeIssueTracker {
    async fn current_user(&self) -> DomainResult<String> {
        self.record("current_user".to_string());
        Ok(self.user.clone())
    }

    async fn list_repositories(&self, affiliations: &[Affiliation], page: u32) -> DomainResult<Page<Repository>> {
        self.record(format!(
            "list_repositories {} page={page}",
            Affiliation::join(affiliations)
        ));
        Ok(paged(&self.repositories, page, self.page_size))
    }

    async fn list_watched_repositories(&self, page: u32) -> DomainResult<Page<Repository>> {
        self.record(format!("list_watched_repositories page={page}"));
        Ok(paged(&self.watched, page, self.page_size))
    }

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> DomainResult<Page<RemoteIssue>> {
        let since_label = since.map_or_else(|| "none".to_string(), |s| s.to_rfc3339());
        self.record(format!("list_issues {owner}/{repo} since={since_label} page={page}"));
        if self.missing_listings.contains(&format!("{owner}/{repo}")) {
            return Err(DomainError::RemoteNotFound(format!(
                "GitHub list_issues returned 410 Gone: {owner}/{repo}"
            )));
        }

        let mut matching: Vec<RemoteIssue> = self
            .issues
            .values()
            .filter(|i| i.reference.owner() == owner && i.reference.repo() == repo)
            .filter(|i| since.is_none_or(|s| i.updated_at >= s))
            .cloned()
            .collect();
        matching.sort_by_key(|i| i.reference.number());
        Ok(paged(&matching, page, self.page_size))
    }

    async fn get_issue(&self, reference: &Reference) -> DomainResult<RemoteIssue> {
        let key = reference.key();
        self.record(format!("get_issue {key}"));
        if self.fetch_failures.contains(&key) {
            return Err(DomainError::RemoteFetch(format!("GitHub get_issue returned 500: {key}")));
        }
        self.issues
            .get(&key)
            .cloned()
            .ok_or(DomainError::RemoteNotFound(key))
    }

    async fn is_pull_request_merged(&self, reference: &Reference) -> DomainResult<bool> {
        let key = reference.key();
        self.record(format!("is_pull_request_merged {key}"));
        if self.merge_failures.contains(&key) {
            return Err(DomainError::RemoteFetch(format!("merge lookup failed: {key}")));
        }
        Ok(self.merged.contains(&key))
    }
}

/// A write observed by [`FakeRecordStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create(FieldSet),
    Update(String, FieldSet),
    Delete(String),
}

impl StoreCall {
    pub fn fields(&self) -> Option<&FieldSet> {
        match self {
            Self::Create(fields) | Self::Update(_, fields) => Some(fields),
            Self::Delete(_) => None,
        }
    }
}

/// In-memory table.
pub struct FakeRecordStore {
    rows: Mutex<Vec<TableRow>>,
    writes: Mutex<Vec<StoreCall>>,
    next_id: Mutex<usize>,
    fail_list: bool,
    fail_label_updates: bool,
    fail_updates: bool,
    fail_creates_for: HashSet<String>,
    fail_deletes: bool,
    list_delay: Option<Duration>,
}

impl FakeRecordStore {
    pub fn new(rows: Vec<TableRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            writes: Mutex::new(vec![]),
            next_id: Mutex::new(1000),
            fail_list: false,
            fail_label_updates: false,
            fail_updates: false,
            fail_creates_for: HashSet::new(),
            fail_deletes: false,
            list_delay: None,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Reject every update that carries `Labels`.
    pub fn failing_label_updates(mut self) -> Self {
        self.fail_label_updates = true;
        self
    }

    /// Reject every update without `Labels`.
    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Reject creates whose `Reference` column equals `reference`.
    pub fn failing_create_for(mut self, reference: &str) -> Self {
        self.fail_creates_for.insert(reference.to_string());
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Hold every listing for `delay` before answering.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn writes(&self) -> Vec<StoreCall> {
        self.writes.lock().unwrap().clone()
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.rows.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) {
        self.writes.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn list_rows(&self) -> DomainResult<Vec<TableRow>> {
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_list {
            return Err(DomainError::StoreRequest("Airtable list_rows returned 500".to_string()));
        }
        Ok(self.rows())
    }

    async fn create_row(&self, fields: &FieldSet) -> DomainResult<String> {
        self.record(StoreCall::Create(fields.clone()));
        if self.fail_creates_for.contains(&fields.reference) {
            return Err(DomainError::RateLimited { attempts: 13 });
        }
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            record_id(*next)
        };
        self.rows.lock().unwrap().push(TableRow::new(id.clone(), fields.clone()));
        Ok(id)
    }

    async fn update_row(&self, row_id: &str, fields: &FieldSet) -> DomainResult<()> {
        self.record(StoreCall::Update(row_id.to_string(), fields.clone()));
        if fields.labels.is_some() && self.fail_label_updates {
            return Err(DomainError::StoreRequest(
                "Airtable update_row returned 422 Unprocessable Entity: INVALID_MULTIPLE_CHOICE_OPTIONS".to_string(),
            ));
        }
        if fields.labels.is_none() && self.fail_updates {
            return Err(DomainError::StoreRequest("Airtable update_row returned 500".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id.as_deref() == Some(row_id)) {
            Some(row) => {
                row.fields = fields.clone();
                Ok(())
            }
            None => Err(DomainError::StoreRequest(format!("no row {row_id}"))),
        }
    }

    async fn delete_row(&self, row_id: &str) -> DomainResult<()> {
        self.record(StoreCall::Delete(row_id.to_string()));
        if self.fail_deletes {
            return Err(DomainError::RateLimited { attempts: 13 });
        }
        self.rows.lock().unwrap().retain(|r| r.id.as_deref() != Some(row_id));
        Ok(())
    }
}
