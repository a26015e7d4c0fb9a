//! Paginated issue discovery.
//!
//! Fills an [`IssueIndex`] from three sources: a single repository, the
//! autofill sweep over the credential's own and organisation repositories,
//! and the watch sweep over watched repositories.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Page, Repository};
use crate::domain::ports::{Affiliation, IssueTracker};
use crate::services::issue_index::IssueIndex;

/// First page of every listing.
const FIRST_PAGE: u32 = 1;

/// Follow `next_page` from the first page until it is absent or stops
/// advancing, collecting every item.
pub async fn paginate<T, F, Fut>(mut fetch: F) -> DomainResult<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = DomainResult<Page<T>>>,
{
    let mut items = Vec::new();
    let mut current = FIRST_PAGE;
    loop {
        let page = fetch(current).await?;
        items.extend(page.items);
        match page.next_page {
            Some(next) if next > current => current = next,
            _ => break,
        }
    }
    Ok(items)
}

/// Discovers remote issues and records them in an [`IssueIndex`].
pub struct IssueFetcher {
    tracker: Arc<dyn IssueTracker>,
}

impl IssueFetcher {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }

    /// Index every issue of `owner/repo`, optionally only those updated
    /// since `since`. Returns the number of issues indexed.
    pub async fn fetch_repository(
        &self,
        owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        index: &mut IssueIndex,
    ) -> DomainResult<usize> {
        let tracker = self.tracker.as_ref();
        let issues = paginate(move |page| tracker.list_issues(owner, repo, since, page)).await?;
        let count = issues.len();
        debug!(owner, repo, count, "indexed repository issues");
        index.extend(issues);
        Ok(count)
    }

    /// Autofill sweep: index all issues of repositories owned by the
    /// authenticated user or one of `orgs`.
    pub async fn autofill(&self, orgs: &[String], index: &mut IssueIndex) -> DomainResult<usize> {
        let tracker = self.tracker.as_ref();
        let login = tracker.current_user().await?;

        let affiliations = autofill_affiliations(orgs);
        let affiliations = affiliations.as_slice();
        let repositories =
            paginate(move |page| tracker.list_repositories(affiliations, page)).await?;

        let allowed = allow_list(orgs, &login);
        let mut total = 0;
        for repository in repositories.iter().filter(|r| is_allowed(&allowed, r)) {
            total += self.fetch_swept(repository, None, index).await?;
        }

        info!(user = %login, repositories = repositories.len(), issues = total, "autofill sweep finished");
        Ok(total)
    }

    /// Watch sweep: index issues of every watched repository updated since
    /// `since` (all issues when `None`).
    pub async fn watch(&self, since: Option<DateTime<Utc>>, index: &mut IssueIndex) -> DomainResult<usize> {
        let tracker = self.tracker.as_ref();
        let repositories = paginate(move |page| tracker.list_watched_repositories(page)).await?;

        let mut total = 0;
        for repository in &repositories {
            total += self.fetch_swept(repository, since, index).await?;
        }

        info!(
            repositories = repositories.len(),
            issues = total,
            since = ?since,
            "watch sweep finished"
        );
        Ok(total)
    }

    /// Index one repository found by a sweep. Repositories whose issue
    /// listing is gone, as on forks with issues disabled, are skipped.
    async fn fetch_swept(
        &self,
        repository: &Repository,
        since: Option<DateTime<Utc>>,
        index: &mut IssueIndex,
    ) -> DomainResult<usize> {
        match self
            .fetch_repository(&repository.owner, &repository.name, since, index)
            .await
        {
            Err(err) if err.is_not_found() => {
                warn!(
                    owner = %repository.owner,
                    repo = %repository.name,
                    error = %err,
                    "skipping repository without issues"
                );
                Ok(0)
            }
            other => other,
        }
    }
}

/// Repository affiliations requested by the autofill sweep.
pub fn autofill_affiliations(orgs: &[String]) -> Vec<Affiliation> {
    if orgs.is_empty() {
        vec![Affiliation::Owner]
    } else {
        vec![
            Affiliation::Owner,
            Affiliation::Collaborator,
            Affiliation::OrganizationMember,
        ]
    }
}

fn allow_list(orgs: &[String], login: &str) -> Vec<String> {
    orgs.iter()
        .map(String::as_str)
        .chain(std::iter::once(login))
        .map(str::to_lowercase)
        .collect()
}

fn is_allowed(allowed: &[String], repository: &Repository) -> bool {
    let owner = repository.owner.to_lowercase();
    allowed.iter().any(|a| *a == owner)
}
