//! Issue tracker port.
//!
//! The reconciler and fetcher talk to the remote tracker exclusively
//! through this trait, so they can be exercised against in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{Page, Reference, RemoteIssue, Repository};

/// How the authenticated user is related to a listed repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affiliation {
    Owner,
    Collaborator,
    OrganizationMember,
}

impl Affiliation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Collaborator => "collaborator",
            Self::OrganizationMember => "organization_member",
        }
    }

    /// Join affiliations into the comma-separated query form.
    pub fn join(affiliations: &[Self]) -> String {
        affiliations
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Port for the remote issue tracker.
///
/// Listing methods return one page at a time; callers follow
/// [`Page::next_page`] until it is exhausted.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Login of the user the credential belongs to.
    async fn current_user(&self) -> DomainResult<String>;

    /// Repositories reachable by the credential with the given affiliations.
    async fn list_repositories(
        &self,
        affiliations: &[Affiliation],
        page: u32,
    ) -> DomainResult<Page<Repository>>;

    /// Repositories the credential is watching.
    async fn list_watched_repositories(&self, page: u32) -> DomainResult<Page<Repository>>;

    /// Issues and pull requests of a repository in any state.
    ///
    /// When `since` is set only items updated at or after it are returned.
    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> DomainResult<Page<RemoteIssue>>;

    /// Fetch a single issue. Fails with `DomainError::RemoteNotFound` when
    /// the issue (or its repository) no longer exists.
    async fn get_issue(&self, reference: &Reference) -> DomainResult<RemoteIssue>;

    /// Whether the pull request identified by `reference` was merged.
    async fn is_pull_request_merged(&self, reference: &Reference) -> DomainResult<bool>;
}
