//! GitHub REST API response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads. They are
//! used internally by the GitHub adapter and converted into domain models
//! before leaving it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{IssueState, Reference, RemoteIssue, Repository};

/// An issue returned by the GitHub API.
///
/// Issues and pull requests share the same endpoint. Pull requests
/// include a non-null `pull_request` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubIssue {
    /// Sequential number within the repository (e.g., 42 → "#42").
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body text (may be absent or null).
    #[serde(default)]
    pub body: Option<String>,
    /// Current state: "open" or "closed".
    pub state: String,
    /// Author of the issue; null for deleted ("ghost") accounts.
    #[serde(default)]
    pub user: Option<GitHubUser>,
    /// Labels applied to the issue.
    #[serde(default)]
    pub labels: Vec<GitHubLabel>,
    /// Number of comments.
    #[serde(default)]
    pub comments: u64,
    /// Present when this item is actually a pull request, not an issue.
    #[serde(default)]
    pub pull_request: Option<GitHubPullRequestRef>,
    /// URL to view the issue in the GitHub UI.
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl GitHubIssue {
    /// Convert into the domain model for the given repository.
    pub fn into_remote(self, owner: &str, repo: &str) -> DomainResult<RemoteIssue> {
        let reference = Reference::new(owner, repo, self.number)?.with_title(self.title.clone());
        Ok(RemoteIssue {
            reference,
            title: self.title,
            body: self.body.unwrap_or_default(),
            state: IssueState::from_remote(&self.state),
            author: self.user.map(|u| u.login).unwrap_or_default(),
            is_pull_request: self.pull_request.is_some(),
            labels: self.labels.into_iter().map(|l| l.name).collect(),
            comment_count: self.comments,
            url: self.html_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            closed_at: self.closed_at,
        })
    }
}

/// A label applied to a GitHub issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    /// The label name (e.g., "bug", "priority: high").
    pub name: String,
}

/// Reference object present on pull requests (absent on plain issues).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubPullRequestRef {
    /// API URL of the pull request resource.
    #[serde(default)]
    pub url: Option<String>,
}

/// A GitHub account (user or organisation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

/// A repository returned by the repository listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    pub owner: GitHubUser,
}

impl From<GitHubRepository> for Repository {
    fn from(repo: GitHubRepository) -> Self {
        Repository::new(repo.owner.login, repo.name)
    }
}
