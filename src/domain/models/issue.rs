//! Remote issue domain models.
//!
//! These are tracker-agnostic: the GitHub adapter converts its wire types
//! into them, and the services never see the raw API payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reference::Reference;

/// State of an issue or pull request as mirrored into the table.
///
/// The tracker itself only reports `open` and `closed`; `merged` is derived
/// by the field mapper for closed pull requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    Merged,
}

impl IssueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }

    /// Parse a tracker state string. Unknown values are treated as open.
    pub fn from_remote(state: &str) -> Self {
        match state.to_lowercase().as_str() {
            "closed" => Self::Closed,
            "merged" => Self::Merged,
            _ => Self::Open,
        }
    }
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a tracked item is a plain issue or a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    #[serde(rename = "issue")]
    Issue,
    #[serde(rename = "pull request")]
    PullRequest,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::PullRequest => "pull request",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An issue or pull request fetched from the remote tracker.
///
/// Lives for a single run only.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteIssue {
    /// Identity of the issue; carries the title for verbose references.
    pub reference: Reference,
    pub title: String,
    pub body: String,
    pub state: IssueState,
    /// Login of the issue author.
    pub author: String,
    pub is_pull_request: bool,
    pub labels: Vec<String>,
    pub comment_count: u64,
    /// Browser URL of the issue.
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl RemoteIssue {
    pub fn kind(&self) -> IssueKind {
        if self.is_pull_request {
            IssueKind::PullRequest
        } else {
            IssueKind::Issue
        }
    }
}

/// A repository summary returned by the repository listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Login of the owning user or organisation.
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page number to request next, if the tracker reported one.
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_page: Option<u32>) -> Self {
        Self { items, next_page }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_state_from_remote() {
        assert_eq!(IssueState::from_remote("open"), IssueState::Open);
        assert_eq!(IssueState::from_remote("CLOSED"), IssueState::Closed);
        assert_eq!(IssueState::from_remote("merged"), IssueState::Merged);
        assert_eq!(IssueState::from_remote("weird"), IssueState::Open);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&IssueKind::PullRequest).unwrap();
        assert_eq!(json, "\"pull request\"");
        assert_eq!(IssueKind::Issue.to_string(), "issue");
    }

    #[test]
    fn test_repository_full_name() {
        assert_eq!(Repository::new("acme", "widgets").full_name(), "acme/widgets");
    }
}
