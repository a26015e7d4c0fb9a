//! Maps remote issues onto the fixed table schema.

use std::collections::BTreeSet;

use crate::domain::errors::DomainResult;
use crate::domain::models::{FieldSet, IssueState, RemoteIssue};
use crate::domain::ports::IssueTracker;

/// Whether the merge status has to be looked up for `issue`.
///
/// Only closed pull requests can have been merged.
pub fn needs_merge_check(issue: &RemoteIssue) -> bool {
    issue.is_pull_request && issue.state == IssueState::Closed
}

/// Build the full field set for `issue`, including `Labels`.
///
/// `merged` turns a closed pull request into `merged`; it is ignored for
/// anything else. `verbose` writes the reference with the issue title.
pub fn build_fields(issue: &RemoteIssue, merged: bool, verbose: bool) -> FieldSet {
    let state = if merged && needs_merge_check(issue) {
        IssueState::Merged
    } else {
        issue.state
    };

    let labels: BTreeSet<&str> = issue.labels.iter().map(String::as_str).collect();

    FieldSet {
        reference: issue.reference.format(verbose),
        title: issue.title.clone(),
        body: issue.body.clone(),
        state: state.as_str().to_string(),
        author: issue.author.clone(),
        issue_type: issue.kind().as_str().to_string(),
        labels: Some(labels.into_iter().map(str::to_string).collect()),
        comments: issue.comment_count,
        url: issue.url.clone(),
        updated: Some(issue.updated_at),
        created: Some(issue.created_at),
        completed: issue.closed_at,
        repository: issue.reference.repo().to_string(),
    }
}

/// Build the field set for `issue`, asking `tracker` for the merge status
/// of closed pull requests.
pub async fn map(tracker: &dyn IssueTracker, issue: &RemoteIssue, verbose: bool) -> DomainResult<FieldSet> {
    let merged = if needs_merge_check(issue) {
        tracker.is_pull_request_merged(&issue.reference).await?
    } else {
        false
    };
    Ok(build_fields(issue, merged, verbose))
}
