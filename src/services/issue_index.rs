//! Per-run index of issues discovered by the repository sweeps.

use std::collections::BTreeMap;

use crate::domain::models::{Reference, RemoteIssue};

/// Lookup key for a reference. GitHub owner and repository names are
/// case-insensitive; the number sorts numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct IndexKey {
    owner: String,
    repo: String,
    number: u64,
}

impl From<&Reference> for IndexKey {
    fn from(reference: &Reference) -> Self {
        Self {
            owner: reference.owner().to_lowercase(),
            repo: reference.repo().to_lowercase(),
            number: reference.number(),
        }
    }
}

/// Issues keyed by their `owner/repo#number` reference.
///
/// Entries are consumed with [`take`](IssueIndex::take) as existing rows
/// claim them; whatever is left after the row pass has no row yet and is
/// created by the reconciler. Keys never include the display title, so a
/// renamed issue still matches its row, and `Acme/Widgets#9` matches a row
/// typed as `acme/widgets#9`.
#[derive(Debug, Default)]
pub struct IssueIndex {
    issues: BTreeMap<IndexKey, RemoteIssue>,
}

impl IssueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an issue. A later insert for the same reference replaces the
    /// earlier one; the replaced issue is returned.
    pub fn insert(&mut self, issue: RemoteIssue) -> Option<RemoteIssue> {
        self.issues.insert(IndexKey::from(&issue.reference), issue)
    }

    /// Remove and return the issue for `reference`, if indexed.
    pub fn take(&mut self, reference: &Reference) -> Option<RemoteIssue> {
        self.issues.remove(&IndexKey::from(reference))
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.issues.contains_key(&IndexKey::from(reference))
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Remove every remaining issue, ordered by owner, repository, then
    /// issue number.
    pub fn drain(&mut self) -> impl Iterator<Item = RemoteIssue> {
        std::mem::take(&mut self.issues).into_values()
    }
}

impl Extend<RemoteIssue> for IssueIndex {
    fn extend<I: IntoIterator<Item = RemoteIssue>>(&mut self, iter: I) {
        for issue in iter {
            self.insert(issue);
        }
    }
}
