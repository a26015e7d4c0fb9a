//! Issue references of the form `owner/repo#number[ - title]`.
//!
//! The canonical form (`owner/repo#number`) is the join key between a
//! table row and a GitHub issue. The verbose form appends the issue title
//! for readability in the table; only the first `" - "` after the `#`
//! separates the number from the title, so titles may contain the
//! separator themselves.

use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, DomainResult};

/// Separator between the issue number and the display title.
const TITLE_SEPARATOR: &str = " - ";

/// A parsed issue reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    owner: String,
    repo: String,
    number: u64,
    title: Option<String>,
}

impl Reference {
    /// Create a reference, validating that owner and repo are non-empty and
    /// the number is positive.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> DomainResult<Self> {
        let owner = owner.into();
        let repo = repo.into();
        let candidate = format!("{owner}/{repo}#{number}");
        if owner.is_empty() {
            return Err(DomainError::malformed(&candidate, "owner is empty"));
        }
        if repo.is_empty() {
            return Err(DomainError::malformed(&candidate, "repo is empty"));
        }
        if number == 0 {
            return Err(DomainError::malformed(&candidate, "issue number must be positive"));
        }
        Ok(Self {
            owner,
            repo,
            number,
            title: None,
        })
    }

    /// Attach a display title. Empty titles are ignored.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title.is_empty() { None } else { Some(title) };
        self
    }

    /// Parse a reference string.
    ///
    /// Accepts `owner/repo#number` and `owner/repo#number - title`.
    /// Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let raw = input.trim();

        let (repo_part, issue_part) = raw
            .split_once('#')
            .ok_or_else(|| DomainError::malformed(input, "missing '#' before issue number"))?;

        let (owner, repo) = repo_part
            .split_once('/')
            .ok_or_else(|| DomainError::malformed(input, "missing '/' between owner and repo"))?;
        if repo.contains('/') {
            return Err(DomainError::malformed(input, "repository part has more than one '/'"));
        }

        let (number_part, title) = match issue_part.split_once(TITLE_SEPARATOR) {
            Some((number, title)) => (number, Some(title)),
            None => (issue_part, None),
        };

        let number = number_part.trim().parse::<u64>().map_err(|_| {
            DomainError::malformed(input, format!("issue number '{number_part}' is not numeric"))
        })?;

        let reference = Self::new(owner, repo, number).map_err(|err| match err {
            DomainError::MalformedReference { reason, .. } => DomainError::malformed(input, reason),
            other => other,
        })?;

        Ok(match title {
            Some(title) => reference.with_title(title),
            None => reference,
        })
    }

    /// Format the reference, appending ` - title` when `verbose` is set and
    /// a title is known.
    pub fn format(&self, verbose: bool) -> String {
        match (&self.title, verbose) {
            (Some(title), true) => format!("{self}{TITLE_SEPARATOR}{title}"),
            _ => self.to_string(),
        }
    }

    /// The canonical `owner/repo#number` key.
    pub fn key(&self) -> String {
        self.to_string()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

impl FromStr for Reference {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical() {
        let r = Reference::parse("acme/widgets#7").unwrap();
        assert_eq!(r.owner(), "acme");
        assert_eq!(r.repo(), "widgets");
        assert_eq!(r.number(), 7);
        assert!(r.title().is_none());
        assert_eq!(r.format(false), "acme/widgets#7");
    }

    #[test]
    fn test_parse_verbose_splits_on_first_separator() {
        let r = Reference::parse("o/r#42 - Fix bug - extra").unwrap();
        assert_eq!(r.number(), 42);
        assert_eq!(r.title(), Some("Fix bug - extra"));
        assert_eq!(r.key(), "o/r#42");
        assert_eq!(r.format(true), "o/r#42 - Fix bug - extra");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let r = Reference::parse("  acme/widgets#7 \n").unwrap();
        assert_eq!(r.key(), "acme/widgets#7");
    }

    #[test]
    fn test_parse_rejects_missing_hash() {
        let err = Reference::parse("no-hash").unwrap_err();
        assert!(matches!(err, DomainError::MalformedReference { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_repo() {
        let err = Reference::parse("owner#5").unwrap_err();
        assert!(matches!(err, DomainError::MalformedReference { .. }));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = Reference::parse("owner/repo#abc").unwrap_err();
        match err {
            DomainError::MalformedReference { reference, reason } => {
                assert_eq!(reference, "owner/repo#abc");
                assert!(reason.contains("not numeric"), "got: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_zero_and_empty_parts() {
        assert!(Reference::parse("owner/repo#0").is_err());
        assert!(Reference::parse("/repo#1").is_err());
        assert!(Reference::parse("owner/#1").is_err());
        assert!(Reference::parse("a/b/c#1").is_err());
        assert!(Reference::parse("").is_err());
    }

    #[test]
    fn test_format_verbose_without_title() {
        let r = Reference::new("acme", "widgets", 9).unwrap();
        assert_eq!(r.format(true), "acme/widgets#9");
    }

    #[test]
    fn test_with_empty_title_is_ignored() {
        let r = Reference::new("acme", "widgets", 9).unwrap().with_title("");
        assert!(r.title().is_none());
    }

    #[test]
    fn test_from_str() {
        let r: Reference = "acme/widgets#12".parse().unwrap();
        assert_eq!(r.number(), 12);
    }
}
