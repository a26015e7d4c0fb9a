//! GitHub HTTP client with rate limiting.
//!
//! Wraps the GitHub REST API v3, providing the read operations the sync
//! needs. Includes a token-bucket rate limiter to stay within the
//! 5 000 req/hour authenticated API limit, and follows the `Link` header
//! for pagination.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::LINK;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::adapters::rate_limiter::RateLimiter;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GitHubConfig, Page, RateLimitConfig, Reference, RemoteIssue, Repository};
use crate::domain::ports::{Affiliation, IssueTracker};

use super::models::{GitHubIssue, GitHubRepository, GitHubUser};

/// Base URL for the GitHub REST API v3.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Items requested per page.
const PER_PAGE: &str = "100";

/// HTTP client for the GitHub REST API v3.
///
/// 404 and 410 responses map to [`DomainError::RemoteNotFound`]; every
/// other failure maps to [`DomainError::RemoteFetch`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    /// The underlying HTTP client.
    http: Client,
    /// GitHub personal access token or fine-grained token.
    token: String,
    /// API base URL without a trailing slash.
    base_url: String,
    /// Shared rate limiter.
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl GitHubClient {
    /// Create a new client against the public API.
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE, 5_000)
    }

    /// Create a client against a custom API root (GitHub Enterprise, tests).
    pub fn with_base_url(token: String, base_url: &str, requests_per_hour: u32) -> Self {
        let rate_limiter = RateLimiter::new("github", requests_per_hour, Duration::from_secs(3_600));
        Self {
            http: Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        }
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(github: &GitHubConfig, rate_limit: &RateLimitConfig) -> Self {
        Self::with_base_url(
            github.token.clone(),
            &github.api_url,
            rate_limit.github_requests_per_hour,
        )
    }

    /// Acquire a rate-limit token and build an authorized request.
    async fn rate_limited_request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.rate_limiter.lock().await.acquire().await;
        self.http
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "gitable")
    }

    /// Send a GET request and decode the JSON body, returning the next
    /// page advertised by the `Link` header alongside it.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> DomainResult<(T, Option<u32>)> {
        let resp = self
            .rate_limited_request(reqwest::Method::GET, url)
            .await
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::RemoteFetch(format!("GitHub {operation} request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(DomainError::RemoteNotFound(format!(
                "GitHub {operation} returned {status}"
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::RemoteFetch(format!(
                "GitHub {operation} returned {status}: {body}"
            )));
        }

        let next_page = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_from_link);

        let value = resp
            .json::<T>()
            .await
            .map_err(|e| DomainError::RemoteFetch(format!("GitHub {operation} parse failed: {e}")))?;

        Ok((value, next_page))
    }

    fn repo_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url, owner, repo)
    }
}

/// Extract the `page` query parameter of the `rel="next"` link.
///
/// GitHub formats the header as
/// `<https://api.github.com/...&page=2>; rel="next", <...&page=5>; rel="last"`.
pub fn next_page_from_link(header: &str) -> Option<u32> {
    header.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim().eq_ignore_ascii_case("rel=\"next\""));
        if !is_next {
            return None;
        }
        let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        let parsed = reqwest::Url::parse(url).ok()?;
        parsed
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
    })
}

fn format_since(since: DateTime<Utc>) -> String {
    since.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl IssueTracker for GitHubClient {
    async fn current_user(&self) -> DomainResult<String> {
        let url = format!("{}/user", self.base_url);
        let (user, _) = self.get_json::<GitHubUser>("current_user", &url, &[]).await?;
        Ok(user.login)
    }

    async fn list_repositories(
        &self,
        affiliations: &[Affiliation],
        page: u32,
    ) -> DomainResult<Page<Repository>> {
        let url = format!("{}/user/repos", self.base_url);
        let query = [
            ("affiliation", Affiliation::join(affiliations)),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        let (repos, next) = self
            .get_json::<Vec<GitHubRepository>>("list_repositories", &url, &query)
            .await?;
        Ok(Page::new(repos.into_iter().map(Repository::from).collect(), next))
    }

    async fn list_watched_repositories(&self, page: u32) -> DomainResult<Page<Repository>> {
        let url = format!("{}/user/subscriptions", self.base_url);
        let query = [("per_page", PER_PAGE.to_string()), ("page", page.to_string())];
        let (repos, next) = self
            .get_json::<Vec<GitHubRepository>>("list_watched_repositories", &url, &query)
            .await?;
        Ok(Page::new(repos.into_iter().map(Repository::from).collect(), next))
    }

    async fn list_issues(
        &self,
        owner: &str,
        repo: &str,
        since: Option<DateTime<Utc>>,
        page: u32,
    ) -> DomainResult<Page<RemoteIssue>> {
        let url = format!("{}/issues", self.repo_url(owner, repo));
        let mut query = vec![
            ("state", "all".to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.to_string()),
        ];
        if let Some(since) = since {
            query.push(("since", format_since(since)));
        }

        let (issues, next) = self
            .get_json::<Vec<GitHubIssue>>("list_issues", &url, &query)
            .await?;
        let items = issues
            .into_iter()
            .map(|issue| issue.into_remote(owner, repo))
            .collect::<DomainResult<Vec<_>>>()?;
        Ok(Page::new(items, next))
    }

    async fn get_issue(&self, reference: &Reference) -> DomainResult<RemoteIssue> {
        let url = format!(
            "{}/issues/{}",
            self.repo_url(reference.owner(), reference.repo()),
            reference.number()
        );
        let (issue, _) = self
            .get_json::<GitHubIssue>("get_issue", &url, &[])
            .await
            .map_err(|e| match e {
                DomainError::RemoteNotFound(_) => DomainError::RemoteNotFound(reference.key()),
                other => other,
            })?;
        issue.into_remote(reference.owner(), reference.repo())
    }

    async fn is_pull_request_merged(&self, reference: &Reference) -> DomainResult<bool> {
        let url = format!(
            "{}/pulls/{}/merge",
            self.repo_url(reference.owner(), reference.repo()),
            reference.number()
        );
        let resp = self
            .rate_limited_request(reqwest::Method::GET, &url)
            .await
            .send()
            .await
            .map_err(|e| {
                DomainError::RemoteFetch(format!("GitHub is_pull_request_merged request failed: {e}"))
            })?;

        match resp.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(DomainError::RemoteFetch(format!(
                    "GitHub is_pull_request_merged returned {status}: {body}"
                )))
            }
        }
    }
}
