//! Airtable HTTP client.
//!
//! Implements [`RecordStore`] on top of the Airtable REST API v0. Every
//! request passes a client-side token bucket first. A `429 Too Many
//! Requests` answer is retried after a fixed delay until the configured
//! retry budget runs out.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::adapters::rate_limiter::RateLimiter;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AirtableConfig, FieldSet, RateLimitConfig, TableRow};
use crate::domain::ports::RecordStore;

use super::models::{AirtableErrorBody, AirtableRecord, AirtableRecordList, AirtableWriteRequest};

/// Base URL for the Airtable REST API.
pub const AIRTABLE_API_BASE: &str = "https://api.airtable.com/v0";

/// Records requested per page (the API maximum).
const PAGE_SIZE: &str = "100";

/// Length of every Airtable object id (`app`/`rec` prefix + 14 characters).
const ID_LEN: usize = 17;

/// Returns true when `id` is `prefix` followed by alphanumerics, 17 chars in total.
pub fn is_valid_id(id: &str, prefix: &str) -> bool {
    id.len() == ID_LEN
        && id.starts_with(prefix)
        && id[prefix.len()..].chars().all(|c| c.is_ascii_alphanumeric())
}

/// Validate an Airtable base id (`app...`).
pub fn validate_base_id(id: &str) -> DomainResult<()> {
    if is_valid_id(id, "app") {
        Ok(())
    } else {
        Err(DomainError::InvalidIdentifier(format!(
            "'{id}' is not an Airtable base id (expected 'app' followed by 14 alphanumerics)"
        )))
    }
}

fn validate_record_id(id: &str) -> DomainResult<()> {
    if is_valid_id(id, "rec") {
        Ok(())
    } else {
        Err(DomainError::InvalidIdentifier(format!(
            "'{id}' is not an Airtable record id (expected 'rec' followed by 14 alphanumerics)"
        )))
    }
}

/// Retry policy applied to rate-limited responses.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Fixed wait between attempts.
    pub delay: Duration,
    /// Retries after the first attempt; `None` retries forever.
    pub max_retries: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            delay: defaults.retry_delay(),
            max_retries: defaults.max_retries,
        }
    }
}

/// HTTP client for one Airtable table.
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: Client,
    api_key: String,
    /// API root including the version segment, without a trailing slash.
    base_url: Url,
    base_id: String,
    table: String,
    view: Option<String>,
    typecast: bool,
    retry: RetryPolicy,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl AirtableClient {
    /// Create a client for `base_id`/`table` against `base_url`.
    ///
    /// Fails with [`DomainError::InvalidIdentifier`] for a malformed base id
    /// and [`DomainError::Configuration`] for an unusable URL.
    pub fn new(
        api_key: String,
        base_url: &str,
        base_id: &str,
        table: &str,
        requests_per_second: u32,
    ) -> DomainResult<Self> {
        validate_base_id(base_id)?;
        if table.is_empty() {
            return Err(DomainError::Configuration("Airtable table name is empty".to_string()));
        }
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| DomainError::Configuration(format!("invalid Airtable API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DomainError::Configuration(format!(
                "invalid Airtable API URL '{base_url}'"
            )));
        }

        Ok(Self {
            http: Client::new(),
            api_key,
            base_url,
            base_id: base_id.to_string(),
            table: table.to_string(),
            view: None,
            typecast: false,
            retry: RetryPolicy::default(),
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
                "airtable",
                requests_per_second,
                Duration::from_secs(1),
            ))),
        })
    }

    /// Create a client from the loaded configuration.
    pub fn from_config(airtable: &AirtableConfig, rate_limit: &RateLimitConfig) -> DomainResult<Self> {
        let client = Self::new(
            airtable.api_key.clone(),
            &airtable.api_url,
            &airtable.base_id,
            &airtable.table,
            rate_limit.airtable_requests_per_second,
        )?
        .with_view(airtable.view.clone())
        .with_typecast(airtable.typecast)
        .with_retry_policy(RetryPolicy {
            delay: rate_limit.retry_delay(),
            max_retries: rate_limit.max_retries,
        });
        Ok(client)
    }

    /// Restrict listings to a view.
    #[must_use]
    pub fn with_view(mut self, view: Option<String>) -> Self {
        self.view = view.filter(|v| !v.is_empty());
        self
    }

    #[must_use]
    pub fn with_typecast(mut self, typecast: bool) -> Self {
        self.typecast = typecast;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// URL of the table, or of one record in it.
    fn table_url(&self, record_id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.base_id).push(&self.table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        url
    }

    /// Send a request, retrying on 429 with a fixed delay.
    ///
    /// Returns the successful response; non-success statuses are turned
    /// into [`DomainError::StoreRequest`] with the decoded error body.
    async fn send(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&AirtableWriteRequest<'_>>,
    ) -> DomainResult<reqwest::Response> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            self.rate_limiter.lock().await.acquire().await;

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&self.api_key)
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| DomainError::StoreRequest(format!("Airtable {operation} request failed: {e}")))?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let retries_done = attempts - 1;
                if self.retry.max_retries.is_some_and(|max| retries_done >= max) {
                    return Err(DomainError::RateLimited { attempts });
                }
                warn!(
                    operation,
                    attempt = attempts,
                    delay_ms = u64::try_from(self.retry.delay.as_millis()).unwrap_or(u64::MAX),
                    "Airtable rate limit hit, retrying"
                );
                tokio::time::sleep(self.retry.delay).await;
                continue;
            }

            if !status.is_success() {
                let text = resp.text().await.unwrap_or_default();
                let detail = serde_json::from_str::<AirtableErrorBody>(&text)
                    .map_or(text, |body| body.error.describe());
                return Err(DomainError::StoreRequest(format!(
                    "Airtable {operation} returned {status}: {detail}"
                )));
            }

            return Ok(resp);
        }
    }

    async fn write(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        fields: &FieldSet,
    ) -> DomainResult<AirtableRecord> {
        let body = AirtableWriteRequest {
            fields,
            typecast: self.typecast,
        };
        let resp = self.send(operation, method, url, &[], Some(&body)).await?;
        decode(operation, resp).await
    }
}

/// Read a successful response body and decode it as JSON.
async fn decode<T: DeserializeOwned>(operation: &str, resp: Response) -> DomainResult<T> {
    let text = resp
        .text()
        .await
        .map_err(|e| DomainError::StoreRequest(format!("Airtable {operation} read failed: {e}")))?;
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn list_rows(&self) -> DomainResult<Vec<TableRow>> {
        let mut rows = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(view) = &self.view {
                query.push(("view", view.clone()));
            }
            if let Some(cursor) = &offset {
                query.push(("offset", cursor.clone()));
            }

            let resp = self
                .send("list_rows", Method::GET, self.table_url(None), &query, None)
                .await?;
            let page: AirtableRecordList = decode("list_rows", resp).await?;

            debug!(records = page.records.len(), "fetched Airtable page");
            rows.extend(page.records.into_iter().map(TableRow::from));

            match page.offset {
                Some(next) if offset.as_deref() != Some(next.as_str()) => offset = Some(next),
                Some(_) => {
                    warn!("Airtable returned the same offset twice, stopping pagination");
                    break;
                }
                None => break,
            }
        }

        Ok(rows)
    }

    async fn create_row(&self, fields: &FieldSet) -> DomainResult<String> {
        let record = self
            .write("create_row", Method::POST, self.table_url(None), fields)
            .await?;
        Ok(record.id)
    }

    async fn update_row(&self, id: &str, fields: &FieldSet) -> DomainResult<()> {
        validate_record_id(id)?;
        self.write("update_row", Method::PATCH, self.table_url(Some(id)), fields)
            .await?;
        Ok(())
    }

    async fn delete_row(&self, id: &str) -> DomainResult<()> {
        validate_record_id(id)?;
        self.send("delete_row", Method::DELETE, self.table_url(Some(id)), &[], None)
            .await?;
        Ok(())
    }
}
