//! Record store port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{FieldSet, TableRow};

/// Port for the tabular store that mirrors the issues.
///
/// Implementations are bound to a single table. Rate limiting is handled
/// inside the implementation and only surfaces as
/// `DomainError::RateLimited` once its retries are exhausted.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every row of the table.
    async fn list_rows(&self) -> DomainResult<Vec<TableRow>>;

    /// Create a row and return the store-assigned id.
    async fn create_row(&self, fields: &FieldSet) -> DomainResult<String>;

    /// Overwrite the given columns of an existing row.
    async fn update_row(&self, row_id: &str, fields: &FieldSet) -> DomainResult<()>;

    async fn delete_row(&self, row_id: &str) -> DomainResult<()>;
}
