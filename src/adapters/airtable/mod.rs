//! Airtable adapter: the [`RecordStore`](crate::domain::ports::RecordStore)
//! implementation backing the synced table.

pub mod client;
pub mod models;

pub use client::{AirtableClient, RetryPolicy, AIRTABLE_API_BASE};
