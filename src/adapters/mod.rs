//! Infrastructure adapters for external systems.

pub mod airtable;
pub mod github;
pub mod rate_limiter;
