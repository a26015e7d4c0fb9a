//! Port trait definitions (Hexagonal Architecture)
//!
//! - IssueTracker: read access to the remote issue tracker
//! - RecordStore: CRUD access to the table that mirrors it

pub mod issue_tracker;
pub mod record_store;

pub use issue_tracker::{Affiliation, IssueTracker};
pub use record_store::RecordStore;
