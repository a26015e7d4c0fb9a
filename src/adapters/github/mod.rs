//! GitHub native adapter.
//!
//! Implements the [`IssueTracker`](crate::domain::ports::IssueTracker) port
//! on top of the GitHub REST API v3.

pub mod client;
pub mod models;

pub use client::GitHubClient;
