pub mod config;
pub mod issue;
pub mod record;
pub mod reference;

pub use config::{
    AirtableConfig, Config, GitHubConfig, LogFormat, LoggingConfig, RateLimitConfig,
    RotationPolicy, SyncConfig,
};
pub use issue::{IssueKind, IssueState, Page, RemoteIssue, Repository};
pub use record::{FieldSet, TableRow};
pub use reference::Reference;
