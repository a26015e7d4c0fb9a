//! Domain errors for the gitable sync bot.

use thiserror::Error;

/// Domain-level errors that can occur during a sync run.
///
/// The reconciler decides per variant whether a failure is fatal for the
/// run or only for the row being processed.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Malformed reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },

    #[error("Remote issue not found: {0}")]
    RemoteNotFound(String),

    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Store request failed: {0}")]
    StoreRequest(String),

    #[error("Store still rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub(crate) fn malformed(reference: &str, reason: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true when the remote tracker reported the resource as gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RemoteNotFound(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
