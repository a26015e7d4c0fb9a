//! Airtable REST API request and response models.

use serde::{Deserialize, Serialize};

use crate::domain::models::{FieldSet, TableRow};

/// A record as returned by the list, create and update endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirtableRecord {
    /// Record id (`rec...`).
    pub id: String,
    /// Column values; columns left empty in the UI are omitted by Airtable.
    #[serde(default)]
    pub fields: FieldSet,
    #[serde(rename = "createdTime", default)]
    pub created_time: Option<String>,
}

impl From<AirtableRecord> for TableRow {
    fn from(record: AirtableRecord) -> Self {
        TableRow::new(record.id, record.fields)
    }
}

/// One page of the list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AirtableRecordList {
    #[serde(default)]
    pub records: Vec<AirtableRecord>,
    /// Cursor for the next page; absent on the last page.
    #[serde(default)]
    pub offset: Option<String>,
}

/// Body of the create and update requests.
#[derive(Debug, Serialize)]
pub struct AirtableWriteRequest<'a> {
    pub fields: &'a FieldSet,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub typecast: bool,
}

/// Error envelope. Airtable sends either `{"error": "NOT_FOUND"}` or
/// `{"error": {"type": "...", "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AirtableErrorBody {
    pub error: AirtableErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AirtableErrorDetail {
    Code(String),
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: Option<String>,
    },
}

impl AirtableErrorDetail {
    pub fn describe(&self) -> String {
        match self {
            Self::Code(code) => code.clone(),
            Self::Detailed {
                kind,
                message: Some(message),
            } => format!("{kind}: {message}"),
            Self::Detailed { kind, message: None } => kind.clone(),
        }
    }
}
