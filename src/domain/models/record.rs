//! Table rows and the fixed column schema written to the store.
//!
//! The same [`FieldSet`] is used for reading and writing. Reads are
//! lenient: the table is edited by humans, so a missing column or a value
//! of an unexpected type falls back to the default instead of failing the
//! whole listing.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize any value, falling back to `T::default()` on a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// The downstream column schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    #[serde(rename = "Reference", default, deserialize_with = "lenient")]
    pub reference: String,

    #[serde(rename = "Title", default, deserialize_with = "lenient")]
    pub title: String,

    #[serde(rename = "Body", default, deserialize_with = "lenient")]
    pub body: String,

    /// `open`, `closed` or `merged`.
    #[serde(rename = "State", default, deserialize_with = "lenient")]
    pub state: String,

    #[serde(rename = "Author", default, deserialize_with = "lenient")]
    pub author: String,

    /// `issue` or `pull request`.
    #[serde(rename = "Type", default, deserialize_with = "lenient")]
    pub issue_type: String,

    /// Written only by the second, label-carrying update.
    #[serde(
        rename = "Labels",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,

    #[serde(rename = "Comments", default, deserialize_with = "lenient")]
    pub comments: u64,

    #[serde(rename = "URL", default, deserialize_with = "lenient")]
    pub url: String,

    #[serde(rename = "Updated", default, deserialize_with = "lenient")]
    pub updated: Option<DateTime<Utc>>,

    #[serde(rename = "Created", default, deserialize_with = "lenient")]
    pub created: Option<DateTime<Utc>>,

    /// Serialized as `null` when absent so a reopened issue clears it.
    #[serde(rename = "Completed", default, deserialize_with = "lenient")]
    pub completed: Option<DateTime<Utc>>,

    #[serde(rename = "Repository", default, deserialize_with = "lenient")]
    pub repository: String,
}

impl FieldSet {
    /// A copy of this field set without the `Labels` column.
    #[must_use]
    pub fn without_labels(&self) -> Self {
        Self {
            labels: None,
            ..self.clone()
        }
    }
}

/// One row of the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    /// Store-assigned record id; `None` until the row has been created.
    pub id: Option<String>,
    pub fields: FieldSet,
}

impl TableRow {
    pub fn new(id: impl Into<String>, fields: FieldSet) -> Self {
        Self {
            id: Some(id.into()),
            fields,
        }
    }
}
