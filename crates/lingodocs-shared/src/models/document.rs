use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of a document. Stored as the `document_status` enum in
/// Postgres; serialized with the capitalized names the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "document_status"))]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Pending,
        DocumentStatus::Processing,
        DocumentStatus::Completed,
        DocumentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "Pending",
            DocumentStatus::Processing => "Processing",
            DocumentStatus::Completed => "Completed",
            DocumentStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for DocumentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(DocumentStatus::Pending),
            "Processing" => Ok(DocumentStatus::Processing),
            "Completed" => Ok(DocumentStatus::Completed),
            "Rejected" => Ok(DocumentStatus::Rejected),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
    /// Relative storage key of the uploaded file, e.g. `uploads/<name>`.
    pub document: String,
    pub current_language: String,
    pub process_language: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in DocumentStatus::ALL {
            assert_eq!(status.as_str().parse::<DocumentStatus>(), Ok(status));
        }
        assert!("pending".parse::<DocumentStatus>().is_err());
        assert!("Done".parse::<DocumentStatus>().is_err());
    }

    #[test]
    fn status_serializes_capitalized() {
        let json = serde_json::to_string(&DocumentStatus::Processing).unwrap();
        assert_eq!(json, "\"Processing\"");
    }
}
