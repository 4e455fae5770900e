//! Grievance and analysis record models
//!
//! Rows are created once and never updated; the only link between the two
//! tables is `AnalysisResult::grievance_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional submitter details
///
/// Every field is independently nullable. Serialized with the camelCase keys
/// used by the submission form (`roomNumber`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserInfo {
    /// True when no field carries a non-blank value
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.room_number, &self.email]
            .iter()
            .all(|field| field.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    /// Copy with blank fields collapsed to `None` and values trimmed
    pub fn normalized(&self) -> Self {
        fn clean(field: &Option<String>) -> Option<String> {
            field
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Self {
            name: clean(&self.name),
            room_number: clean(&self.room_number),
            email: clean(&self.email),
        }
    }
}

/// Stored complaint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grievance {
    /// Assigned by the store on insert
    pub id: i64,
    /// Trimmed, non-empty complaint text
    pub raw_text: String,
    pub user_info: Option<UserInfo>,
    /// Free-form tag describing where the submission came from
    pub origin: String,
    pub submitted_at: DateTime<Utc>,
}

/// Classification of a single complaint as returned by the analysis service
///
/// Label values belong to the analysis service; they are carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisData {
    pub category: String,
    pub sentiment: String,
    pub urgency: String,
    pub clean_text: String,
    /// Opaque confidence payload, stored but never interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<serde_json::Value>,
}

/// Stored classification, linked to exactly one grievance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: i64,
    pub grievance_id: i64,
    pub category: String,
    pub sentiment: String,
    pub urgency: String,
    pub clean_text: String,
    pub confidence: Option<serde_json::Value>,
    pub processed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// The classification part of the stored row
    pub fn data(&self) -> AnalysisData {
        AnalysisData {
            category: self.category.clone(),
            sentiment: self.sentiment.clone(),
            urgency: self.urgency.clone(),
            clean_text: self.clean_text.clone(),
            confidence: self.confidence.clone(),
        }
    }
}

/// Read-side view: a grievance joined with its analysis, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrievanceRecord {
    pub id: i64,
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
    pub origin: String,
    pub submitted_at: DateTime<Utc>,
    pub analysis: Option<AnalysisData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}
