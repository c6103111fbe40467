use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Append-only audit row; never updated once written.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StatusHistory {
    pub id: i64,
    pub booking_id: String,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub note: Option<String>,
    pub changed_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A history row waiting to be written inside a lifecycle transaction.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub previous_status: Option<String>,
    pub new_status: String,
    pub note: Option<String>,
    pub changed_by: Option<i64>,
}

impl HistoryEntry {
    pub fn new(previous: Option<&str>, new_status: &str, note: impl Into<Option<String>>, changed_by: Option<i64>) -> Self {
        Self {
            previous_status: previous.map(str::to_string),
            new_status: new_status.to_string(),
            note: note.into(),
            changed_by,
        }
    }
}
