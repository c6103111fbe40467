use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(ReminderStatus {
    Pending => "pending",
    Processing => "processing",
    Sent => "sent",
    Failed => "failed",
});

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduledReminder {
    pub id: String,
    pub booking_id: String,
    pub phone: String,
    pub send_at: DateTime<Utc>,
    pub message: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledReminder {
    pub fn new(booking_id: &str, phone: &str, send_at: DateTime<Utc>, message: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.to_string(),
            phone: phone.to_string(),
            send_at,
            message,
            status: ReminderStatus::Pending.as_str().to_string(),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
