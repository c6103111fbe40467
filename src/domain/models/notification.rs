use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(NotificationKind {
    BookingCreated => "booking_created",
    BookingUpdated => "booking_updated",
    BookingCancelled => "booking_cancelled",
    StaffAssignment => "staff_assignment",
    PaymentReceived => "payment_received",
});

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NotificationPayload {
    pub message: String,
    #[serde(default)]
    pub metadata: Value,
}

/// Dashboard feed entry. Only `is_read` ever changes after insert.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: String,
    pub kind: String,
    pub booking_id: Option<String>,
    pub customer_id: Option<i64>,
    pub payload: Json<NotificationPayload>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        kind: NotificationKind,
        booking_id: Option<&str>,
        customer_id: Option<i64>,
        message: String,
        metadata: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: kind.as_str().to_string(),
            booking_id: booking_id.map(str::to_string),
            customer_id,
            payload: Json(NotificationPayload { message, metadata }),
            is_read: false,
            created_at: Utc::now(),
        }
    }
}
