use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_SENT: &str = "sent";
pub const STATUS_FAILED: &str = "failed";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct SmsLog {
    pub id: String,
    pub booking_id: Option<String>,
    pub recipient: String,
    pub message: String,
    pub status: String,
    pub provider_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SmsLog {
    pub fn new(booking_id: Option<&str>, recipient: &str, message: &str, outcome: &Result<String, String>) -> Self {
        let (status, provider_id, error_message) = match outcome {
            Ok(provider_id) => (STATUS_SENT, Some(provider_id.clone()), None),
            Err(e) => (STATUS_FAILED, None, Some(e.clone())),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.map(str::to_string),
            recipient: recipient.to_string(),
            message: message.to_string(),
            status: status.to_string(),
            provider_id,
            error_message,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct EmailLog {
    pub id: String,
    pub booking_id: Option<String>,
    pub recipient: String,
    pub subject: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EmailLog {
    pub fn new(booking_id: Option<&str>, recipient: &str, subject: &str, outcome: &Result<(), String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.map(str::to_string),
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            status: if outcome.is_ok() { STATUS_SENT } else { STATUS_FAILED }.to_string(),
            error_message: outcome.as_ref().err().cloned(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A fully rendered email ready for the transport.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub attachments: Vec<EmailAttachment>,
}
