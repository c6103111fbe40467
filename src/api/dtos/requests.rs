use serde::Deserialize;

use crate::domain::models::assignment::DEFAULT_ASSIGNMENT_ROLE;
use crate::domain::models::booking::{BookingPatch, ManualBookingRequest};
use crate::error::AppError;

/// Body of `POST /booking`, dispatched on its `action` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BookingAction {
    Reschedule {
        booking_id: String,
        #[serde(alias = "new_date")]
        date: String,
        #[serde(alias = "new_time")]
        time: String,
        reason: Option<String>,
    },
    BulkReschedule {
        booking_ids: Vec<String>,
        #[serde(alias = "new_date")]
        date: String,
        #[serde(alias = "new_time")]
        time: String,
        reason: Option<String>,
    },
    Cancel {
        booking_id: String,
        reason: Option<String>,
    },
    BulkCancel {
        booking_ids: Vec<String>,
        reason: Option<String>,
    },
    BulkUpdateStatus {
        booking_ids: Vec<String>,
        status_label: String,
    },
    SendReminder {
        booking_id: String,
    },
    CreateManual(ManualBookingRequest),
}

/// Body of `PUT /booking`. `status` and `status_label` are shorthands merged into `updates`.
#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub booking_id: String,
    #[serde(default)]
    pub updates: Option<BookingPatch>,
    pub status: Option<String>,
    pub status_label: Option<String>,
}

impl UpdateBookingRequest {
    pub fn into_parts(self) -> Result<(String, BookingPatch), AppError> {
        let mut patch = self.updates.unwrap_or_default();
        if let Some(status) = self.status.as_deref() {
            patch.status = Some(status.parse()?);
        }
        if let Some(label) = self.status_label.as_deref() {
            patch.status_label = Some(label.parse()?);
        }
        Ok((self.booking_id, patch))
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteBookingsRequest {
    #[serde(default)]
    pub booking_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookingQuery {
    pub id: Option<String>,
    pub customer_id: Option<i64>,
}

fn default_role() -> String {
    DEFAULT_ASSIGNMENT_ROLE.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AssignStaffRequest {
    pub booking_id: String,
    pub staff_ids: Vec<i64>,
    #[serde(default = "default_role")]
    pub assignment_role: String,
    #[serde(default = "default_true")]
    pub send_notification: bool,
}

#[derive(Debug, Deserialize)]
pub struct UnassignQuery {
    pub booking_id: String,
    pub staff_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentsQuery {
    pub booking_id: Option<String>,
    pub staff_id: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Minutes; defaults to a regular clean when only `time` is given.
    pub duration: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub view: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub booking_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MessageLogQuery {
    pub kind: Option<String>,
    pub booking_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StaffQuery {
    #[serde(default)]
    pub active_only: bool,
}

/// Clamps a caller-supplied page size.
pub fn page_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}
