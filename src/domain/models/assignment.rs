use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingAssignment {
    pub id: i64,
    pub booking_id: String,
    pub staff_id: i64,
    pub assignment_role: String,
    pub assigned_at: DateTime<Utc>,
}

/// An assignment joined with the staff member's contact details.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AssignedStaff {
    pub staff_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub assignment_role: String,
    pub assigned_at: DateTime<Utc>,
}

impl AssignedStaff {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// An assignment joined with its booking's schedule, used for availability checks
/// and per-staff listings.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StaffScheduleEntry {
    pub staff_id: i64,
    pub staff_name: String,
    pub booking_id: String,
    pub customer_name: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub status_label: String,
    pub assignment_role: String,
}

pub const DEFAULT_ASSIGNMENT_ROLE: &str = "lead";
