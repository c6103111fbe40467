use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::models::assignment::AssignedStaff;
use crate::domain::models::booking::Booking;
use crate::domain::models::customer::Customer;
use crate::domain::models::history::StatusHistory;
use crate::domain::models::reminder::ScheduledReminder;
use crate::domain::models::staff::Staff;
use crate::domain::services::calendar::CalendarView;
use crate::domain::services::effects::Committed;
use crate::domain::services::lifecycle::BatchReport;
use crate::domain::services::phone::format_phone_display;

/// Envelope shared by every successful response.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self { success: true, message: message.into(), data: Some(data) })
    }
}

/// Success message that also mentions failed notification steps.
pub fn committed_message<T>(action: &str, committed: &Committed<T>) -> String {
    match committed.failed_effects().count() {
        0 => action.to_string(),
        failed => format!("{} ({} follow-up step(s) failed)", action, failed),
    }
}

pub fn batch_message(verb: &str, report: &BatchReport) -> String {
    let mut message = format!("{} {} booking(s)", verb, report.processed.len());
    if !report.skipped.is_empty() {
        message.push_str(&format!(", skipped {}", report.skipped.len()));
    }
    message
}

#[derive(Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub phone_display: Option<String>,
}

impl From<Booking> for BookingView {
    fn from(booking: Booking) -> Self {
        let phone_display = booking.phone.as_deref().map(format_phone_display);
        Self { booking, phone_display }
    }
}

#[derive(Serialize)]
pub struct BookingDetail {
    pub booking: BookingView,
    pub assigned_staff: Vec<AssignedStaff>,
    pub history: Vec<StatusHistory>,
    pub reminders: Vec<ScheduledReminder>,
}

#[derive(Serialize)]
pub struct CustomerView {
    #[serde(flatten)]
    pub customer: Customer,
    pub phone_display: Option<String>,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        let phone_display = customer.phone_display();
        Self { customer, phone_display }
    }
}

#[derive(Serialize)]
pub struct CustomerBookings {
    pub customer: CustomerView,
    pub bookings: Vec<BookingView>,
}

#[derive(Serialize)]
pub struct StaffView {
    #[serde(flatten)]
    pub staff: Staff,
    pub phone_display: Option<String>,
}

impl From<Staff> for StaffView {
    fn from(staff: Staff) -> Self {
        let phone_display = staff.phone_display();
        Self { staff, phone_display }
    }
}

#[derive(Serialize)]
pub struct SubmittedBooking {
    pub booking_id: String,
    pub estimated_price: f64,
    pub appointment_date: NaiveDate,
    pub status_label: String,
}

#[derive(Serialize)]
pub struct CalendarEntry {
    #[serde(flatten)]
    pub booking: BookingView,
    pub staff_names: Vec<String>,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub view: CalendarView,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bookings: Vec<CalendarEntry>,
}
