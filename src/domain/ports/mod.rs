use crate::domain::models::{
    assignment::{AssignedStaff, StaffScheduleEntry},
    booking::{Booking, BookingPatch},
    customer::{Customer, CustomerContact},
    history::{HistoryEntry, StatusHistory},
    invoice::{CreatedInvoice, InvoiceRequest, InvoiceStatus},
    message_log::{EmailLog, OutboundEmail, SmsLog},
    notification::Notification,
    reminder::ScheduledReminder,
    staff::{Staff, StaffRole},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Resolves or creates the customer, then inserts the booking and its first
    /// history row in one transaction.
    async fn create(&self, contact: &CustomerContact, booking: &Booking, history: &HistoryEntry) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<Booking>, AppError>;
    /// Non-cancelled bookings with an appointment date in `[start, end]`.
    async fn list_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn reschedule(&self, id: &str, date: NaiveDate, time: NaiveTime, history: &HistoryEntry) -> Result<Booking, AppError>;
    /// Marks the booking cancelled and drops its assignments atomically.
    async fn cancel(&self, id: &str, history: &HistoryEntry) -> Result<Booking, AppError>;
    async fn apply_patch(&self, id: &str, patch: &BookingPatch, history: Option<&HistoryEntry>) -> Result<Booking, AppError>;
    /// Removes the booking and its assignments, fails its pending reminders and
    /// records the deletion in the history table.
    async fn delete(&self, id: &str, history: &HistoryEntry) -> Result<(), AppError>;
    async fn list_history(&self, booking_id: &str) -> Result<Vec<StatusHistory>, AppError>;
    async fn set_invoice(&self, id: &str, invoice_id: &str) -> Result<Booking, AppError>;
    async fn mark_paid(&self, id: &str) -> Result<Booking, AppError>;
    /// Stamps and returns the unpaid invoiced bookings checked least recently.
    async fn claim_payment_checks(&self, checked_at: DateTime<Utc>, limit: i64) -> Result<Vec<Booking>, AppError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Customer>, AppError>;
}

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn create(&self, staff: &Staff) -> Result<Staff, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Staff>, AppError>;
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Staff>, AppError>;
    async fn list(&self, active_only: bool) -> Result<Vec<Staff>, AppError>;
    async fn list_active_by_roles(&self, roles: &[StaffRole]) -> Result<Vec<Staff>, AppError>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Replaces every assignment of the booking with the given staff set in one transaction.
    async fn replace_all(&self, booking_id: &str, staff_ids: &[i64], role: &str) -> Result<Vec<AssignedStaff>, AppError>;
    async fn remove(&self, booking_id: &str, staff_id: i64) -> Result<bool, AppError>;
    async fn list_for_booking(&self, booking_id: &str) -> Result<Vec<AssignedStaff>, AppError>;
    async fn list_for_staff(&self, staff_id: i64) -> Result<Vec<StaffScheduleEntry>, AppError>;
    /// Assignments on non-cancelled bookings dated within `[start, end]`.
    async fn list_for_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<StaffScheduleEntry>, AppError>;
}

#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// Deletes any pending reminder of the booking and inserts the new one.
    async fn replace_pending(&self, reminder: &ScheduledReminder) -> Result<ScheduledReminder, AppError>;
    async fn cancel_pending(&self, booking_id: &str, reason: &str) -> Result<u64, AppError>;
    /// Moves due pending reminders, plus `processing` ones untouched since
    /// `stale_before`, to `processing` and returns them.
    async fn claim_due(&self, now: DateTime<Utc>, stale_before: DateTime<Utc>, limit: i64) -> Result<Vec<ScheduledReminder>, AppError>;
    async fn mark_sent(&self, id: &str) -> Result<(), AppError>;
    async fn mark_failed(&self, id: &str, error_message: &str) -> Result<(), AppError>;
    async fn list_for_booking(&self, booking_id: &str) -> Result<Vec<ScheduledReminder>, AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<Notification, AppError>;
    async fn list(&self, unread_only: bool, limit: i64) -> Result<Vec<Notification>, AppError>;
    async fn mark_read(&self, id: &str) -> Result<bool, AppError>;
    async fn mark_all_read(&self) -> Result<u64, AppError>;
    async fn unread_count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait MessageLogRepository: Send + Sync {
    async fn log_sms(&self, log: &SmsLog) -> Result<(), AppError>;
    async fn log_email(&self, log: &EmailLog) -> Result<(), AppError>;
    async fn list_sms(&self, booking_id: Option<&str>, limit: i64) -> Result<Vec<SmsLog>, AppError>;
    async fn list_email(&self, booking_id: Option<&str>, limit: i64) -> Result<Vec<EmailLog>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), AppError>;
}

#[async_trait]
pub trait SmsService: Send + Sync {
    /// Sends one text to an E.164 number and returns the provider's message id.
    async fn send(&self, to: &str, body: &str) -> Result<String, AppError>;
}

#[async_trait]
pub trait AccountingProvider: Send + Sync {
    fn is_enabled(&self) -> bool {
        true
    }
    async fn create_invoice(&self, request: &InvoiceRequest) -> Result<CreatedInvoice, AppError>;
    async fn invoice_status(&self, invoice_id: &str) -> Result<InvoiceStatus, AppError>;
}
