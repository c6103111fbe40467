use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use tracing::info;

use crate::domain::models::booking::Booking;
use crate::domain::models::reminder::ScheduledReminder;
use crate::domain::ports::ReminderRepository;
use crate::domain::services::calendar::local_to_utc;
use crate::domain::services::messages;
use crate::error::AppError;

/// Lead time used when the computed send time has already passed.
pub const LATE_REMINDER_DELAY_MINUTES: i64 = 5;

/// `appointment - hours_before`, or five minutes from now when that is already past.
pub fn compute_send_at(appointment: DateTime<Utc>, hours_before: i64, now: DateTime<Utc>) -> DateTime<Utc> {
    let send_at = appointment - Duration::hours(hours_before);
    if send_at <= now {
        now + Duration::minutes(LATE_REMINDER_DELAY_MINUTES)
    } else {
        send_at
    }
}

#[derive(Clone)]
pub struct ReminderScheduler {
    repo: Arc<dyn ReminderRepository>,
    hours_before: i64,
    timezone: Tz,
    company: String,
}

impl ReminderScheduler {
    pub fn new(repo: Arc<dyn ReminderRepository>, hours_before: i64, timezone: Tz, company: String) -> Self {
        Self { repo, hours_before, timezone, company }
    }

    /// Replaces the booking's pending reminder. Bookings without a phone get none.
    pub async fn schedule(&self, booking: &Booking, message: Option<String>) -> Result<Option<ScheduledReminder>, AppError> {
        let Some(phone) = booking.phone.as_deref() else {
            return Ok(None);
        };

        let appointment = local_to_utc(booking.appointment_date, booking.appointment_time, self.timezone);
        let send_at = compute_send_at(appointment, self.hours_before, Utc::now());
        let body = message.unwrap_or_else(|| messages::reminder_sms(booking, &self.company));

        let reminder = self
            .repo
            .replace_pending(&ScheduledReminder::new(&booking.id, phone, send_at, body))
            .await?;
        info!(booking_id = %booking.id, send_at = %reminder.send_at, "reminder scheduled");
        Ok(Some(reminder))
    }

    /// Marks every pending reminder of the booking as failed. Rows are kept for audit.
    pub async fn cancel(&self, booking_id: &str, reason: &str) -> Result<u64, AppError> {
        let count = self.repo.cancel_pending(booking_id, reason).await?;
        if count > 0 {
            info!(booking_id = %booking_id, count, reason, "pending reminders cancelled");
        }
        Ok(count)
    }
}
