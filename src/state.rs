use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, DefaultKeyedRateLimiter, Quota, RateLimiter};
use tera::Tera;

use crate::config::Config;
use crate::domain::ports::{
    AccountingProvider, AssignmentRepository, BookingRepository, CustomerRepository, EmailService,
    MessageLogRepository, NotificationRepository, ReminderRepository, SmsService, StaffRepository,
};
use crate::domain::services::dispatcher::NotificationDispatcher;
use crate::domain::services::lifecycle::{BookingLifecycle, LifecycleDeps};
use crate::domain::services::messages::EmailRenderer;
use crate::domain::services::payments::PaymentSync;
use crate::domain::services::reminders::ReminderScheduler;

pub type PublicLimiter = DefaultKeyedRateLimiter<String>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub customer_repo: Arc<dyn CustomerRepository>,
    pub staff_repo: Arc<dyn StaffRepository>,
    pub assignment_repo: Arc<dyn AssignmentRepository>,
    pub reminder_repo: Arc<dyn ReminderRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub message_log_repo: Arc<dyn MessageLogRepository>,
    pub email_service: Arc<dyn EmailService>,
    pub sms_service: Arc<dyn SmsService>,
    pub accounting: Arc<dyn AccountingProvider>,
    pub templates: Arc<Tera>,
    pub public_limiter: Arc<PublicLimiter>,
    /// Paces every outbound reminder SMS in this process, whichever path sends it.
    pub sms_limiter: Arc<DefaultDirectRateLimiter>,
}

/// Per-client limiter for the public booking form.
pub fn public_limiter(per_minute: u32) -> Arc<PublicLimiter> {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::keyed(quota))
}

pub fn sms_limiter(per_second: u32) -> Arc<DefaultDirectRateLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

impl AppState {
    /// Drops per-client limiter entries whose quota has fully replenished.
    /// Returns the number of clients still tracked.
    pub fn prune_rate_limiters(&self) -> usize {
        self.public_limiter.retain_recent();
        self.public_limiter.shrink_to_fit();
        self.public_limiter.len()
    }

    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(
            self.sms_service.clone(),
            self.email_service.clone(),
            self.message_log_repo.clone(),
            Duration::from_secs(self.config.notify_timeout_secs),
        )
    }

    pub fn reminder_scheduler(&self) -> ReminderScheduler {
        ReminderScheduler::new(
            self.reminder_repo.clone(),
            self.config.reminder_hours_before,
            self.config.business_timezone,
            self.config.company_name.clone(),
        )
    }

    pub fn email_renderer(&self) -> EmailRenderer {
        EmailRenderer::new(
            self.templates.clone(),
            self.config.company_name.clone(),
            self.config.business_timezone,
        )
    }

    pub fn lifecycle(&self) -> BookingLifecycle {
        BookingLifecycle::new(LifecycleDeps {
            bookings: self.booking_repo.clone(),
            staff: self.staff_repo.clone(),
            assignments: self.assignment_repo.clone(),
            notifications: self.notification_repo.clone(),
            accounting: self.accounting.clone(),
            reminders: self.reminder_scheduler(),
            dispatcher: self.dispatcher(),
            renderer: self.email_renderer(),
            company: self.config.company_name.clone(),
            timezone: self.config.business_timezone,
        })
    }

    pub fn payment_sync(&self) -> PaymentSync {
        PaymentSync::new(
            self.booking_repo.clone(),
            self.notification_repo.clone(),
            self.accounting.clone(),
        )
    }
}
