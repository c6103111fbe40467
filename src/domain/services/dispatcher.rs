use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::domain::models::message_log::{EmailLog, OutboundEmail, SmsLog};
use crate::domain::ports::{EmailService, MessageLogRepository, SmsService};
use crate::domain::services::phone::to_e164;
use crate::error::AppError;

/// Sends SMS and email through the configured providers. Each attempt is bounded
/// by a timeout and written to the message logs whatever its outcome.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sms: Arc<dyn SmsService>,
    email: Arc<dyn EmailService>,
    logs: Arc<dyn MessageLogRepository>,
    timeout: Duration,
}

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, String>
where
    F: Future<Output = Result<T, AppError>>,
{
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}s", limit.as_secs())),
    }
}

impl NotificationDispatcher {
    pub fn new(
        sms: Arc<dyn SmsService>,
        email: Arc<dyn EmailService>,
        logs: Arc<dyn MessageLogRepository>,
        timeout: Duration,
    ) -> Self {
        Self { sms, email, logs, timeout }
    }

    pub async fn send_sms(&self, booking_id: Option<&str>, phone: &str, body: &str) -> Result<String, AppError> {
        let outcome = match to_e164(phone) {
            Some(to) => bounded(self.timeout, self.sms.send(&to, body)).await,
            None => Err(format!("invalid phone number '{}'", phone)),
        };

        let log = SmsLog::new(booking_id, phone, body, &outcome);
        if let Err(e) = self.logs.log_sms(&log).await {
            error!("Failed to write sms log for {}: {:?}", phone, e);
        }

        match outcome {
            Ok(provider_id) => {
                info!(booking_id = ?booking_id, provider_id = %provider_id, "sms sent");
                Ok(provider_id)
            }
            Err(msg) => {
                warn!(booking_id = ?booking_id, recipient = %phone, error = %msg, "sms failed");
                Err(AppError::Delivery(format!("SMS to {}: {}", phone, msg)))
            }
        }
    }

    pub async fn send_email(&self, booking_id: Option<&str>, email: &OutboundEmail) -> Result<(), AppError> {
        let outcome = bounded(self.timeout, self.email.send(email)).await;

        let log = EmailLog::new(booking_id, &email.to, &email.subject, &outcome);
        if let Err(e) = self.logs.log_email(&log).await {
            error!("Failed to write email log for {}: {:?}", email.to, e);
        }

        match outcome {
            Ok(()) => {
                info!(booking_id = ?booking_id, subject = %email.subject, "email sent");
                Ok(())
            }
            Err(msg) => {
                warn!(booking_id = ?booking_id, recipient = %email.to, error = %msg, "email failed");
                Err(AppError::Delivery(format!("Email to {}: {}", email.to, msg)))
            }
        }
    }
}
