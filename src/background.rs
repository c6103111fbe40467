use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use governor::DefaultDirectRateLimiter;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::domain::models::reminder::ScheduledReminder;
use crate::domain::ports::ReminderRepository;
use crate::domain::services::dispatcher::NotificationDispatcher;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ReminderRunReport {
    pub claimed: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends due reminders, paced by the process-wide SMS limiter so the provider
/// never sees more than the configured messages per second.
pub struct ReminderWorker {
    reminders: Arc<dyn ReminderRepository>,
    dispatcher: NotificationDispatcher,
    limiter: Arc<DefaultDirectRateLimiter>,
    batch_size: i64,
    lease: chrono::Duration,
}

impl ReminderWorker {
    pub fn new(state: &AppState) -> Self {
        Self {
            reminders: state.reminder_repo.clone(),
            dispatcher: state.dispatcher(),
            limiter: state.sms_limiter.clone(),
            batch_size: state.config.reminder_batch_size,
            lease: chrono::Duration::seconds(state.config.reminder_lease_secs.max(1)),
        }
    }

    /// Claims one bounded batch of due reminders and attempts each once.
    /// A reminder left in `processing` longer than the lease is claimed again.
    pub async fn run_once(&self) -> Result<ReminderRunReport, AppError> {
        let span = info_span!("reminder_batch", batch_size = self.batch_size);
        async {
            let now = Utc::now();
            let due = self.reminders.claim_due(now, now - self.lease, self.batch_size).await?;
            let mut report = ReminderRunReport { claimed: due.len(), ..Default::default() };
            if due.is_empty() {
                return Ok(report);
            }
            info!("Claimed {} due reminders", due.len());

            for reminder in due {
                self.limiter.until_ready().await;
                if self.deliver(&reminder).await {
                    report.sent += 1;
                } else {
                    report.failed += 1;
                }
            }

            info!(sent = report.sent, failed = report.failed, "Reminder batch finished");
            Ok(report)
        }
        .instrument(span)
        .await
    }

    async fn deliver(&self, reminder: &ScheduledReminder) -> bool {
        let span = info_span!("reminder", reminder_id = %reminder.id, booking_id = %reminder.booking_id);
        async {
            match self.dispatcher.send_sms(Some(&reminder.booking_id), &reminder.phone, &reminder.message).await {
                Ok(_) => {
                    if let Err(e) = self.reminders.mark_sent(&reminder.id).await {
                        error!("Reminder sent but could not be marked: {:?}", e);
                    }
                    true
                }
                Err(e) => {
                    warn!("Reminder delivery failed: {}", e);
                    if let Err(up_err) = self.reminders.mark_failed(&reminder.id, &e.to_string()).await {
                        error!("Failed to mark reminder as failed: {:?}", up_err);
                    }
                    false
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Long-running loop: one reminder batch per poll, payment sync every N polls.
pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background worker...");

    let worker = ReminderWorker::new(&state);
    let payment_sync = state.payment_sync();
    let poll = Duration::from_secs(state.config.worker_poll_secs.max(1));
    let sync_every = state.config.payment_sync_every.max(1);
    let mut polls: u32 = 0;

    loop {
        if let Err(e) = worker.run_once().await {
            error!("Reminder batch failed: {:?}", e);
        }

        polls = polls.wrapping_add(1);
        if polls % sync_every == 0 {
            match payment_sync.run_once(state.config.reminder_batch_size).await {
                Ok(report) if report.checked > 0 => {
                    info!(checked = report.checked, paid = report.paid, failed = report.failed, "Payment sync finished");
                }
                Ok(_) => {}
                Err(e) => error!("Payment sync failed: {:?}", e),
            }
        }

        sleep(poll).await;
    }
}

/// Periodically forgets public-form clients whose rate limit has replenished.
pub async fn start_limiter_pruning(state: Arc<AppState>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    loop {
        ticker.tick().await;
        let tracked = state.prune_rate_limiters();
        debug!(tracked, "Pruned public rate limiter");
    }
}
