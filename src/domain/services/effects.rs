use serde::{Serialize, Serializer};
use std::fmt;
use tracing::warn;

use crate::error::AppError;

/// A side effect attempted after a lifecycle transaction committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    CustomerSms,
    CustomerEmail,
    AdminEmail { staff_id: i64 },
    StaffSms { staff_id: i64 },
    StaffEmail { staff_id: i64 },
    LoadRecipients,
    ScheduleReminder,
    CancelReminders,
    FeedNotification,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::CustomerSms => f.write_str("customer_sms"),
            Effect::CustomerEmail => f.write_str("customer_email"),
            Effect::AdminEmail { staff_id } => write!(f, "admin_email:{}", staff_id),
            Effect::StaffSms { staff_id } => write!(f, "staff_sms:{}", staff_id),
            Effect::StaffEmail { staff_id } => write!(f, "staff_email:{}", staff_id),
            Effect::LoadRecipients => f.write_str("load_recipients"),
            Effect::ScheduleReminder => f.write_str("schedule_reminder"),
            Effect::CancelReminders => f.write_str("cancel_reminders"),
            Effect::FeedNotification => f.write_str("feed_notification"),
        }
    }
}

impl Serialize for Effect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectReport {
    pub effect: Effect,
    pub ok: bool,
    pub error: Option<String>,
}

/// Collects the outcome of each post-commit effect. Failures are logged here and
/// never propagated.
#[derive(Debug, Default)]
pub struct PostCommit {
    reports: Vec<EffectReport>,
}

impl PostCommit {
    pub fn record<T>(&mut self, effect: Effect, result: Result<T, AppError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.reports.push(EffectReport { effect, ok: true, error: None });
                Some(value)
            }
            Err(e) => {
                warn!(effect = %effect, error = %e, "post-commit effect failed");
                self.reports.push(EffectReport { effect, ok: false, error: Some(e.to_string()) });
                None
            }
        }
    }

    pub fn finish<T>(self, value: T) -> Committed<T> {
        Committed { value, effects: self.reports }
    }
}

/// The durable result of a lifecycle operation plus what happened afterwards.
#[derive(Debug, Serialize)]
pub struct Committed<T> {
    pub value: T,
    pub effects: Vec<EffectReport>,
}

impl<T> Committed<T> {
    pub fn failed_effects(&self) -> impl Iterator<Item = &EffectReport> {
        self.effects.iter().filter(|r| !r.ok)
    }

    pub fn effect(&self, effect: Effect) -> Option<&EffectReport> {
        self.effects.iter().find(|r| r.effect == effect)
    }
}
