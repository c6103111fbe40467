use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, info_span, warn, Instrument};

use crate::domain::models::assignment::AssignedStaff;
use crate::domain::models::booking::{
    Booking, BookingDraft, BookingPatch, BookingSubmission, ManualBookingRequest, StatusLabel,
};
use crate::domain::models::history::HistoryEntry;
use crate::domain::models::invoice::InvoiceRequest;
use crate::domain::models::notification::{Notification, NotificationKind};
use crate::domain::models::staff::StaffRole;
use crate::domain::ports::{
    AccountingProvider, AssignmentRepository, BookingRepository, NotificationRepository, StaffRepository,
};
use crate::domain::services::dispatcher::NotificationDispatcher;
use crate::domain::services::effects::{Committed, Effect, PostCommit};
use crate::domain::services::messages::{self, EmailRenderer};
use crate::domain::services::pricing::estimate_price;
use crate::domain::services::reminders::ReminderScheduler;
use crate::error::AppError;

/// Collaborators of the lifecycle engine.
pub struct LifecycleDeps {
    pub bookings: Arc<dyn BookingRepository>,
    pub staff: Arc<dyn StaffRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub accounting: Arc<dyn AccountingProvider>,
    pub reminders: ReminderScheduler,
    pub dispatcher: NotificationDispatcher,
    pub renderer: EmailRenderer,
    pub company: String,
    pub timezone: Tz,
}

#[derive(Debug, Serialize)]
pub struct SkippedItem {
    pub booking_id: String,
    pub reason: String,
}

/// Outcome of a batch operation. Missing or conflicting items are skipped and the
/// batch continues; storage failures abort it.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub processed: Vec<String>,
    pub skipped: Vec<SkippedItem>,
    pub failed_effects: usize,
}

impl BatchReport {
    fn absorb<T>(&mut self, booking_id: &str, result: Result<Committed<T>, AppError>) -> Result<(), AppError> {
        match result {
            Ok(committed) => {
                self.failed_effects += committed.failed_effects().count();
                self.processed.push(booking_id.to_string());
                Ok(())
            }
            Err(e) if e.is_skippable() => {
                warn!(booking_id = %booking_id, "Skipping batch item: {}", e);
                self.skipped.push(SkippedItem { booking_id: booking_id.to_string(), reason: e.to_string() });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// The only writer of booking state. Every operation commits its transaction
/// first and then runs its side effects, each reported independently.
pub struct BookingLifecycle {
    bookings: Arc<dyn BookingRepository>,
    staff: Arc<dyn StaffRepository>,
    assignments: Arc<dyn AssignmentRepository>,
    notifications: Arc<dyn NotificationRepository>,
    accounting: Arc<dyn AccountingProvider>,
    reminders: ReminderScheduler,
    dispatcher: NotificationDispatcher,
    renderer: EmailRenderer,
    company: String,
    timezone: Tz,
}

impl BookingLifecycle {
    pub fn new(deps: LifecycleDeps) -> Self {
        Self {
            bookings: deps.bookings,
            staff: deps.staff,
            assignments: deps.assignments,
            notifications: deps.notifications,
            accounting: deps.accounting,
            reminders: deps.reminders,
            dispatcher: deps.dispatcher,
            renderer: deps.renderer,
            company: deps.company,
            timezone: deps.timezone,
        }
    }

    async fn load(&self, id: &str) -> Result<Booking, AppError> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    async fn sms_customer(&self, effects: &mut PostCommit, booking: &Booking, body: &str) {
        if let Some(phone) = booking.phone.as_deref() {
            let result = self.dispatcher.send_sms(Some(&booking.id), phone, body).await;
            effects.record(Effect::CustomerSms, result);
        }
    }

    async fn sms_staff(&self, effects: &mut PostCommit, booking: &Booking, staff: &[AssignedStaff], body: &str) {
        for member in staff {
            if let Some(phone) = member.phone.as_deref() {
                let result = self.dispatcher.send_sms(Some(&booking.id), phone, body).await;
                effects.record(Effect::StaffSms { staff_id: member.staff_id }, result);
            }
        }
    }

    async fn feed(&self, effects: &mut PostCommit, kind: NotificationKind, booking: &Booking, message: String, metadata: Value) {
        let notification = Notification::new(kind, Some(&booking.id), booking.customer_id, message, metadata);
        let result = self.notifications.create(&notification).await;
        effects.record(Effect::FeedNotification, result);
    }

    /// Assigned staff for notifications, recorded as an effect when the lookup fails.
    async fn assigned_staff(&self, effects: &mut PostCommit, booking_id: &str) -> Vec<AssignedStaff> {
        let result = self.assignments.list_for_booking(booking_id).await;
        match result {
            Ok(staff) => staff,
            Err(e) => {
                effects.record::<()>(Effect::LoadRecipients, Err(e));
                Vec::new()
            }
        }
    }

    // ---- creation ----

    pub async fn create_booking(&self, submission: BookingSubmission) -> Result<Committed<Booking>, AppError> {
        let today = Utc::now().with_timezone(&self.timezone).date_naive();
        let draft = submission.into_draft(today)?;
        self.persist_new(draft, None).await
    }

    pub async fn create_manual(&self, request: ManualBookingRequest, changed_by: Option<i64>) -> Result<Committed<Booking>, AppError> {
        let draft = request.into_draft()?;
        self.persist_new(draft, changed_by).await
    }

    async fn persist_new(&self, draft: BookingDraft, changed_by: Option<i64>) -> Result<Committed<Booking>, AppError> {
        let price = match draft.price_override {
            Some(price) => price,
            None => estimate_price(draft.service_type, draft.bedrooms, draft.frequency)?,
        };

        let booking = Booking::new(&draft, price);
        let history = HistoryEntry::new(
            None,
            StatusLabel::Scheduled.as_str(),
            format!("Booking created via {}", draft.source),
            changed_by,
        );
        let saved = self.bookings.create(&draft.contact, &booking, &history).await?;

        let span = info_span!("booking_created", booking_id = %saved.id);
        let committed = async move {
            info!(source = %saved.source, price = saved.estimated_price, "Booking committed");
            let mut effects = PostCommit::default();

            if let Some(email) = saved.email.as_deref() {
                let result = match self.renderer.customer_confirmation(&saved, email) {
                    Ok(message) => self.dispatcher.send_email(Some(&saved.id), &message).await,
                    Err(e) => Err(e),
                };
                effects.record(Effect::CustomerEmail, result);
            }
            self.sms_customer(&mut effects, &saved, &messages::confirmation_sms(&saved, &self.company)).await;

            match self.staff.list_active_by_roles(&[StaffRole::Admin, StaffRole::Manager]).await {
                Ok(admins) => {
                    for admin in admins {
                        let Some(to) = admin.email.as_deref() else { continue };
                        let result = match self.renderer.admin_alert(&saved, to) {
                            Ok(message) => self.dispatcher.send_email(Some(&saved.id), &message).await,
                            Err(e) => Err(e),
                        };
                        effects.record(Effect::AdminEmail { staff_id: admin.id }, result);
                    }
                }
                Err(e) => {
                    effects.record::<()>(Effect::LoadRecipients, Err(e));
                }
            }

            self.feed(
                &mut effects,
                NotificationKind::BookingCreated,
                &saved,
                format!("New booking from {} for {}", saved.customer_name, messages::format_date(saved.appointment_date)),
                json!({ "source": saved.source, "service_type": saved.service_type, "estimated_price": saved.estimated_price }),
            )
            .await;

            if saved.phone.is_some() {
                let result = self.reminders.schedule(&saved, None).await;
                effects.record(Effect::ScheduleReminder, result);
            }

            effects.finish(saved)
        }
        .instrument(span)
        .await;

        Ok(committed)
    }

    // ---- reschedule ----

    pub async fn reschedule(
        &self,
        id: &str,
        date: NaiveDate,
        time: NaiveTime,
        reason: Option<&str>,
        changed_by: Option<i64>,
    ) -> Result<Committed<Booking>, AppError> {
        let booking = self.load(id).await?;
        if booking.is_cancelled() {
            return Err(AppError::Conflict("Cannot reschedule a cancelled booking".into()));
        }

        let history = HistoryEntry::new(
            Some(&booking.status_label),
            StatusLabel::Scheduled.as_str(),
            format!("Rescheduled: {}", reason.unwrap_or("No reason provided")),
            changed_by,
        );
        let updated = self.bookings.reschedule(id, date, time, &history).await?;
        info!(booking_id = %id, from = %booking.appointment_date, to = %date, "Booking rescheduled");

        let mut effects = PostCommit::default();

        let cancelled = self.reminders.cancel(id, "Rescheduled").await;
        effects.record(Effect::CancelReminders, cancelled);
        if updated.phone.is_some() {
            let scheduled = self.reminders.schedule(&updated, None).await;
            effects.record(Effect::ScheduleReminder, scheduled);
        }

        self.sms_customer(&mut effects, &updated, &messages::reschedule_sms(&updated, &self.company)).await;
        let staff = self.assigned_staff(&mut effects, id).await;
        self.sms_staff(&mut effects, &updated, &staff, &messages::staff_reschedule_sms(&updated)).await;

        self.feed(
            &mut effects,
            NotificationKind::BookingUpdated,
            &updated,
            format!(
                "Booking for {} rescheduled to {} {}",
                updated.customer_name,
                messages::format_date(updated.appointment_date),
                messages::format_time(updated.appointment_time)
            ),
            json!({
                "previous_date": booking.appointment_date,
                "previous_time": booking.appointment_time,
                "reason": reason,
            }),
        )
        .await;

        Ok(effects.finish(updated))
    }

    pub async fn bulk_reschedule(
        &self,
        ids: &[String],
        date: NaiveDate,
        time: NaiveTime,
        reason: Option<&str>,
        changed_by: Option<i64>,
    ) -> Result<BatchReport, AppError> {
        let mut report = BatchReport::default();
        for id in ids {
            let result = self.reschedule(id, date, time, reason, changed_by).await;
            report.absorb(id, result)?;
        }
        Ok(report)
    }

    // ---- cancel ----

    /// Rejects a booking that is already cancelled with a Conflict.
    pub async fn cancel(&self, id: &str, reason: Option<&str>, changed_by: Option<i64>) -> Result<Committed<Booking>, AppError> {
        let booking = self.load(id).await?;
        if booking.is_cancelled() {
            return Err(AppError::Conflict("Booking is already cancelled".into()));
        }

        let previously_assigned = self.assignments.list_for_booking(id).await?;
        let reason = reason.unwrap_or("No reason provided");
        let history = HistoryEntry::new(
            Some(&booking.status_label),
            StatusLabel::Cancelled.as_str(),
            format!("Cancelled: {}", reason),
            changed_by,
        );
        let cancelled = self.bookings.cancel(id, &history).await?;
        info!(booking_id = %id, reason, "Booking cancelled");

        let mut effects = PostCommit::default();

        let result = self.reminders.cancel(id, &format!("Booking cancelled: {}", reason)).await;
        effects.record(Effect::CancelReminders, result);

        self.sms_customer(&mut effects, &cancelled, &messages::cancellation_sms(&cancelled, &self.company)).await;
        self.sms_staff(&mut effects, &cancelled, &previously_assigned, &messages::staff_cancellation_sms(&cancelled))
            .await;

        self.feed(
            &mut effects,
            NotificationKind::BookingCancelled,
            &cancelled,
            format!("Booking for {} was cancelled", cancelled.customer_name),
            json!({ "reason": reason, "released_staff": previously_assigned.len() }),
        )
        .await;

        Ok(effects.finish(cancelled))
    }

    /// Already-cancelled bookings are reported as skipped and the batch continues.
    pub async fn bulk_cancel(&self, ids: &[String], reason: Option<&str>, changed_by: Option<i64>) -> Result<BatchReport, AppError> {
        let mut report = BatchReport::default();
        for id in ids {
            let result = self.cancel(id, reason, changed_by).await;
            report.absorb(id, result)?;
        }
        Ok(report)
    }

    // ---- field updates ----

    pub async fn update_fields(&self, id: &str, patch: BookingPatch, changed_by: Option<i64>) -> Result<Committed<Booking>, AppError> {
        let patch = patch.normalize()?;
        let before = self.load(id).await?;

        if before.is_cancelled() && patch.touches_lifecycle() {
            return Err(AppError::Conflict(
                "Cannot change the schedule or status of a cancelled booking".into(),
            ));
        }

        let new_label = patch.status_label.filter(|label| label.as_str() != before.status_label);
        let history = new_label.map(|label| {
            HistoryEntry::new(Some(&before.status_label), label.as_str(), "Status updated".to_string(), changed_by)
        });

        // The repository drops the team inside the patch transaction, so capture it first.
        let released = if patch.cancels() {
            self.assignments.list_for_booking(id).await?
        } else {
            Vec::new()
        };

        let updated = self.bookings.apply_patch(id, &patch, history.as_ref()).await?;
        let fields = patch.fields();
        let became_cancelled = !before.is_cancelled() && updated.is_cancelled();
        info!(booking_id = %id, fields = ?fields, cancelled = became_cancelled, "Booking updated");

        let mut effects = PostCommit::default();
        let mut customer_messages = Vec::new();

        if let Some(label) = new_label {
            customer_messages.push(messages::status_update_sms(&updated, label, &self.company));
        }
        if became_cancelled {
            let result = self.reminders.cancel(id, "Booking cancelled").await;
            effects.record(Effect::CancelReminders, result);
        }

        let schedule_changed = updated.appointment_date != before.appointment_date
            || updated.appointment_time != before.appointment_time;
        if schedule_changed && !updated.is_cancelled() {
            let cancelled = self.reminders.cancel(id, "Rescheduled").await;
            effects.record(Effect::CancelReminders, cancelled);
            if updated.phone.is_some() {
                let scheduled = self.reminders.schedule(&updated, None).await;
                effects.record(Effect::ScheduleReminder, scheduled);
            }
            customer_messages.push(messages::schedule_update_sms(&updated));
        }

        if !customer_messages.is_empty() {
            self.sms_customer(&mut effects, &updated, &customer_messages.join(" ")).await;
        }
        if became_cancelled {
            self.sms_staff(&mut effects, &updated, &released, &messages::staff_cancellation_sms(&updated)).await;
        } else if !customer_messages.is_empty() {
            let staff = self.assigned_staff(&mut effects, id).await;
            self.sms_staff(&mut effects, &updated, &staff, &messages::staff_booking_updated_sms(&updated)).await;
        }

        let kind = if became_cancelled { NotificationKind::BookingCancelled } else { NotificationKind::BookingUpdated };
        self.feed(
            &mut effects,
            kind,
            &updated,
            format!("Booking for {} updated: {}", updated.customer_name, fields.join(", ")),
            json!({ "fields": fields, "status_label": updated.status_label, "released_staff": released.len() }),
        )
        .await;

        Ok(effects.finish(updated))
    }

    pub async fn bulk_update_status(&self, ids: &[String], label: StatusLabel, changed_by: Option<i64>) -> Result<BatchReport, AppError> {
        let mut report = BatchReport::default();
        for id in ids {
            let patch = BookingPatch { status_label: Some(label), ..Default::default() };
            let result = self.update_fields(id, patch, changed_by).await;
            report.absorb(id, result)?;
        }
        Ok(report)
    }

    // ---- staff assignment ----

    pub async fn assign_staff(
        &self,
        id: &str,
        staff_ids: &[i64],
        role: &str,
        notify: bool,
    ) -> Result<Committed<Vec<AssignedStaff>>, AppError> {
        let mut seen = HashSet::new();
        let ids: Vec<i64> = staff_ids.iter().copied().filter(|sid| *sid > 0 && seen.insert(*sid)).collect();
        if ids.is_empty() {
            return Err(AppError::Validation("At least one valid staff id is required".into()));
        }
        let role = role.trim();
        if role.is_empty() {
            return Err(AppError::Validation("Assignment role cannot be empty".into()));
        }

        let booking = self.load(id).await?;
        if booking.is_cancelled() {
            return Err(AppError::Conflict("Cannot assign staff to a cancelled booking".into()));
        }

        let found = self.staff.find_by_ids(&ids).await?;
        let missing: Vec<String> = ids
            .iter()
            .filter(|sid| !found.iter().any(|s| s.id == **sid))
            .map(|sid| sid.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::NotFound(format!("Staff not found: {}", missing.join(", "))));
        }
        if let Some(inactive) = found.iter().find(|s| !s.is_active) {
            return Err(AppError::Validation(format!("{} is not an active staff member", inactive.full_name())));
        }

        let previous: HashSet<i64> = self.assignments.list_for_booking(id).await?.into_iter().map(|a| a.staff_id).collect();
        let assigned = self.assignments.replace_all(id, &ids, role).await?;
        info!(booking_id = %id, staff = ?ids, role, "Staff assigned");

        let mut effects = PostCommit::default();
        if notify {
            for member in assigned.iter().filter(|a| !previous.contains(&a.staff_id)) {
                let Some(staff) = found.iter().find(|s| s.id == member.staff_id) else { continue };

                if let Some(to) = staff.email.as_deref() {
                    let result = match self.renderer.staff_assignment(&booking, staff, to) {
                        Ok(message) => self.dispatcher.send_email(Some(id), &message).await,
                        Err(e) => Err(e),
                    };
                    effects.record(Effect::StaffEmail { staff_id: staff.id }, result);
                }
                if let Some(phone) = staff.phone.as_deref() {
                    let result = self
                        .dispatcher
                        .send_sms(Some(id), phone, &messages::staff_assignment_sms(&booking))
                        .await;
                    effects.record(Effect::StaffSms { staff_id: staff.id }, result);
                }
            }

            let names: Vec<String> = assigned.iter().map(AssignedStaff::full_name).collect();
            self.sms_customer(&mut effects, &booking, &messages::team_assigned_sms(&booking, &names, &self.company))
                .await;
            self.feed(
                &mut effects,
                NotificationKind::StaffAssignment,
                &booking,
                format!("{} assigned to booking for {}", messages::join_names(&names), booking.customer_name),
                json!({ "staff_ids": ids, "assignment_role": role }),
            )
            .await;
        }

        Ok(effects.finish(assigned))
    }

    pub async fn unassign_staff(&self, id: &str, staff_id: i64) -> Result<Committed<()>, AppError> {
        let booking = self.load(id).await?;
        let staff = self
            .staff
            .find_by_id(staff_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff {} not found", staff_id)))?;

        if !self.assignments.remove(id, staff_id).await? {
            return Err(AppError::NotFound(format!("{} is not assigned to booking {}", staff.full_name(), id)));
        }
        info!(booking_id = %id, staff_id, "Staff unassigned");

        let mut effects = PostCommit::default();
        if let Some(phone) = staff.phone.as_deref() {
            let result = self.dispatcher.send_sms(Some(id), phone, &messages::staff_unassigned_sms(&booking)).await;
            effects.record(Effect::StaffSms { staff_id }, result);
        }
        if !booking.is_cancelled() {
            self.sms_customer(&mut effects, &booking, &messages::customer_team_changed_sms(&booking, &self.company))
                .await;
        }
        self.feed(
            &mut effects,
            NotificationKind::StaffAssignment,
            &booking,
            format!("{} unassigned from booking for {}", staff.full_name(), booking.customer_name),
            json!({ "staff_id": staff_id }),
        )
        .await;

        Ok(effects.finish(()))
    }

    // ---- other actions ----

    /// Sends the reminder text right away. The scheduled reminder is left untouched.
    pub async fn send_reminder(&self, id: &str) -> Result<Committed<()>, AppError> {
        let booking = self.load(id).await?;
        if booking.is_cancelled() {
            return Err(AppError::Conflict("Cannot send a reminder for a cancelled booking".into()));
        }
        if booking.phone.is_none() {
            return Err(AppError::Validation("Booking has no phone number".into()));
        }

        let mut effects = PostCommit::default();
        self.sms_customer(&mut effects, &booking, &messages::reminder_sms(&booking, &self.company)).await;
        Ok(effects.finish(()))
    }

    pub async fn delete_bookings(&self, ids: &[String], changed_by: Option<i64>) -> Result<BatchReport, AppError> {
        let mut report = BatchReport::default();
        for id in ids {
            let result = self.delete_one(id, changed_by).await;
            report.absorb(id, result)?;
        }
        Ok(report)
    }

    async fn delete_one(&self, id: &str, changed_by: Option<i64>) -> Result<Committed<()>, AppError> {
        let booking = self.load(id).await?;
        let history = HistoryEntry::new(Some(&booking.status_label), "deleted", "Booking deleted".to_string(), changed_by);
        self.bookings.delete(id, &history).await?;
        info!(booking_id = %id, "Booking deleted");

        let mut effects = PostCommit::default();
        self.feed(
            &mut effects,
            NotificationKind::BookingUpdated,
            &booking,
            format!("Booking for {} was deleted", booking.customer_name),
            json!({ "deleted": true, "appointment_date": booking.appointment_date }),
        )
        .await;
        Ok(effects.finish(()))
    }

    pub async fn create_invoice(&self, id: &str) -> Result<Committed<Booking>, AppError> {
        if !self.accounting.is_enabled() {
            return Err(AppError::Validation("Invoicing is not configured".into()));
        }
        let booking = self.load(id).await?;
        if booking.is_cancelled() {
            return Err(AppError::Conflict("Cannot invoice a cancelled booking".into()));
        }
        if let Some(existing) = &booking.invoice_id {
            return Err(AppError::Conflict(format!("Booking already has invoice {}", existing)));
        }

        let request = InvoiceRequest {
            booking_id: booking.id.clone(),
            customer_name: booking.customer_name.clone(),
            customer_email: booking.email.clone(),
            description: format!("{} cleaning - {}", booking.service_name(), booking.full_address()),
            amount: booking.billable_amount(),
            service_date: booking.appointment_date,
        };
        let invoice = self.accounting.create_invoice(&request).await?;
        let updated = self.bookings.set_invoice(id, &invoice.invoice_id).await?;
        info!(booking_id = %id, invoice_id = %invoice.invoice_id, "Invoice created");

        let mut effects = PostCommit::default();
        self.feed(
            &mut effects,
            NotificationKind::BookingUpdated,
            &updated,
            format!("Invoice {} created for {}", invoice.invoice_id, updated.customer_name),
            json!({ "invoice_id": invoice.invoice_id, "total": invoice.total }),
        )
        .await;
        Ok(effects.finish(updated))
    }
}
