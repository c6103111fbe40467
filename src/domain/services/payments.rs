use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, info_span, Instrument};

use crate::domain::models::invoice::InvoiceStatus;
use crate::domain::models::notification::{Notification, NotificationKind};
use crate::domain::ports::{AccountingProvider, BookingRepository, NotificationRepository};
use crate::error::AppError;

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct PaymentSyncReport {
    pub checked: usize,
    pub paid: usize,
    pub failed: usize,
}

/// Polls the accounting provider for unpaid invoiced bookings and records payments.
#[derive(Clone)]
pub struct PaymentSync {
    bookings: Arc<dyn BookingRepository>,
    notifications: Arc<dyn NotificationRepository>,
    accounting: Arc<dyn AccountingProvider>,
}

impl PaymentSync {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        notifications: Arc<dyn NotificationRepository>,
        accounting: Arc<dyn AccountingProvider>,
    ) -> Self {
        Self { bookings, notifications, accounting }
    }

    pub async fn run_once(&self, limit: i64) -> Result<PaymentSyncReport, AppError> {
        let mut report = PaymentSyncReport::default();
        if !self.accounting.is_enabled() {
            return Ok(report);
        }

        let pending = self.bookings.claim_payment_checks(Utc::now(), limit).await?;
        for booking in pending {
            let Some(invoice_id) = booking.invoice_id.clone() else {
                continue;
            };
            report.checked += 1;

            let span = info_span!("payment_check", booking_id = %booking.id, invoice_id = %invoice_id);
            let outcome = async {
                match self.accounting.invoice_status(&invoice_id).await? {
                    InvoiceStatus::Paid => {
                        let updated = self.bookings.mark_paid(&booking.id).await?;
                        info!("Invoice paid");

                        let notification = Notification::new(
                            NotificationKind::PaymentReceived,
                            Some(&updated.id),
                            updated.customer_id,
                            format!("Payment received from {} (${:.2})", updated.customer_name, updated.billable_amount()),
                            json!({ "invoice_id": invoice_id, "amount": updated.billable_amount() }),
                        );
                        if let Err(e) = self.notifications.create(&notification).await {
                            error!("Failed to record payment notification: {:?}", e);
                        }
                        Ok::<bool, AppError>(true)
                    }
                    InvoiceStatus::Open | InvoiceStatus::Voided => Ok(false),
                }
            }
            .instrument(span)
            .await;

            match outcome {
                Ok(true) => report.paid += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(booking_id = %booking.id, "Payment status check failed: {}", e);
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}
