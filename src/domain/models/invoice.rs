use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the accounting provider needs to bill one booking.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRequest {
    pub booking_id: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub description: String,
    pub amount: f64,
    pub service_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedInvoice {
    pub invoice_id: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Open,
    Paid,
    Voided,
}
