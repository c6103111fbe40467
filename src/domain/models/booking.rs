use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::domain::models::customer::CustomerContact;
use crate::domain::services::phone::normalize_phone;
use crate::error::AppError;

text_enum!(
    /// Coarse lifecycle status.
    BookingStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

text_enum!(
    /// Fine-grained workflow state. `Cancelled` is terminal.
    StatusLabel {
        Scheduled => "scheduled",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

text_enum!(PaymentStatus {
    Unpaid => "unpaid",
    Paid => "paid",
    Refunded => "refunded",
});

text_enum!(ServiceType {
    Regular => "regular",
    Deep => "deep",
    Move => "move",
    Onetime => "onetime",
});

text_enum!(Frequency {
    Weekly => "weekly",
    Biweekly => "biweekly",
    Monthly => "monthly",
    Onetime => "onetime",
});

text_enum!(PropertyType {
    House => "house",
    Apartment => "apartment",
    Condo => "condo",
    Townhouse => "townhouse",
});

text_enum!(BookingSource {
    Website => "website",
    Manual => "manual",
});

impl ServiceType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceType::Regular => "Regular",
            ServiceType::Deep => "Deep",
            ServiceType::Move => "Move-In/Move-Out",
            ServiceType::Onetime => "One-Time",
        }
    }

    pub fn default_duration_minutes(&self) -> i32 {
        match self {
            ServiceType::Regular => 120,
            ServiceType::Deep => 240,
            ServiceType::Move => 300,
            ServiceType::Onetime => 180,
        }
    }
}

impl StatusLabel {
    /// The coarse status implied by a workflow state.
    pub fn implied_status(&self) -> BookingStatus {
        match self {
            StatusLabel::Scheduled => BookingStatus::Confirmed,
            StatusLabel::InProgress => BookingStatus::Confirmed,
            StatusLabel::Completed => BookingStatus::Completed,
            StatusLabel::Cancelled => BookingStatus::Cancelled,
        }
    }
}

pub const ALLOWED_BEDROOMS: std::ops::RangeInclusive<i32> = 1..=5;
pub const ALLOWED_BATHROOMS: &[f64] = &[1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub customer_id: Option<i64>,
    pub customer_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub service_type: String,
    pub frequency: String,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub duration_minutes: i32,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub estimated_price: f64,
    pub final_price: Option<f64>,
    pub status: String,
    pub status_label: String,
    pub payment_status: String,
    pub invoice_id: Option<String>,
    /// Last time the payment sync asked the accounting provider about this invoice.
    pub payment_checked_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully validated booking request, ready to be persisted.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub contact: CustomerContact,
    pub service_type: ServiceType,
    pub frequency: Frequency,
    pub property_type: PropertyType,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: i32,
    pub price_override: Option<f64>,
    pub notes: Option<String>,
    pub source: BookingSource,
}

impl Booking {
    pub fn new(draft: &BookingDraft, estimated_price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: generate_booking_id(now),
            customer_id: None,
            customer_name: draft.contact.full_name(),
            email: draft.contact.email.clone(),
            phone: draft.contact.phone.clone(),
            service_type: draft.service_type.as_str().to_string(),
            frequency: draft.frequency.as_str().to_string(),
            property_type: draft.property_type.as_str().to_string(),
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            appointment_date: draft.date,
            appointment_time: draft.time,
            duration_minutes: draft.duration_minutes,
            address: draft.contact.address.clone().unwrap_or_default(),
            city: draft.contact.city.clone().unwrap_or_default(),
            state: draft.contact.state.clone().unwrap_or_default(),
            zip: draft.contact.zip.clone().unwrap_or_default(),
            estimated_price,
            final_price: None,
            status: BookingStatus::Pending.as_str().to_string(),
            status_label: StatusLabel::Scheduled.as_str().to_string(),
            payment_status: PaymentStatus::Unpaid.as_str().to_string(),
            invoice_id: None,
            payment_checked_at: None,
            notes: draft.notes.clone(),
            source: draft.source.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status_label(&self) -> Result<StatusLabel, AppError> {
        self.status_label.parse()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status_label == StatusLabel::Cancelled.as_str() || self.status == BookingStatus::Cancelled.as_str()
    }

    pub fn service_name(&self) -> &'static str {
        self.service_type
            .parse::<ServiceType>()
            .map(|s| s.display_name())
            .unwrap_or("Cleaning")
    }

    pub fn full_address(&self) -> String {
        format!("{}, {}, {} {}", self.address, self.city, self.state, self.zip)
    }

    /// The amount to bill: the final price once set, otherwise the estimate.
    pub fn billable_amount(&self) -> f64 {
        self.final_price.unwrap_or(self.estimated_price)
    }
}

/// Human-readable, time-prefixed identifier, e.g. `BK-202610161430-7F3KQ2`.
pub fn generate_booking_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(char::from)
        .filter(|c| c.is_ascii_alphanumeric())
        .take(6)
        .collect::<String>()
        .to_ascii_uppercase();

    format!("BK-{}-{}", now.format("%Y%m%d%H%M"), suffix)
}

pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (YYYY-MM-DD)".into()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, AppError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if normalize_phone(phone).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone");
        err.message = Some("Phone number must have 10 digits".into());
        Err(err)
    }
}

fn validate_zip(zip: &str) -> Result<(), ValidationError> {
    let zip = zip.trim();
    let bytes = zip.as_bytes();
    let valid = match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => bytes[5] == b'-' && bytes[..5].iter().chain(&bytes[6..]).all(u8::is_ascii_digit),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("zip");
        err.message = Some("ZIP code must be 12345 or 12345-6789".into());
        Err(err)
    }
}

fn validate_state(state: &str) -> Result<(), ValidationError> {
    let state = state.trim();
    if state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("state");
        err.message = Some("State must be a 2-letter code".into());
        Err(err)
    }
}

fn validate_bathrooms(bathrooms: f64) -> Result<f64, AppError> {
    if ALLOWED_BATHROOMS.iter().any(|b| (b - bathrooms).abs() < f64::EPSILON) {
        Ok(bathrooms)
    } else {
        Err(AppError::Validation("Bathrooms must be between 1 and 4 in half steps".into()))
    }
}

/// Payload of the public booking wizard.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingSubmission {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub last_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, max = 200, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
    #[validate(custom(function = "validate_zip"))]
    pub zip: String,
    pub service_type: String,
    pub frequency: String,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub date: String,
    pub time: String,
    #[validate(length(max = 1000, message = "Notes are limited to 1000 characters"))]
    pub notes: Option<String>,
}

impl BookingSubmission {
    /// Validates every field and resolves the enumerations. `today` is the
    /// current date in the business timezone.
    pub fn into_draft(self, today: NaiveDate) -> Result<BookingDraft, AppError> {
        self.validate()?;

        let service_type: ServiceType = self.service_type.parse()?;
        let frequency: Frequency = self.frequency.parse()?;
        let property_type: PropertyType = self.property_type.parse()?;

        if !ALLOWED_BEDROOMS.contains(&self.bedrooms) {
            return Err(AppError::Validation("Bedrooms must be between 1 and 5".into()));
        }
        let bathrooms = validate_bathrooms(self.bathrooms)?;

        let date = parse_date(&self.date)?;
        if date < today {
            return Err(AppError::Validation("Appointment date cannot be in the past".into()));
        }
        let time = parse_time(&self.time)?;

        let contact = CustomerContact {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: Some(self.email.trim().to_ascii_lowercase()),
            phone: normalize_phone(&self.phone),
            address: Some(self.address.trim().to_string()),
            city: Some(self.city.trim().to_string()),
            state: Some(self.state.trim().to_ascii_uppercase()),
            zip: Some(self.zip.trim().to_string()),
        };

        Ok(BookingDraft {
            contact,
            service_type,
            frequency,
            property_type,
            bedrooms: self.bedrooms,
            bathrooms,
            date,
            time,
            duration_minutes: service_type.default_duration_minutes(),
            price_override: None,
            notes: self.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            source: BookingSource::Website,
        })
    }
}

/// Staff-entered booking. Contact details are optional and past dates are accepted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ManualBookingRequest {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,
    #[validate(length(max = 50, message = "Last name is limited to 50 characters"))]
    #[serde(default)]
    pub last_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(custom(function = "validate_state"))]
    pub state: String,
    #[validate(custom(function = "validate_zip"))]
    pub zip: String,
    pub service_type: String,
    pub frequency: String,
    pub property_type: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub date: String,
    pub time: String,
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(length(max = 1000, message = "Notes are limited to 1000 characters"))]
    pub notes: Option<String>,
}

impl ManualBookingRequest {
    pub fn into_draft(self) -> Result<BookingDraft, AppError> {
        self.validate()?;

        let service_type: ServiceType = self.service_type.parse()?;
        let frequency: Frequency = self.frequency.parse()?;
        let property_type: PropertyType = self.property_type.parse()?;

        if !ALLOWED_BEDROOMS.contains(&self.bedrooms) {
            return Err(AppError::Validation("Bedrooms must be between 1 and 5".into()));
        }
        let bathrooms = validate_bathrooms(self.bathrooms)?;

        let duration_minutes = self.duration_minutes.unwrap_or(service_type.default_duration_minutes());
        if duration_minutes <= 0 {
            return Err(AppError::Validation("Duration must be positive".into()));
        }

        let contact = CustomerContact {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self
                .email
                .map(|e| e.trim().to_ascii_lowercase())
                .filter(|e| !e.is_empty()),
            phone: self.phone.as_deref().and_then(normalize_phone),
            address: Some(self.address.trim().to_string()),
            city: Some(self.city.trim().to_string()),
            state: Some(self.state.trim().to_ascii_uppercase()),
            zip: Some(self.zip.trim().to_string()),
        };

        Ok(BookingDraft {
            contact,
            service_type,
            frequency,
            property_type,
            bedrooms: self.bedrooms,
            bathrooms,
            date: parse_date(&self.date)?,
            time: parse_time(&self.time)?,
            duration_minutes,
            price_override: self.price,
            notes: self.notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            source: BookingSource::Manual,
        })
    }
}

fn optional_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_date(&s).map_err(serde::de::Error::custom)).transpose()
}

fn optional_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_time(&s).map_err(serde::de::Error::custom)).transpose()
}

/// Sparse update restricted to the updatable booking columns. Keys outside
/// this structure are ignored during deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingPatch {
    pub customer_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub appointment_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "optional_time")]
    pub appointment_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub estimated_price: Option<f64>,
    pub final_price: Option<f64>,
    pub status: Option<BookingStatus>,
    pub status_label: Option<StatusLabel>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

impl BookingPatch {
    /// Names of the columns this patch writes.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        let mut push = |present: bool, name: &'static str| {
            if present {
                fields.push(name);
            }
        };
        push(self.customer_name.is_some(), "customer_name");
        push(self.email.is_some(), "email");
        push(self.phone.is_some(), "phone");
        push(self.address.is_some(), "address");
        push(self.city.is_some(), "city");
        push(self.state.is_some(), "state");
        push(self.zip.is_some(), "zip");
        push(self.appointment_date.is_some(), "appointment_date");
        push(self.appointment_time.is_some(), "appointment_time");
        push(self.duration_minutes.is_some(), "duration_minutes");
        push(self.estimated_price.is_some(), "estimated_price");
        push(self.final_price.is_some(), "final_price");
        push(self.status.is_some(), "status");
        push(self.status_label.is_some(), "status_label");
        push(self.payment_status.is_some(), "payment_status");
        push(self.notes.is_some(), "notes");
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Whether the patch changes the schedule or the workflow state.
    pub fn touches_lifecycle(&self) -> bool {
        self.appointment_date.is_some()
            || self.appointment_time.is_some()
            || self.duration_minutes.is_some()
            || self.status.is_some()
            || self.status_label.is_some()
    }

    /// True once normalized when the patch moves the booking to cancelled.
    pub fn cancels(&self) -> bool {
        self.status_label == Some(StatusLabel::Cancelled) || self.status == Some(BookingStatus::Cancelled)
    }

    /// Validates values and normalizes contact fields in place.
    pub fn normalize(mut self) -> Result<Self, AppError> {
        if self.is_empty() {
            return Err(AppError::Validation("No valid fields to update".into()));
        }

        if let Some(name) = &self.customer_name
            && name.trim().is_empty()
        {
            return Err(AppError::Validation("Customer name cannot be empty".into()));
        }
        if let Some(email) = self.email.take() {
            let email = email.trim().to_ascii_lowercase();
            if !validator::ValidateEmail::validate_email(&email) {
                return Err(AppError::Validation("A valid email address is required".into()));
            }
            self.email = Some(email);
        }
        if let Some(phone) = self.phone.take() {
            let digits = normalize_phone(&phone)
                .ok_or_else(|| AppError::Validation("Phone number must have 10 digits".into()))?;
            self.phone = Some(digits);
        }
        if let Some(zip) = &self.zip {
            validate_zip(zip).map_err(|_| AppError::Validation("ZIP code must be 12345 or 12345-6789".into()))?;
        }
        if let Some(state) = self.state.take() {
            validate_state(&state).map_err(|_| AppError::Validation("State must be a 2-letter code".into()))?;
            self.state = Some(state.trim().to_ascii_uppercase());
        }
        if let Some(duration) = self.duration_minutes
            && duration <= 0
        {
            return Err(AppError::Validation("Duration must be positive".into()));
        }
        for price in [self.estimated_price, self.final_price].into_iter().flatten() {
            if !price.is_finite() || price < 0.0 {
                return Err(AppError::Validation("Prices cannot be negative".into()));
            }
        }

        // Cancellation is carried by both columns; the other statuses leave the label alone.
        match (self.status, self.status_label) {
            (Some(status), Some(label))
                if (status == BookingStatus::Cancelled) != (label == StatusLabel::Cancelled) =>
            {
                return Err(AppError::Validation(format!(
                    "Status '{}' contradicts status label '{}'",
                    status, label
                )));
            }
            (Some(BookingStatus::Cancelled), None) => self.status_label = Some(StatusLabel::Cancelled),
            (None, Some(label)) => self.status = Some(label.implied_status()),
            _ => {}
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission() -> BookingSubmission {
        serde_json::from_value(json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "Jane@Example.com",
            "phone": "(555) 123-4567",
            "address": "12 Main St",
            "city": "Springfield",
            "state": "il",
            "zip": "62701",
            "service_type": "regular",
            "frequency": "onetime",
            "property_type": "house",
            "bedrooms": 2,
            "bathrooms": 1.5,
            "date": "2030-05-01",
            "time": "09:30",
            "notes": "  gate code 1234 "
        }))
        .unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 4, 1).unwrap()
    }

    #[test]
    fn test_submission_normalizes_contact() {
        let draft = submission().into_draft(today()).unwrap();
        assert_eq!(draft.contact.email.as_deref(), Some("jane@example.com"));
        assert_eq!(draft.contact.phone.as_deref(), Some("5551234567"));
        assert_eq!(draft.contact.state.as_deref(), Some("IL"));
        assert_eq!(draft.notes.as_deref(), Some("gate code 1234"));
        assert_eq!(draft.duration_minutes, 120);
        assert_eq!(draft.source, BookingSource::Website);
    }

    #[test]
    fn test_submission_rejects_past_date() {
        let mut s = submission();
        s.date = "2030-03-31".into();
        let err = s.into_draft(today()).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("past")));
    }

    #[test]
    fn test_submission_rejects_bad_enums_and_counts() {
        let mut s = submission();
        s.service_type = "windows".into();
        assert!(matches!(s.into_draft(today()), Err(AppError::Validation(_))));

        let mut s = submission();
        s.bedrooms = 6;
        assert!(matches!(s.into_draft(today()), Err(AppError::Validation(_))));

        let mut s = submission();
        s.bathrooms = 1.25;
        assert!(matches!(s.into_draft(today()), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_submission_rejects_bad_contact() {
        let mut s = submission();
        s.phone = "555-1234".into();
        s.zip = "6270".into();
        let err = s.into_draft(today()).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("10 digits"));
                assert!(msg.contains("ZIP"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_booking_id_format() {
        let now = Utc::now();
        let id = generate_booking_id(now);
        assert!(id.starts_with(&format!("BK-{}-", now.format("%Y%m%d%H%M"))));
        assert_eq!(id.len(), "BK-202601010000-ABCDEF".len());
    }

    #[test]
    fn test_patch_ignores_unknown_keys() {
        let patch: BookingPatch = serde_json::from_value(json!({"internal_secret": "x"})).unwrap();
        assert!(patch.is_empty());
        let err = patch.normalize().unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == "No valid fields to update"));
    }

    #[test]
    fn test_patch_label_implies_status() {
        let patch: BookingPatch = serde_json::from_value(json!({"status_label": "completed"})).unwrap();
        let patch = patch.normalize().unwrap();
        assert_eq!(patch.status, Some(BookingStatus::Completed));
        assert_eq!(patch.fields(), vec!["status", "status_label"]);
        assert!(patch.touches_lifecycle());
    }

    #[test]
    fn test_patch_cancelled_status_carries_label() {
        let patch: BookingPatch = serde_json::from_value(json!({"status": "cancelled"})).unwrap();
        let patch = patch.normalize().unwrap();
        assert_eq!(patch.status_label, Some(StatusLabel::Cancelled));

        let patch: BookingPatch = serde_json::from_value(json!({"status": "pending"})).unwrap();
        assert_eq!(patch.normalize().unwrap().status_label, None);

        let patch: BookingPatch =
            serde_json::from_value(json!({"status": "cancelled", "status_label": "scheduled"})).unwrap();
        assert!(matches!(patch.normalize(), Err(AppError::Validation(_))));

        let patch: BookingPatch =
            serde_json::from_value(json!({"status": "confirmed", "status_label": "cancelled"})).unwrap();
        assert!(matches!(patch.normalize(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_patch_validates_values() {
        let patch: BookingPatch = serde_json::from_value(json!({"final_price": -5.0})).unwrap();
        assert!(patch.normalize().is_err());

        let patch: BookingPatch = serde_json::from_value(json!({"phone": "1 (555) 000-1111"})).unwrap();
        assert_eq!(patch.normalize().unwrap().phone.as_deref(), Some("5550001111"));

        let patch: BookingPatch = serde_json::from_value(json!({"appointment_time": "14:15"})).unwrap();
        assert_eq!(patch.appointment_time, NaiveTime::from_hms_opt(14, 15, 0));

        assert!(serde_json::from_value::<BookingPatch>(json!({"status_label": "archived"})).is_err());
    }
}
