use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde_json::json;
use tera::{Context, Tera};

use crate::domain::models::booking::{Booking, StatusLabel};
use crate::domain::models::message_log::{EmailAttachment, OutboundEmail};
use crate::domain::models::staff::Staff;
use crate::domain::services::calendar::generate_ics;
use crate::domain::services::phone::format_phone_display;
use crate::error::AppError;

pub fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn when(booking: &Booking) -> String {
    format!("{} at {}", format_date(booking.appointment_date), format_time(booking.appointment_time))
}

fn first_name(booking: &Booking) -> &str {
    booking.customer_name.split_whitespace().next().unwrap_or("there")
}

pub fn confirmation_sms(booking: &Booking, company: &str) -> String {
    format!(
        "Hi {}! Your {} cleaning with {} is booked for {}. Booking #{}. Estimated price: ${:.2}.",
        first_name(booking),
        booking.service_name(),
        company,
        when(booking),
        booking.id,
        booking.estimated_price
    )
}

pub fn reminder_sms(booking: &Booking, company: &str) -> String {
    format!(
        "Reminder: your {} cleaning with {} is scheduled for {}. Address: {}. Reply to this message if you need to reschedule.",
        booking.service_name(),
        company,
        when(booking),
        booking.full_address()
    )
}

pub fn reschedule_sms(booking: &Booking, company: &str) -> String {
    format!(
        "Hi {}, your {} cleaning has been rescheduled to {}. Booking #{}.",
        first_name(booking),
        company,
        when(booking),
        booking.id
    )
}

pub fn staff_reschedule_sms(booking: &Booking) -> String {
    format!(
        "Schedule change: booking #{} for {} is now {}. Address: {}.",
        booking.id,
        booking.customer_name,
        when(booking),
        booking.full_address()
    )
}

pub fn cancellation_sms(booking: &Booking, company: &str) -> String {
    format!(
        "Hi {}, your {} cleaning on {} has been cancelled. Booking #{}. Contact us anytime to book again.",
        first_name(booking),
        company,
        when(booking),
        booking.id
    )
}

pub fn staff_cancellation_sms(booking: &Booking) -> String {
    format!(
        "Cancelled: booking #{} for {} on {} has been cancelled. You are no longer assigned.",
        booking.id,
        booking.customer_name,
        when(booking)
    )
}

pub fn status_update_sms(booking: &Booking, label: StatusLabel, company: &str) -> String {
    let detail = match label {
        StatusLabel::Scheduled => format!("is scheduled for {}", when(booking)),
        StatusLabel::InProgress => "is now in progress. Our team has arrived".to_string(),
        StatusLabel::Completed => format!("is complete. Thank you for choosing {}", company),
        StatusLabel::Cancelled => "has been cancelled".to_string(),
    };
    format!("Hi {}, your cleaning (booking #{}) {}.", first_name(booking), booking.id, detail)
}

pub fn schedule_update_sms(booking: &Booking) -> String {
    format!("Your appointment is confirmed for {}.", when(booking))
}

pub fn staff_booking_updated_sms(booking: &Booking) -> String {
    format!(
        "Booking #{} for {} was updated. Current schedule: {}. Check the dashboard for details.",
        booking.id,
        booking.customer_name,
        when(booking)
    )
}

pub fn staff_assignment_sms(booking: &Booking) -> String {
    let contact = booking
        .phone
        .as_deref()
        .map(format_phone_display)
        .unwrap_or_else(|| "no phone on file".to_string());
    format!(
        "New job: {} cleaning on {} at {}. Customer: {} ({}). {} bed / {} bath {}.",
        booking.service_name(),
        when(booking),
        booking.full_address(),
        booking.customer_name,
        contact,
        booking.bedrooms,
        booking.bathrooms,
        booking.property_type
    )
}

pub fn team_assigned_sms(booking: &Booking, names: &[String], company: &str) -> String {
    format!(
        "Hi {}, {} from {} will take care of your cleaning on {}.",
        first_name(booking),
        join_names(names),
        company,
        when(booking)
    )
}

pub fn staff_unassigned_sms(booking: &Booking) -> String {
    format!(
        "You have been removed from booking #{} ({} on {}).",
        booking.id,
        booking.customer_name,
        when(booking)
    )
}

pub fn customer_team_changed_sms(booking: &Booking, company: &str) -> String {
    format!(
        "Hi {}, the {} team for your cleaning on {} has changed. We'll confirm your crew shortly.",
        first_name(booking),
        company,
        when(booking)
    )
}

/// "A", "A and B", "A, B and C".
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => "our team".to_string(),
        [one] => one.clone(),
        [rest @ .., last] => format!("{} and {}", rest.join(", "), last),
    }
}

/// Renders the HTML emails from the embedded templates.
#[derive(Clone)]
pub struct EmailRenderer {
    templates: Arc<Tera>,
    company: String,
    timezone: Tz,
}

impl EmailRenderer {
    pub fn new(templates: Arc<Tera>, company: String, timezone: Tz) -> Self {
        Self { templates, company, timezone }
    }

    fn context(&self, booking: &Booking) -> Result<Context, AppError> {
        let value = json!({
            "company": self.company,
            "booking_id": booking.id,
            "customer_name": booking.customer_name,
            "customer_phone": booking.phone.as_deref().map(format_phone_display),
            "customer_email": booking.email,
            "service": booking.service_name(),
            "frequency": booking.frequency,
            "property_type": booking.property_type,
            "bedrooms": booking.bedrooms,
            "bathrooms": booking.bathrooms,
            "date": format_date(booking.appointment_date),
            "time": format_time(booking.appointment_time),
            "duration_minutes": booking.duration_minutes,
            "address": booking.full_address(),
            "estimated_price": format!("{:.2}", booking.estimated_price),
            "notes": booking.notes,
        });
        Context::from_value(value).map_err(|e| AppError::InternalWithMsg(format!("Template context error: {:?}", e)))
    }

    fn render(&self, name: &str, context: &Context) -> Result<String, AppError> {
        self.templates
            .render(name, context)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error for {}: {:?}", name, e)))
    }

    pub fn customer_confirmation(&self, booking: &Booking, to: &str) -> Result<OutboundEmail, AppError> {
        let context = self.context(booking)?;
        let ics = generate_ics(booking, self.timezone, &self.company);

        Ok(OutboundEmail {
            to: to.to_string(),
            subject: format!("Your {} booking is confirmed (#{})", self.company, booking.id),
            html_body: self.render("customer_confirmation.html", &context)?,
            text_body: confirmation_sms(booking, &self.company),
            attachments: vec![EmailAttachment {
                filename: "appointment.ics".to_string(),
                content_type: "text/calendar".to_string(),
                data: ics.into_bytes(),
            }],
        })
    }

    pub fn admin_alert(&self, booking: &Booking, to: &str) -> Result<OutboundEmail, AppError> {
        let context = self.context(booking)?;
        Ok(OutboundEmail {
            to: to.to_string(),
            subject: format!("New booking: {} on {}", booking.customer_name, format_date(booking.appointment_date)),
            html_body: self.render("admin_alert.html", &context)?,
            text_body: format!(
                "New {} booking #{} from {} for {}. Estimated ${:.2}.",
                booking.service_name(),
                booking.id,
                booking.customer_name,
                when(booking),
                booking.estimated_price
            ),
            attachments: Vec::new(),
        })
    }

    pub fn staff_assignment(&self, booking: &Booking, staff: &Staff, to: &str) -> Result<OutboundEmail, AppError> {
        let mut context = self.context(booking)?;
        context.insert("staff_name", &staff.first_name);
        Ok(OutboundEmail {
            to: to.to_string(),
            subject: format!("New assignment: {} on {}", booking.customer_name, format_date(booking.appointment_date)),
            html_body: self.render("staff_assignment.html", &context)?,
            text_body: staff_assignment_sms(booking),
            attachments: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&[]), "our team");
        assert_eq!(join_names(&["Ana".into()]), "Ana");
        assert_eq!(join_names(&["Ana".into(), "Bo".into(), "Cy".into()]), "Ana, Bo and Cy");
    }

    #[test]
    fn test_date_and_time_formatting() {
        let date = NaiveDate::from_ymd_opt(2030, 5, 3).unwrap();
        assert_eq!(format_date(date), "Friday, May 3, 2030");
        assert_eq!(format_time(NaiveTime::from_hms_opt(14, 5, 0).unwrap()), "2:05 PM");
        assert_eq!(format_time(NaiveTime::from_hms_opt(9, 30, 0).unwrap()), "9:30 AM");
    }
}
