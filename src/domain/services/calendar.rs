use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};

use crate::domain::models::booking::Booking;

text_enum!(CalendarView {
    Day => "day",
    Week => "week",
    Month => "month",
});

/// Inclusive date range covered by a calendar view. Weeks run Monday to Sunday.
pub fn view_range(view: CalendarView, date: NaiveDate) -> (NaiveDate, NaiveDate) {
    match view {
        CalendarView::Day => (date, date),
        CalendarView::Week => {
            let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            (start, start + Duration::days(6))
        }
        CalendarView::Month => {
            let start = date.with_day(1).unwrap_or(date);
            let end = start
                .checked_add_months(Months::new(1))
                .map(|next| next - Duration::days(1))
                .unwrap_or(start);
            (start, end)
        }
    }
}

/// Interprets a wall-clock appointment in the business timezone. Times that fall
/// into a DST gap are read as UTC wall-clock so they still map to an instant.
pub fn local_to_utc(date: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Generates an iCalendar (.ics) string for a booking's appointment window.
pub fn generate_ics(booking: &Booking, tz: Tz, company: &str) -> String {
    let start = local_to_utc(booking.appointment_date, booking.appointment_time, tz);
    let end = start + Duration::minutes(booking.duration_minutes as i64);

    let mut calendar = Calendar::new();

    let ical_event = IcalEvent::new()
        .summary(&format!("{} Cleaning - {}", booking.service_name(), company))
        .description(&format!("Booking {}", booking.id))
        .location(&booking.full_address())
        .starts(start)
        .ends(end)
        .uid(&booking.id)
        .done();

    calendar.push(ical_event);
    calendar.to_string()
}
