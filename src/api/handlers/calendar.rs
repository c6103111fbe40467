use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::dtos::requests::CalendarQuery;
use crate::api::dtos::responses::{ApiResponse, BookingView, CalendarEntry, CalendarResponse};
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::parse_date;
use crate::domain::services::calendar::{view_range, CalendarView};
use crate::error::AppError;
use crate::state::AppState;

pub async fn calendar_feed(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, AppError> {
    let view: CalendarView = match query.view.as_deref() {
        Some(raw) => raw.parse()?,
        None => CalendarView::Week,
    };
    let date = match query.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().with_timezone(&state.config.business_timezone).date_naive(),
    };

    let (start, end) = view_range(view, date);
    let bookings = state.booking_repo.list_by_date_range(start, end).await?;
    let entries = state.assignment_repo.list_for_range(start, end).await?;

    let mut staff_by_booking: HashMap<String, Vec<String>> = HashMap::new();
    for entry in entries {
        staff_by_booking.entry(entry.booking_id).or_default().push(entry.staff_name);
    }

    let bookings = bookings
        .into_iter()
        .map(|booking| {
            let staff_names = staff_by_booking.remove(&booking.id).unwrap_or_default();
            CalendarEntry { booking: BookingView::from(booking), staff_names }
        })
        .collect::<Vec<_>>();

    let message = format!("{} booking(s) between {} and {}", bookings.len(), start, end);
    Ok(ApiResponse::ok(message, CalendarResponse { view, start, end, bookings }))
}
