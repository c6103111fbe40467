use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::{BookingAction, BookingQuery, DeleteBookingsRequest, IdQuery, UpdateBookingRequest};
use crate::api::dtos::responses::{
    batch_message, committed_message, ApiResponse, BookingDetail, BookingView, CustomerBookings, CustomerView,
};
use crate::api::extractors::{auth::AuthUser, json::ApiJson};
use crate::domain::models::booking::{parse_date, parse_time, StatusLabel};
use crate::error::AppError;
use crate::state::AppState;

/// `?id=` returns one booking with its assignments, history and reminders;
/// `?customer_id=` returns the customer with all of their bookings.
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<BookingQuery>,
) -> Result<Response, AppError> {
    if let Some(id) = query.id {
        let booking = state.booking_repo.find_by_id(&id).await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;
        let assigned_staff = state.assignment_repo.list_for_booking(&id).await?;
        let history = state.booking_repo.list_history(&id).await?;
        let reminders = state.reminder_repo.list_for_booking(&id).await?;

        let detail = BookingDetail { booking: booking.into(), assigned_staff, history, reminders };
        return Ok(ApiResponse::ok("Booking loaded", detail).into_response());
    }

    if let Some(customer_id) = query.customer_id {
        let customer = state.customer_repo.find_by_id(customer_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", customer_id)))?;
        let bookings = state.booking_repo.list_by_customer(customer_id).await?;

        let data = CustomerBookings {
            customer: CustomerView::from(customer),
            bookings: bookings.into_iter().map(BookingView::from).collect(),
        };
        return Ok(ApiResponse::ok("Customer bookings loaded", data).into_response());
    }

    Err(AppError::Validation("Either id or customer_id is required".into()))
}

pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<UpdateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (booking_id, patch) = payload.into_parts()?;
    let committed = state.lifecycle().update_fields(&booking_id, patch, Some(user.staff_id())).await?;
    Ok(ApiResponse::ok(committed_message("Booking updated", &committed), committed))
}

pub async fn booking_action(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(action): ApiJson<BookingAction>,
) -> Result<Response, AppError> {
    let lifecycle = state.lifecycle();
    let changed_by = Some(user.staff_id());

    let response = match action {
        BookingAction::Reschedule { booking_id, date, time, reason } => {
            let (date, time) = (parse_date(&date)?, parse_time(&time)?);
            let committed = lifecycle.reschedule(&booking_id, date, time, reason.as_deref(), changed_by).await?;
            ApiResponse::ok(committed_message("Booking rescheduled", &committed), committed).into_response()
        }
        BookingAction::BulkReschedule { booking_ids, date, time, reason } => {
            let (date, time) = (parse_date(&date)?, parse_time(&time)?);
            let report = lifecycle.bulk_reschedule(&booking_ids, date, time, reason.as_deref(), changed_by).await?;
            ApiResponse::ok(batch_message("Rescheduled", &report), report).into_response()
        }
        BookingAction::Cancel { booking_id, reason } => {
            let committed = lifecycle.cancel(&booking_id, reason.as_deref(), changed_by).await?;
            ApiResponse::ok(committed_message("Booking cancelled", &committed), committed).into_response()
        }
        BookingAction::BulkCancel { booking_ids, reason } => {
            let report = lifecycle.bulk_cancel(&booking_ids, reason.as_deref(), changed_by).await?;
            ApiResponse::ok(batch_message("Cancelled", &report), report).into_response()
        }
        BookingAction::BulkUpdateStatus { booking_ids, status_label } => {
            let label: StatusLabel = status_label.parse()?;
            let report = lifecycle.bulk_update_status(&booking_ids, label, changed_by).await?;
            ApiResponse::ok(batch_message("Updated", &report), report).into_response()
        }
        BookingAction::SendReminder { booking_id } => {
            let committed = lifecycle.send_reminder(&booking_id).await?;
            let message = if committed.failed_effects().next().is_some() {
                "Reminder could not be delivered"
            } else {
                "Reminder sent"
            };
            ApiResponse::ok(message, committed).into_response()
        }
        BookingAction::CreateManual(request) => {
            let committed = lifecycle.create_manual(request, changed_by).await?;
            info!(booking_id = %committed.value.id, staff_id = user.staff_id(), "Manual booking created");
            (
                StatusCode::CREATED,
                ApiResponse::ok(committed_message("Booking created", &committed), committed),
            )
                .into_response()
        }
    };

    Ok(response)
}

/// Hard delete by `?id=` or a `{ "booking_ids": [...] }` body. Admin/manager only.
pub async fn delete_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<IdQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    user.require_manager()?;

    let ids = match query.id {
        Some(id) => vec![id],
        None if body.is_empty() => Vec::new(),
        None => {
            let request: DeleteBookingsRequest = serde_json::from_slice(&body)
                .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))?;
            request.booking_ids
        }
    };
    if ids.is_empty() {
        return Err(AppError::Validation("No booking ids provided".into()));
    }

    let report = state.lifecycle().delete_bookings(&ids, Some(user.staff_id())).await?;
    Ok(ApiResponse::ok(batch_message("Deleted", &report), report))
}
