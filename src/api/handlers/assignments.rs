use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;

use crate::api::dtos::requests::{AssignStaffRequest, AssignmentsQuery, UnassignQuery};
use crate::api::dtos::responses::{committed_message, ApiResponse};
use crate::api::extractors::{auth::AuthUser, json::ApiJson};
use crate::domain::models::booking::{parse_date, parse_time, ServiceType};
use crate::domain::services::availability::staff_availability;
use crate::error::AppError;
use crate::state::AppState;

/// Lists a booking's team, a staff member's schedule, or staff availability on a date.
pub async fn list_assignments(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<AssignmentsQuery>,
) -> Result<Response, AppError> {
    if let Some(booking_id) = query.booking_id.as_deref() {
        let assigned = state.assignment_repo.list_for_booking(booking_id).await?;
        return Ok(ApiResponse::ok("Assignments loaded", assigned).into_response());
    }

    if let Some(staff_id) = query.staff_id {
        let schedule = state.assignment_repo.list_for_staff(staff_id).await?;
        return Ok(ApiResponse::ok("Staff schedule loaded", schedule).into_response());
    }

    if let Some(raw_date) = query.date.as_deref() {
        let date = parse_date(raw_date)?;
        let requested = match query.time.as_deref() {
            Some(raw_time) => {
                let duration = query.duration.unwrap_or(ServiceType::Regular.default_duration_minutes());
                if duration <= 0 {
                    return Err(AppError::Validation("Duration must be positive".into()));
                }
                Some((parse_time(raw_time)?, duration))
            }
            None => None,
        };

        let staff = state.staff_repo.list(true).await?;
        let entries = state.assignment_repo.list_for_range(date, date).await?;
        let availability = staff_availability(&staff, &entries, requested);

        let data = json!({ "date": date, "staff": availability });
        return Ok(ApiResponse::ok("Availability loaded", data).into_response());
    }

    Err(AppError::Validation("One of booking_id, staff_id or date is required".into()))
}

pub async fn assign_staff(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(payload): ApiJson<AssignStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    let committed = state
        .lifecycle()
        .assign_staff(&payload.booking_id, &payload.staff_ids, &payload.assignment_role, payload.send_notification)
        .await?;
    Ok(ApiResponse::ok(committed_message("Staff assigned", &committed), committed))
}

pub async fn unassign_staff(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<UnassignQuery>,
) -> Result<impl IntoResponse, AppError> {
    let committed = state.lifecycle().unassign_staff(&query.booking_id, query.staff_id).await?;
    Ok(ApiResponse::ok(committed_message("Staff unassigned", &committed), committed))
}
