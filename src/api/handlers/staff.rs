use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::requests::StaffQuery;
use crate::api::dtos::responses::{ApiResponse, StaffView};
use crate::api::extractors::{auth::AuthUser, json::ApiJson};
use crate::domain::models::staff::CreateStaffRequest;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<StaffQuery>,
) -> Result<impl IntoResponse, AppError> {
    let staff: Vec<StaffView> = state.staff_repo.list(query.active_only).await?
        .into_iter()
        .map(StaffView::from)
        .collect();
    Ok(ApiResponse::ok("Staff loaded", staff))
}

pub async fn create_staff(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CreateStaffRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_manager()?;
    let staff = state.staff_repo.create(&payload.into_staff()?).await?;
    info!(staff_id = staff.id, role = %staff.role, "Staff member created");
    Ok((StatusCode::CREATED, ApiResponse::ok("Staff member created", StaffView::from(staff))))
}
