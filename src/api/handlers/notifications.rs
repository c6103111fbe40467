use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;

use crate::api::dtos::requests::{page_limit, NotificationQuery};
use crate::api::dtos::responses::ApiResponse;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = state.notification_repo.list(query.unread_only, page_limit(query.limit)).await?;
    let unread_count = state.notification_repo.unread_count().await?;
    Ok(ApiResponse::ok(
        "Notifications loaded",
        json!({ "notifications": notifications, "unread_count": unread_count }),
    ))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.notification_repo.mark_read(&id).await? {
        return Err(AppError::NotFound(format!("Notification {} not found", id)));
    }
    Ok(ApiResponse::ok("Notification marked as read", json!({ "id": id })))
}

pub async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let updated = state.notification_repo.mark_all_read().await?;
    Ok(ApiResponse::ok(format!("{} notification(s) marked as read", updated), json!({ "updated": updated })))
}
