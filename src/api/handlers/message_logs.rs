use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::api::dtos::requests::{page_limit, MessageLogQuery};
use crate::api::dtos::responses::ApiResponse;
use crate::api::extractors::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// `?kind=sms` (default) or `?kind=email`, optionally narrowed to one booking.
pub async fn list_message_logs(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<MessageLogQuery>,
) -> Result<Response, AppError> {
    let limit = page_limit(query.limit);
    let booking_id = query.booking_id.as_deref();

    match query.kind.as_deref().unwrap_or("sms") {
        "sms" => {
            let logs = state.message_log_repo.list_sms(booking_id, limit).await?;
            Ok(ApiResponse::ok("SMS logs loaded", logs).into_response())
        }
        "email" => {
            let logs = state.message_log_repo.list_email(booking_id, limit).await?;
            Ok(ApiResponse::ok("Email logs loaded", logs).into_response())
        }
        other => Err(AppError::Validation(format!("Unknown log kind '{}'", other))),
    }
}
