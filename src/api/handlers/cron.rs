use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::warn;

use crate::api::dtos::responses::ApiResponse;
use crate::background::ReminderWorker;
use crate::error::AppError;
use crate::state::AppState;

pub const CRON_SECRET_HEADER: &str = "X-Cron-Secret";

fn check_secret(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let provided = headers.get(CRON_SECRET_HEADER).and_then(|v| v.to_str().ok());
    match provided {
        Some(secret) if !state.config.cron_secret.is_empty() && secret == state.config.cron_secret => Ok(()),
        _ => {
            warn!("Cron endpoint called without a valid secret");
            Err(AppError::Unauthorized)
        }
    }
}

pub async fn run_reminders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    check_secret(&state, &headers)?;
    let report = ReminderWorker::new(&state).run_once().await?;
    let message = format!("Sent {} of {} due reminder(s)", report.sent, report.claimed);
    Ok(ApiResponse::ok(message, report))
}

pub async fn run_payment_sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    check_secret(&state, &headers)?;
    let report = state.payment_sync().run_once(state.config.reminder_batch_size).await?;
    let message = format!("Checked {} invoice(s), {} newly paid", report.checked, report.paid);
    Ok(ApiResponse::ok(message, report))
}
