use axum::{extract::State, response::IntoResponse};
use std::sync::Arc;

use crate::api::dtos::requests::CreateInvoiceRequest;
use crate::api::dtos::responses::{committed_message, ApiResponse};
use crate::api::extractors::{auth::AuthUser, json::ApiJson};
use crate::error::AppError;
use crate::state::AppState;

pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(payload): ApiJson<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let committed = state.lifecycle().create_invoice(&payload.booking_id).await?;
    Ok(ApiResponse::ok(committed_message("Invoice created", &committed), committed))
}
