use axum::{extract::State, http::StatusCode, response::IntoResponse};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::json;
use std::sync::Arc;
use time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::info;

use crate::api::dtos::responses::{committed_message, ApiResponse, SubmittedBooking};
use crate::api::extractors::json::ApiJson;
use crate::api::extractors::public::{PublicSubmission, CSRF_COOKIE};
use crate::domain::models::booking::BookingSubmission;
use crate::error::AppError;
use crate::state::AppState;

/// Issues a double-submit token: the same value as a cookie and in the body.
pub async fn csrf_token(cookies: Cookies) -> impl IntoResponse {
    let token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect();

    let mut cookie = Cookie::new(CSRF_COOKIE, token.clone());
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(Duration::hours(2));
    cookies.add(cookie);

    ApiResponse::ok("CSRF token issued", json!({ "csrf_token": token }))
}

pub async fn submit_booking(
    State(state): State<Arc<AppState>>,
    _guard: PublicSubmission,
    ApiJson(submission): ApiJson<BookingSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let committed = state.lifecycle().create_booking(submission).await?;
    let message = committed_message("Booking submitted successfully", &committed);
    let booking = committed.value;

    info!(booking_id = %booking.id, "Public booking submitted");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(message, SubmittedBooking {
            booking_id: booking.id,
            estimated_price: booking.estimated_price,
            appointment_date: booking.appointment_date,
            status_label: booking.status_label,
        }),
    ))
}
