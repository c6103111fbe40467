use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{
    assignments, booking, calendar, cron, health, invoices, message_logs, notifications, public, staff,
};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public booking form
        .route("/api/v1/csrf-token", get(public::csrf_token))
        .route("/api/v1/submit-booking", post(public::submit_booking))

        // Booking lifecycle
        .route(
            "/api/v1/booking",
            get(booking::get_booking)
                .put(booking::update_booking)
                .post(booking::booking_action)
                .delete(booking::delete_bookings),
        )
        .route("/api/v1/bookings", get(calendar::calendar_feed))
        .route(
            "/api/v1/assignments",
            get(assignments::list_assignments)
                .post(assignments::assign_staff)
                .delete(assignments::unassign_staff),
        )
        .route("/api/v1/invoices", post(invoices::create_invoice))

        // Staff
        .route("/api/v1/staff", get(staff::list_staff).post(staff::create_staff))

        // Feed & logs
        .route("/api/v1/notifications", get(notifications::list_notifications))
        .route("/api/v1/notifications/read-all", put(notifications::mark_all_read))
        .route("/api/v1/notifications/{id}/read", put(notifications::mark_read))
        .route("/api/v1/message-logs", get(message_logs::list_message_logs))

        // Scheduled jobs
        .route("/api/v1/cron/reminders", post(cron::run_reminders))
        .route("/api/v1/cron/payments", post(cron::run_payment_sync))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        staff_id = tracing::field::Empty,
                        role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
