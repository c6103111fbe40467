mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use cleaning_crm::domain::models::staff::StaffRole;
use common::{days_ahead, parse_body, submission_json, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let res = app.request("GET", "/health", None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["success"], true);
}

#[tokio::test]
async fn test_admin_routes_require_token_and_csrf() {
    let app = TestApp::new().await;
    let auth = app.admin().await;

    let res = app.request("GET", "/api/v1/notifications", None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("GET")
            .uri("/api/v1/notifications")
            .header(header::AUTHORIZATION, format!("Bearer {}", auth.access_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("PUT")
            .uri("/api/v1/notifications/read-all")
            .header(header::COOKIE, format!("access_token={}", auth.access_token))
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("GET")
            .uri("/api/v1/notifications")
            .header(header::COOKIE, "access_token=not-a-jwt")
            .body(Body::empty())
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

fn cookie_value(set_cookie: &str, name: &str) -> String {
    let start = set_cookie.find(&format!("{}=", name)).unwrap() + name.len() + 1;
    let end = set_cookie[start..].find(';').unwrap_or(set_cookie.len() - start);
    set_cookie[start..start + end].to_string()
}

#[tokio::test]
async fn test_public_submission_with_double_submit_token() {
    let app = TestApp::new().await;

    let res = app.request("GET", "/api/v1/csrf-token", None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap().to_string();
    let token = cookie_value(&set_cookie, "csrf_token");
    let body = parse_body(res).await;
    assert_eq!(body["data"]["csrf_token"], token);

    let payload = submission_json(days_ahead(12));
    let submit = |csrf_header: Option<String>| {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/v1/submit-booking")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, format!("csrf_token={}", token));
        if let Some(value) = csrf_header {
            builder = builder.header("X-CSRF-Token", value);
        }
        builder.body(Body::from(payload.to_string())).unwrap()
    };

    let res = app.router.clone().oneshot(submit(None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.router.clone().oneshot(submit(Some("forged".to_string()))).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.router.clone().oneshot(submit(Some(token.clone()))).await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["estimated_price"], 167.7);
    assert_eq!(body["data"]["status_label"], "scheduled");
    assert!(body["data"]["booking_id"].as_str().unwrap().starts_with("BK-"));
}

#[tokio::test]
async fn test_public_submission_rejects_invalid_input() {
    let app = TestApp::new().await;
    let mut payload = submission_json(days_ahead(12));
    payload["bedrooms"] = json!(9);

    let res = app.router.clone().oneshot(
        Request::builder()
            .method("POST")
            .uri("/api/v1/submit-booking")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, "csrf_token=abc")
            .header("X-CSRF-Token", "abc")
            .body(Body::from(payload.to_string()))
            .unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert!(body["message"].as_str().unwrap().contains("Bedrooms"));
}

#[tokio::test]
async fn test_public_submission_is_rate_limited_per_client() {
    let app = TestApp::with_config(|config| config.public_rate_limit_per_minute = 1).await;
    let request = |ip: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/v1/submit-booking")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Forwarded-For", ip)
            .body(Body::from("{}"))
            .unwrap()
    };

    let res = app.router.clone().oneshot(request("203.0.113.7")).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = app.router.clone().oneshot(request("203.0.113.7")).await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let res = app.router.clone().oneshot(request("198.51.100.2")).await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_booking_detail_and_customer_listing() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(8)).await;

    let res = app.request("GET", &format!("/api/v1/booking?id={}", booking.id), Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["booking"]["id"], booking.id);
    assert_eq!(body["data"]["booking"]["phone_display"], "(555) 123-4567");
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["reminders"].as_array().unwrap().len(), 1);

    let uri = format!("/api/v1/booking?customer_id={}", booking.customer_id.unwrap());
    let res = app.request("GET", &uri, Some(&auth), None).await;
    let body = parse_body(res).await;
    assert_eq!(body["data"]["customer"]["email"], "jane@example.com");
    assert_eq!(body["data"]["bookings"].as_array().unwrap().len(), 1);

    let res = app.request("GET", "/api/v1/booking?id=BK-missing", Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_feed_lists_range_with_staff_names() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let date = days_ahead(8);
    let booking = app.create_booking(date).await;
    let cancelled = app.create_booking(date).await;
    app.state.lifecycle().cancel(&cancelled.id, None, None).await.unwrap();
    app.create_booking(days_ahead(40)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, None, None).await;
    app.state.lifecycle().assign_staff(&booking.id, &[lena.id], "lead", false).await.unwrap();

    let uri = format!("/api/v1/bookings?view=day&date={}", date.format("%Y-%m-%d"));
    let res = app.request("GET", &uri, Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["view"], "day");
    let bookings = body["data"]["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["id"], booking.id);
    assert_eq!(bookings[0]["staff_names"], json!(["Lena Ortiz"]));

    let res = app.request("GET", "/api/v1/bookings?view=year", Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notification_feed_mark_read() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    app.create_booking(days_ahead(8)).await;
    app.create_booking(days_ahead(9)).await;

    let res = app.request("GET", "/api/v1/notifications?unread_only=true", Some(&auth), None).await;
    let body = parse_body(res).await;
    assert_eq!(body["data"]["unread_count"], 2);
    let id = body["data"]["notifications"][0]["id"].as_str().unwrap().to_string();

    let res = app.request("PUT", &format!("/api/v1/notifications/{}/read", id), Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(app.state.notification_repo.unread_count().await.unwrap(), 1);

    let res = app.request("PUT", "/api/v1/notifications/unknown/read", Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.request("PUT", "/api/v1/notifications/read-all", Some(&auth), None).await;
    let body = parse_body(res).await;
    assert_eq!(body["data"]["updated"], 1);
    assert_eq!(app.state.notification_repo.unread_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_message_logs_by_kind() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(8)).await;

    let res = app.request("GET", &format!("/api/v1/message-logs?booking_id={}", booking.id), Some(&auth), None).await;
    let body = parse_body(res).await;
    let sms = body["data"].as_array().unwrap();
    assert_eq!(sms.len(), 1);
    assert_eq!(sms[0]["status"], "sent");

    let res = app.request("GET", "/api/v1/message-logs?kind=email", Some(&auth), None).await;
    let body = parse_body(res).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let res = app.request("GET", "/api/v1/message-logs?kind=fax", Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_staff_roster_management() {
    let app = TestApp::new().await;
    let auth = app.admin().await;

    let res = app.request("POST", "/api/v1/staff", Some(&auth), Some(json!({
        "first_name": "Nia",
        "last_name": "Lee",
        "role": "staff",
        "phone": "555-222-3333"
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["phone"], "5552223333");
    let nia_id = body["data"]["id"].as_i64().unwrap();

    let res = app.request("GET", "/api/v1/staff", Some(&auth), None).await;
    let body = parse_body(res).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let nia = app.login_as(nia_id, StaffRole::Staff);
    let res = app.request("POST", "/api/v1/staff", Some(&nia), Some(json!({
        "first_name": "Eve",
        "last_name": "Intruder",
        "role": "admin"
    }))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
