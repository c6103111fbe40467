mod common;

use axum::http::StatusCode;
use cleaning_crm::domain::models::booking::StatusLabel;
use cleaning_crm::domain::models::staff::StaffRole;
use cleaning_crm::domain::services::messages;
use common::{days_ahead, parse_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_assign_deduplicates_and_replaces_team() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(6)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, Some("5550001111"), Some("lena@example.com")).await;
    let omar = app.seed_staff("Omar", "Reed", StaffRole::Staff, Some("5550002222"), None).await;

    let res = app.request("POST", "/api/v1/assignments", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "staff_ids": [lena.id, lena.id, omar.id]
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let assigned = body["data"]["value"].as_array().unwrap();
    assert_eq!(assigned.len(), 2);
    assert!(assigned.iter().all(|a| a["assignment_role"] == "lead"));
    assert!(app.email.recipients().contains(&"lena@example.com".to_string()));

    let res = app.request("POST", "/api/v1/assignments", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "staff_ids": [omar.id],
        "assignment_role": "helper",
        "send_notification": false
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let team = app.state.assignment_repo.list_for_booking(&booking.id).await.unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].staff_id, omar.id);
    assert_eq!(team[0].assignment_role, "helper");
}

#[tokio::test]
async fn test_assign_rejects_unknown_staff_and_cancelled_booking() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(6)).await;

    let res = app.request("POST", "/api/v1/assignments", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "staff_ids": [9999]
    }))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.request("POST", "/api/v1/assignments", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "staff_ids": []
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, None, None).await;
    app.state.lifecycle().cancel(&booking.id, None, None).await.unwrap();
    let res = app.request("POST", "/api/v1/assignments", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "staff_ids": [lena.id]
    }))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_cancel_releases_assignments() {
    let app = TestApp::new().await;
    let booking = app.create_booking(days_ahead(6)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, Some("5550001111"), None).await;
    app.state.lifecycle().assign_staff(&booking.id, &[lena.id], "lead", false).await.unwrap();
    let sent_before = app.sms.sent_count();

    app.state.lifecycle().cancel(&booking.id, Some("Sick"), None).await.unwrap();

    assert!(app.state.assignment_repo.list_for_booking(&booking.id).await.unwrap().is_empty());
    let recipients: Vec<String> = app.sms.sent.lock().unwrap()[sent_before..].iter().map(|(to, _)| to.clone()).collect();
    assert!(recipients.contains(&"+15550001111".to_string()));
    assert!(recipients.contains(&"+15551234567".to_string()));
}

#[tokio::test]
async fn test_unassign_removes_single_staff_member() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(6)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, None, None).await;
    let omar = app.seed_staff("Omar", "Reed", StaffRole::Staff, None, None).await;
    app.state.lifecycle().assign_staff(&booking.id, &[lena.id, omar.id], "lead", false).await.unwrap();

    let uri = format!("/api/v1/assignments?booking_id={}&staff_id={}", booking.id, lena.id);
    let res = app.request("DELETE", &uri, Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let team = app.state.assignment_repo.list_for_booking(&booking.id).await.unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].staff_id, omar.id);

    let res = app.request("DELETE", &uri, Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_availability_reports_overlapping_assignments() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let date = days_ahead(6);
    let booking = app.create_booking(date).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, None, None).await;
    let omar = app.seed_staff("Omar", "Reed", StaffRole::Staff, None, None).await;
    app.state.lifecycle().assign_staff(&booking.id, &[lena.id], "lead", false).await.unwrap();

    // The booking runs 10:00-12:00.
    let day = date.format("%Y-%m-%d").to_string();
    let res = app.request("GET", &format!("/api/v1/assignments?date={}&time=11:00&duration=60", day), Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let staff = body["data"]["staff"].as_array().unwrap();
    let entry = |id: i64| staff.iter().find(|s| s["staff_id"] == id).unwrap().clone();
    assert_eq!(entry(lena.id)["available"], false);
    assert_eq!(entry(lena.id)["conflicting_bookings"], json!([booking.id]));
    assert_eq!(entry(omar.id)["available"], true);

    let res = app.request("GET", &format!("/api/v1/assignments?date={}&time=12:00", day), Some(&auth), None).await;
    let body = parse_body(res).await;
    let staff = body["data"]["staff"].as_array().unwrap();
    assert!(staff.iter().all(|s| s["available"] == true));

    let res = app.request("GET", &format!("/api/v1/assignments?staff_id={}", lena.id), Some(&auth), None).await;
    let body = parse_body(res).await;
    assert_eq!(body["data"][0]["booking_id"], booking.id);

    let res = app.request("GET", "/api/v1/assignments", Some(&auth), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_label_cancel_releases_team_and_texts_them() {
    let app = TestApp::new().await;
    let booking = app.create_booking(days_ahead(6)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, Some("5550001111"), None).await;
    let lifecycle = app.state.lifecycle();
    lifecycle.assign_staff(&booking.id, &[lena.id], "lead", false).await.unwrap();
    let sent_before = app.sms.sent_count();

    let report = lifecycle
        .bulk_update_status(&[booking.id.clone()], StatusLabel::Cancelled, None)
        .await
        .unwrap();
    assert_eq!(report.processed, vec![booking.id.clone()]);

    assert!(app.state.assignment_repo.list_for_booking(&booking.id).await.unwrap().is_empty());
    let stored = app.state.booking_repo.find_by_id(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, "cancelled");

    let sent = app.sms.sent.lock().unwrap()[sent_before..].to_vec();
    let to_lena: Vec<_> = sent.iter().filter(|(to, _)| to == "+15550001111").collect();
    assert_eq!(to_lena.len(), 1);
    assert_eq!(to_lena[0].1, messages::staff_cancellation_sms(&stored));

    let reminders = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap();
    assert!(reminders.iter().all(|r| r.status != "pending"));
}

#[tokio::test]
async fn test_failed_replace_keeps_previous_team() {
    let app = TestApp::new().await;
    let booking = app.create_booking(days_ahead(6)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, None, None).await;
    let omar = app.seed_staff("Omar", "Reed", StaffRole::Staff, None, None).await;
    app.state.lifecycle().assign_staff(&booking.id, &[lena.id], "lead", false).await.unwrap();

    // Staff 99999 does not exist, so its insert violates the foreign key mid-transaction.
    let result = app.state.assignment_repo.replace_all(&booking.id, &[omar.id, 99999], "helper").await;
    assert!(result.is_err());

    let team = app.state.assignment_repo.list_for_booking(&booking.id).await.unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].staff_id, lena.id);
    assert_eq!(team[0].assignment_role, "lead");
}
