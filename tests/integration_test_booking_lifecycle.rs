mod common;

use axum::http::StatusCode;
use chrono::NaiveTime;
use cleaning_crm::domain::models::history::HistoryEntry;
use cleaning_crm::domain::models::staff::StaffRole;
use cleaning_crm::error::AppError;
use common::{days_ahead, parse_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_create_booking_prices_records_history_and_schedules_reminder() {
    let app = TestApp::new().await;
    app.seed_staff("Ada", "Admin", StaffRole::Admin, None, Some("ada@example.com")).await;

    let booking = app.create_booking(days_ahead(10)).await;

    assert!(booking.id.starts_with("BK-"));
    assert!((booking.estimated_price - 167.7).abs() < 1e-9);
    assert_eq!(booking.status, "pending");
    assert_eq!(booking.status_label, "scheduled");
    assert_eq!(booking.phone.as_deref(), Some("5551234567"));
    assert!(booking.customer_id.is_some());

    let history = app.state.booking_repo.list_history(&booking.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].new_status, "scheduled");

    let reminders = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].status, "pending");

    let recipients = app.email.recipients();
    assert!(recipients.contains(&"jane@example.com".to_string()));
    assert!(recipients.contains(&"ada@example.com".to_string()));
    assert_eq!(app.sms.sent_count(), 1);
    assert_eq!(app.state.notification_repo.unread_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_repeat_customer_is_reused() {
    let app = TestApp::new().await;
    let first = app.create_booking(days_ahead(5)).await;
    let second = app.create_booking(days_ahead(6)).await;

    assert_eq!(first.customer_id, second.customer_id);
    let bookings = app.state.booking_repo.list_by_customer(first.customer_id.unwrap()).await.unwrap();
    assert_eq!(bookings.len(), 2);
}

#[tokio::test]
async fn test_notification_failure_does_not_roll_back_booking() {
    let app = TestApp::new().await;
    app.sms.fail.store(true, std::sync::atomic::Ordering::SeqCst);
    app.email.fail.store(true, std::sync::atomic::Ordering::SeqCst);

    let booking = app.create_booking(days_ahead(3)).await;

    let stored = app.state.booking_repo.find_by_id(&booking.id).await.unwrap();
    assert!(stored.is_some());

    let sms_logs = app.state.message_log_repo.list_sms(Some(&booking.id), 10).await.unwrap();
    assert_eq!(sms_logs.len(), 1);
    assert_eq!(sms_logs[0].status, "failed");
    assert!(sms_logs[0].error_message.is_some());
}

#[tokio::test]
async fn test_reschedule_leaves_exactly_one_pending_reminder() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(7)).await;
    let new_date = days_ahead(9);

    let res = app.request("POST", "/api/v1/booking", Some(&auth), Some(json!({
        "action": "reschedule",
        "booking_id": booking.id,
        "new_date": new_date.format("%Y-%m-%d").to_string(),
        "new_time": "14:30",
        "reason": "Customer request"
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["value"]["appointment_date"], new_date.format("%Y-%m-%d").to_string());
    assert_eq!(body["data"]["value"]["status_label"], "scheduled");

    let reminders = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap();
    let pending: Vec<_> = reminders.iter().filter(|r| r.status == "pending").collect();
    assert_eq!(pending.len(), 1);
    assert_eq!(reminders.iter().filter(|r| r.status == "failed").count(), 1);

    let history = app.state.booking_repo.list_history(&booking.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|h| h.note.as_deref().unwrap_or_default().contains("Customer request")));
}

#[tokio::test]
async fn test_cancel_twice_conflicts() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(4)).await;
    let payload = json!({ "action": "cancel", "booking_id": booking.id, "reason": "Moving away" });

    let res = app.request("POST", "/api/v1/booking", Some(&auth), Some(payload.clone())).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["value"]["status"], "cancelled");
    assert_eq!(body["data"]["value"]["status_label"], "cancelled");

    let reminders = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap();
    assert!(reminders.iter().all(|r| r.status != "pending"));

    let res = app.request("POST", "/api/v1/booking", Some(&auth), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_bulk_cancel_skips_missing_and_cancelled() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let open = app.create_booking(days_ahead(4)).await;
    let cancelled = app.create_booking(days_ahead(5)).await;
    app.state.lifecycle().cancel(&cancelled.id, None, None).await.unwrap();

    let res = app.request("POST", "/api/v1/booking", Some(&auth), Some(json!({
        "action": "bulk_cancel",
        "booking_ids": [open.id, cancelled.id, "BK-000000000000-NOPE00"]
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;

    assert_eq!(body["data"]["processed"], json!([open.id]));
    assert_eq!(body["data"]["skipped"].as_array().unwrap().len(), 2);
    assert_eq!(body["message"], "Cancelled 1 booking(s), skipped 2");
}

#[tokio::test]
async fn test_update_rejects_patch_without_known_fields() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(4)).await;

    let res = app.request("PUT", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "updates": { "favorite_color": "blue", "id": "BK-hijack" }
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert!(body["message"].as_str().unwrap().contains("No valid fields"));
}

#[tokio::test]
async fn test_status_label_update_writes_history_and_derives_status() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(4)).await;

    let res = app.request("PUT", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "status_label": "completed",
        "updates": { "final_price": 180.0 }
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["value"]["status"], "completed");
    assert_eq!(body["data"]["value"]["status_label"], "completed");
    assert_eq!(body["data"]["value"]["final_price"], 180.0);

    let history = app.state.booking_repo.list_history(&booking.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.last().unwrap().new_status, "completed");
}

#[tokio::test]
async fn test_cancelled_booking_cannot_be_rescheduled_or_relabelled() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(4)).await;
    app.state.lifecycle().cancel(&booking.id, Some("No longer needed"), None).await.unwrap();

    let res = app.request("POST", "/api/v1/booking", Some(&auth), Some(json!({
        "action": "reschedule",
        "booking_id": booking.id,
        "date": days_ahead(8).format("%Y-%m-%d").to_string(),
        "time": "09:00"
    }))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.request("PUT", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "status_label": "scheduled"
    }))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Contact fields stay editable.
    let res = app.request("PUT", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "updates": { "notes": "Refund issued" }
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_manual_booking_uses_price_override() {
    let app = TestApp::new().await;
    let auth = app.admin().await;

    let res = app.request("POST", "/api/v1/booking", Some(&auth), Some(json!({
        "action": "create_manual",
        "first_name": "Walk",
        "last_name": "In",
        "address": "1 Elm St",
        "city": "Springfield",
        "state": "IL",
        "zip": "62701",
        "service_type": "deep",
        "frequency": "onetime",
        "property_type": "condo",
        "bedrooms": 3,
        "bathrooms": 2.0,
        "date": "2020-01-15",
        "time": "08:00",
        "price": 99.5
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["value"]["source"], "manual");
    assert_eq!(body["data"]["value"]["estimated_price"], 99.5);
    assert_eq!(body["data"]["value"]["duration_minutes"], 240);

    // No phone means no reminder.
    let id = body["data"]["value"]["id"].as_str().unwrap();
    let reminders = app.state.reminder_repo.list_for_booking(id).await.unwrap();
    assert!(reminders.is_empty());
}

#[tokio::test]
async fn test_hard_delete_requires_manager_and_keeps_history() {
    let app = TestApp::new().await;
    let booking = app.create_booking(days_ahead(4)).await;

    let staff = app.seed_staff("Sam", "Staff", StaffRole::Staff, None, None).await;
    let staff_auth = app.login_as(staff.id, StaffRole::Staff);
    let res = app.request("DELETE", &format!("/api/v1/booking?id={}", booking.id), Some(&staff_auth), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let auth = app.admin().await;
    let res = app.request("DELETE", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_ids": [booking.id, "BK-000000000000-GONE00"]
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["processed"], json!([booking.id]));

    assert!(app.state.booking_repo.find_by_id(&booking.id).await.unwrap().is_none());
    let history = app.state.booking_repo.list_history(&booking.id).await.unwrap();
    assert_eq!(history.last().unwrap().new_status, "deleted");
    let reminders = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap();
    assert!(reminders.iter().all(|r| r.status == "failed"));
}

#[tokio::test]
async fn test_status_only_cancel_cancels_label_and_reminder() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(4)).await;

    let res = app.request("PUT", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "status": "cancelled"
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["value"]["status"], "cancelled");
    assert_eq!(body["data"]["value"]["status_label"], "cancelled");

    let reminders = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].status, "failed");

    let history = app.state.booking_repo.list_history(&booking.id).await.unwrap();
    assert_eq!(history.last().unwrap().new_status, "cancelled");

    let res = app.request("PUT", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "status": "confirmed",
        "status_label": "cancelled"
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reschedule_reconfirms_completed_booking() {
    let app = TestApp::new().await;
    let lifecycle = app.state.lifecycle();
    let booking = app.create_booking(days_ahead(4)).await;
    let patch = serde_json::from_value(json!({ "status_label": "completed" })).unwrap();
    lifecycle.update_fields(&booking.id, patch, None).await.unwrap();

    let time = NaiveTime::from_hms_opt(13, 0, 0).unwrap();
    let moved = lifecycle.reschedule(&booking.id, days_ahead(8), time, None, None).await.unwrap().value;
    assert_eq!(moved.status, "confirmed");
    assert_eq!(moved.status_label, "scheduled");
}

#[tokio::test]
async fn test_repository_refuses_to_cancel_or_move_a_cancelled_row() {
    let app = TestApp::new().await;
    let booking = app.create_booking(days_ahead(4)).await;
    let entry = HistoryEntry::new(Some("scheduled"), "cancelled", "Cancelled: race".to_string(), None);

    app.state.booking_repo.cancel(&booking.id, &entry).await.unwrap();
    let second = app.state.booking_repo.cancel(&booking.id, &entry).await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    let moved = app.state.booking_repo.reschedule(&booking.id, days_ahead(6), time, &entry).await;
    assert!(matches!(moved, Err(AppError::Conflict(_))));

    let stored = app.state.booking_repo.find_by_id(&booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status_label, "cancelled");
    assert_eq!(stored.appointment_date, booking.appointment_date);

    // Creation plus the one cancellation that went through.
    let history = app.state.booking_repo.list_history(&booking.id).await.unwrap();
    assert_eq!(history.len(), 2);

    let missing = app.state.booking_repo.cancel("BK-000000000000-NOPE00", &entry).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_date_change_through_update_reschedules_reminder_and_notifies() {
    let app = TestApp::new().await;
    let auth = app.admin().await;
    let booking = app.create_booking(days_ahead(5)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, Some("5550001111"), None).await;
    app.state.lifecycle().assign_staff(&booking.id, &[lena.id], "lead", false).await.unwrap();
    let original_send_at = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap()[0].send_at;
    let sent_before = app.sms.sent_count();

    let new_date = days_ahead(9);
    let res = app.request("PUT", "/api/v1/booking", Some(&auth), Some(json!({
        "booking_id": booking.id,
        "updates": { "appointment_date": new_date.format("%Y-%m-%d").to_string() }
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let reminders = app.state.reminder_repo.list_for_booking(&booking.id).await.unwrap();
    let pending: Vec<_> = reminders.iter().filter(|r| r.status == "pending").collect();
    assert_eq!(pending.len(), 1);
    assert!(pending[0].send_at > original_send_at);
    assert_eq!(reminders.iter().filter(|r| r.status == "failed").count(), 1);

    let sent = app.sms.sent.lock().unwrap()[sent_before..].to_vec();
    let customer = sent.iter().find(|(to, _)| to == "+15551234567").expect("customer was texted");
    assert!(customer.1.contains("Your appointment is confirmed for"));
    assert!(sent.iter().any(|(to, _)| to == "+15550001111"));

    let sms_logs = app.state.message_log_repo.list_sms(Some(&booking.id), 20).await.unwrap();
    assert!(sms_logs.iter().any(|log| log.recipient == "5550001111" && log.status == "sent"));
}

#[tokio::test]
async fn test_reschedule_texts_every_assigned_staff_member() {
    let app = TestApp::new().await;
    let booking = app.create_booking(days_ahead(5)).await;
    let lena = app.seed_staff("Lena", "Ortiz", StaffRole::Staff, Some("5550001111"), None).await;
    let omar = app.seed_staff("Omar", "Reed", StaffRole::Staff, Some("5550002222"), None).await;
    let lifecycle = app.state.lifecycle();
    lifecycle.assign_staff(&booking.id, &[lena.id, omar.id], "lead", false).await.unwrap();
    let sent_before = app.sms.sent_count();

    let time = NaiveTime::from_hms_opt(15, 30, 0).unwrap();
    let committed = lifecycle.reschedule(&booking.id, days_ahead(7), time, Some("Rain"), None).await.unwrap();
    assert!(committed.effects.iter().all(|e| e.ok));

    let recipients: Vec<String> = app.sms.sent.lock().unwrap()[sent_before..].iter().map(|(to, _)| to.clone()).collect();
    assert_eq!(recipients.len(), 3);
    assert!(recipients.contains(&"+15551234567".to_string()));
    assert!(recipients.contains(&"+15550001111".to_string()));
    assert!(recipients.contains(&"+15550002222".to_string()));
}
