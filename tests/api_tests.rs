//! API integration tests

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{app, first_chunk, mount, send, FakeBackend};

fn booking_uri(calendar: &str) -> String {
    format!("/api/v1/calendars/{}/booking", calendar)
}

/// Open the booking form on an empty future weekday
async fn open_form(app: &axum::Router, calendar: &str) -> Value {
    let (status, outcome) = send(
        app,
        Method::POST,
        &format!("/api/v1/calendars/{}/date-click", calendar),
        Some(json!({ "date": "2099-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["action"], "open_modal");
    outcome["booking"].clone()
}

async fn fill_contact(app: &axum::Router, calendar: &str) -> Value {
    let (status, view) = send(
        app,
        Method::PATCH,
        &booking_uri(calendar),
        Some(json!({
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "+16502530000",
            "title": "Relay practice",
            "start_time": "10:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    view
}

#[tokio::test]
async fn test_health_check() {
    let app = app(Arc::new(FakeBackend::new()));

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closing_time"], "19:00");
}

#[tokio::test]
async fn test_settings_endpoint_serves_policy() {
    let app = app(Arc::new(FakeBackend::new()));

    let (status, body) = send(&app, Method::GET, "/api/v1/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closing_time"], "19:00");
    assert_eq!(body["overtime_cutoff_time"], "20:00");
}

#[tokio::test]
async fn test_settings_stream_starts_with_current_policy() {
    let app = app(Arc::new(FakeBackend::new()));

    let (status, chunk) = first_chunk(&app, "/api/v1/settings/stream").await;
    assert_eq!(status, StatusCode::OK);
    assert!(chunk.contains("event: settings"), "{}", chunk);
    assert!(chunk.contains("\"closing_time\":\"19:00\""), "{}", chunk);
    assert!(chunk.contains("\"overtime_cutoff_time\":\"20:00\""), "{}", chunk);
}

#[tokio::test]
async fn test_mount_merges_sources_with_public_titles() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_booking(1, "2099-03-06", "full")
            .with_course(7, "2099-03-04", &["Mia"]),
    );
    let app = app(backend);

    let (status, props) = send(
        &app,
        Method::POST,
        "/api/v1/calendars",
        Some(json!({ "mode": "club", "date": "2099-03-05" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(props["view"], "month");
    assert_eq!(props["range"]["start"], "2099-03-01");
    assert_eq!(props["range"]["end"], "2099-03-31");
    assert_eq!(props["closed_days_of_week"], json!([0]));

    let events = props["events"].as_array().unwrap();
    let booking = events.iter().find(|e| e["id"] == "booking-1").unwrap();
    assert_eq!(booking["title"], "Exclusive");
    assert!(events.iter().any(|e| e["id"] == "legacy-7"));
    let closed = events.iter().filter(|e| e["category"] == "closed").count();
    // Sundays of March 2099: 1, 8, 15, 22, 29
    assert_eq!(closed, 5);
}

#[tokio::test]
async fn test_day_clicks_follow_transition_table() {
    let backend = Arc::new(FakeBackend::new().with_booking(1, "2099-03-06", "daypass"));
    let app = app(backend);
    let calendar = mount(&app, "club", "month", "2099-03-05").await;
    let uri = format!("/api/v1/calendars/{}/date-click", calendar);

    let (_, occupied) = send(&app, Method::POST, &uri, Some(json!({ "date": "2099-03-06" }))).await;
    assert_eq!(occupied["action"], "switch_view");
    assert_eq!(occupied["view"], "day");
    assert_eq!(occupied["props"]["view"], "day");

    let (_, sunday) = send(&app, Method::POST, &uri, Some(json!({ "date": "2099-03-08" }))).await;
    assert_eq!(sunday["action"], "noop");

    let (_, past) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "date": "2000-01-04", "has_events": false })),
    )
    .await;
    assert_eq!(past["action"], "noop");

    let (_, empty) = send(&app, Method::POST, &uri, Some(json!({ "date": "2099-03-05" }))).await;
    assert_eq!(empty["action"], "open_modal");
    assert_eq!(empty["prefill"]["date"], "2099-03-05");
    assert_eq!(empty["booking"]["draft"]["date"], "2099-03-05");
}

#[tokio::test]
async fn test_drag_selection_respects_cutoff() {
    let app = app(Arc::new(FakeBackend::new()));
    let calendar = mount(&app, "admin", "week", "2099-03-05").await;
    let uri = format!("/api/v1/calendars/{}/select", calendar);

    let (_, late) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "start": "2099-03-05T18:00:00", "end": "2099-03-05T21:00:00" })),
    )
    .await;
    assert_eq!(late["action"], "reject");
    assert_eq!(late["reason"], "Bookings cannot end after 20:00");

    let (_, ok) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "start": "2099-03-05T13:00:00", "end": "2099-03-05T20:00:00" })),
    )
    .await;
    assert_eq!(ok["action"], "open_modal");
    let draft = &ok["booking"]["draft"];
    assert_eq!(draft["start_time"], "13:00");
    assert_eq!(draft["end_time"], "20:00");
    assert_eq!(draft["use_overtime"], true);
    assert_eq!(ok["booking"]["extra_time_locked"], true);
}

#[tokio::test]
async fn test_school_calendar_is_read_only() {
    let app = app(Arc::new(FakeBackend::new()));
    let calendar = mount(&app, "school", "month", "2099-03-05").await;

    let (_, outcome) = send(
        &app,
        Method::POST,
        &format!("/api/v1/calendars/{}/date-click", calendar),
        Some(json!({ "date": "2099-03-05" })),
    )
    .await;
    assert_eq!(outcome["action"], "noop");

    let (status, _) = send(&app, Method::GET, &booking_uri(&calendar), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clamp_warning_then_overtime() {
    let app = app(Arc::new(FakeBackend::new()));
    let calendar = mount(&app, "club", "month", "2099-03-05").await;
    open_form(&app, &calendar).await;

    let (_, clamped) = send(
        &app,
        Method::PATCH,
        &booking_uri(&calendar),
        Some(json!({ "start_time": "16:00", "booking_type": "full" })),
    )
    .await;
    assert_eq!(clamped["draft"]["end_time"], "19:00");
    assert_eq!(clamped["derived"]["schedule"]["clamped"], true);
    assert!(clamped["warning"].is_string());

    let (_, again) = send(
        &app,
        Method::PATCH,
        &booking_uri(&calendar),
        Some(json!({ "title": "Gala" })),
    )
    .await;
    assert_eq!(again["derived"]["schedule"]["clamped"], true);
    assert!(again["warning"].is_null());

    let (_, overtime) = send(
        &app,
        Method::PATCH,
        &booking_uri(&calendar),
        Some(json!({ "use_overtime": true, "overtime_blocks": 2 })),
    )
    .await;
    assert_eq!(overtime["draft"]["end_time"], "20:00");
    assert_eq!(overtime["derived"]["schedule"]["clamped"], false);
    assert_eq!(overtime["derived"]["schedule"]["billed_overtime_blocks"], 2);

    let (status, locked) = send(
        &app,
        Method::PATCH,
        &booking_uri(&calendar),
        Some(json!({ "extra_blocks": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(locked["error"], "BookingRejected");
}

#[tokio::test]
async fn test_conflict_blocks_submission() {
    let backend = Arc::new(FakeBackend::new());
    *backend.conflict.lock().unwrap() = clubhouse_calendar::models::ConflictCheck {
        has_conflict: true,
        reason: Some("Occupied".to_string()),
    };
    let app = app(backend.clone());
    let calendar = mount(&app, "club", "month", "2099-03-05").await;
    open_form(&app, &calendar).await;
    fill_contact(&app, &calendar).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{}/submit", booking_uri(&calendar)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Occupied");
    assert!(backend.requests.lock().unwrap().is_empty());

    let queries = backend.conflict_queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].start_time, "10:00");
    assert_eq!(queries[0].end_time, "14:00");
    drop(queries);

    // The form stays open for another attempt
    let (status, view) = send(&app, Method::GET, &booking_uri(&calendar), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["submitting"], false);
}

#[tokio::test]
async fn test_successful_submission_freezes_total() {
    let backend = Arc::new(FakeBackend::new());
    let app = app(backend.clone());
    let calendar = mount(&app, "club", "month", "2099-03-05").await;
    open_form(&app, &calendar).await;
    fill_contact(&app, &calendar).await;

    let (_, view) = send(
        &app,
        Method::PATCH,
        &booking_uri(&calendar),
        Some(json!({ "quantity": 2, "use_extra_time": true, "extra_blocks": 2 })),
    )
    .await;
    assert_eq!(view["draft"]["end_time"], "15:00");
    let shown_total = view["derived"]["price"]["total"].clone();

    let (status, receipt) = send(
        &app,
        Method::POST,
        &format!("{}/submit", booking_uri(&calendar)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["forced_total"], shown_total);
    assert_eq!(receipt["status"], "pending");

    {
        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].end_time, "15:00");
        assert_eq!(requests[0].quantity, 2);
        assert_eq!(requests[0].venue, "club");
        assert_eq!(requests[0].forced_total.to_string(), shown_total.as_str().unwrap());
    }

    let (status, _) = send(&app, Method::GET, &booking_uri(&calendar), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Events were reloaded with the new booking
    let (_, props) = send(&app, Method::GET, &format!("/api/v1/calendars/{}", calendar), None).await;
    assert!(props["events"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["id"] == "booking-1001"));

    for _ in 0..50 {
        if !backend.invoices.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(*backend.invoices.lock().unwrap(), vec!["inv-1001".to_string()]);
}

#[tokio::test]
async fn test_unavailable_price_is_not_zero() {
    let backend = Arc::new(FakeBackend::new());
    *backend.price.lock().unwrap() = None;
    let app = app(backend.clone());
    let calendar = mount(&app, "club", "month", "2099-03-05").await;

    let booking = open_form(&app, &calendar).await;
    assert!(booking["derived"]["price"]["base"].is_null());
    fill_contact(&app, &calendar).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{}/submit", booking_uri(&calendar)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["price"].is_string());
    assert!(backend.conflict_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_fields_are_reported() {
    let app = app(Arc::new(FakeBackend::new()));
    let calendar = mount(&app, "admin", "month", "2099-03-05").await;
    open_form(&app, &calendar).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{}/submit", booking_uri(&calendar)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = body["fields"].as_object().unwrap();
    for field in ["full_name", "email", "phone", "title", "start_time"] {
        assert!(fields.contains_key(field), "missing {}", field);
    }
}

#[tokio::test]
async fn test_admin_roster_is_loaded_once() {
    let backend = Arc::new(FakeBackend::new().with_course(7, "2099-03-04", &["Mia", "Leo"]));
    let app = app(backend.clone());
    let calendar = mount(&app, "admin", "day", "2099-03-04").await;

    let (_, props) = send(&app, Method::GET, &format!("/api/v1/calendars/{}", calendar), None).await;
    let course = props["events"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "legacy-7")
        .cloned()
        .unwrap();
    assert_eq!(course["roster_pending"], true);

    let roster_uri = format!("/api/v1/calendars/{}/events/legacy-7/roster", calendar);
    let (status, rendered) = send(&app, Method::GET, &roster_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rendered["roster"], json!(["Mia", "Leo"]));
    send(&app, Method::GET, &roster_uri, None).await;
    assert_eq!(*backend.roster_calls.lock().unwrap(), 1);

    let (_, props) = send(&app, Method::GET, &format!("/api/v1/calendars/{}", calendar), None).await;
    let course = props["events"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["id"] == "legacy-7")
        .cloned()
        .unwrap();
    assert_eq!(course["roster"], json!(["Mia", "Leo"]));
}

#[tokio::test]
async fn test_unknown_calendar_is_not_found() {
    let app = app(Arc::new(FakeBackend::new()));

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/calendars/00000000-0000-0000-0000-000000000000",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_unmount_discards_calendar() {
    let app = app(Arc::new(FakeBackend::new()));
    let calendar = mount(&app, "club", "week", "2099-03-05").await;
    let uri = format!("/api/v1/calendars/{}", calendar);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
