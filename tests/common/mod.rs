//! Shared helpers for the API integration tests

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio_stream::StreamExt;
use tower::ServiceExt;

use clubhouse_calendar::{
    api,
    backend::{Backend, BackendError},
    config::{AppConfig, CalendarConfig},
    models::{
        BookingOutcome, BookingRequest, BookingType, ConflictCheck, ConflictQuery, DateRange,
        EnrollmentRow, SessionRow, VenueBookingRow, VenuePolicy,
    },
    services::{settings::SettingsFeed, Services},
    AppState,
};

/// In-memory stand-in for the hosted backend
pub struct FakeBackend {
    pub sessions: Mutex<Vec<SessionRow>>,
    pub bookings: Mutex<Vec<VenueBookingRow>>,
    pub rosters: Mutex<HashMap<i64, Vec<EnrollmentRow>>>,
    pub policy: Mutex<VenuePolicy>,
    /// `None` makes the price procedure fail
    pub price: Mutex<Option<Decimal>>,
    pub conflict: Mutex<ConflictCheck>,
    pub conflict_queries: Mutex<Vec<ConflictQuery>>,
    pub requests: Mutex<Vec<BookingRequest>>,
    pub invoices: Mutex<Vec<String>>,
    pub roster_calls: Mutex<u32>,
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn policy() -> VenuePolicy {
    VenuePolicy {
        closing_time: "19:00".to_string(),
        overtime_cutoff_time: "20:00".to_string(),
        extra_time_price_per_30min: Decimal::from(10),
        overtime_price_per_30min: Decimal::from(25),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            bookings: Mutex::new(Vec::new()),
            rosters: Mutex::new(HashMap::new()),
            policy: Mutex::new(policy()),
            price: Mutex::new(Some(Decimal::from(120))),
            conflict: Mutex::new(ConflictCheck::default()),
            conflict_queries: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            invoices: Mutex::new(Vec::new()),
            roster_calls: Mutex::new(0),
        }
    }

    pub fn with_booking(self, id: i64, day: &str, booking_type: &str) -> Self {
        self.bookings.lock().unwrap().push(VenueBookingRow {
            id,
            title: Some(format!("Private party {}", id)),
            date: date(day),
            start_time: "12:00".to_string(),
            end_time: "16:00".to_string(),
            booking_type: booking_type.to_string(),
            status: "approved".to_string(),
        });
        self
    }

    pub fn with_course(self, id: i64, day: &str, students: &[&str]) -> Self {
        self.sessions.lock().unwrap().push(SessionRow {
            id,
            course_id: Some(1),
            start_date: date(day),
            start_time: Some("09:00:00".to_string()),
            duration_hours: Some(1.0),
            status: Some("scheduled".to_string()),
            course_name: Some("Junior squad".to_string()),
        });
        self.rosters.lock().unwrap().insert(
            id,
            students
                .iter()
                .map(|name| EnrollmentRow {
                    session_id: id,
                    student_name: Some(name.to_string()),
                })
                .collect(),
        );
        self
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_sessions(&self, range: DateRange) -> Result<Vec<SessionRow>, BackendError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| range.contains(s.start_date))
            .cloned()
            .collect())
    }

    async fn fetch_approved_bookings(
        &self,
        range: DateRange,
    ) -> Result<Vec<VenueBookingRow>, BackendError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| range.contains(b.date) && b.is_approved())
            .cloned()
            .collect())
    }

    async fn fetch_roster(&self, session_id: i64) -> Result<Vec<EnrollmentRow>, BackendError> {
        *self.roster_calls.lock().unwrap() += 1;
        Ok(self
            .rosters
            .lock()
            .unwrap()
            .get(&session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_venue_settings(&self) -> Result<VenuePolicy, BackendError> {
        Ok(self.policy.lock().unwrap().clone())
    }

    async fn calculate_booking_price(
        &self,
        _booking_type: BookingType,
        quantity: i64,
    ) -> Result<Decimal, BackendError> {
        match *self.price.lock().unwrap() {
            Some(unit) => Ok(unit * Decimal::from(quantity)),
            None => Err(BackendError::Status {
                status: 503,
                body: "pricing offline".to_string(),
            }),
        }
    }

    async fn check_booking_conflict(
        &self,
        query: &ConflictQuery,
    ) -> Result<ConflictCheck, BackendError> {
        self.conflict_queries.lock().unwrap().push(query.clone());
        Ok(self.conflict.lock().unwrap().clone())
    }

    async fn create_booking_request(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingOutcome, BackendError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let id = 1000 + requests.len() as i64;

        // Approve right away so a reload shows the booking
        self.bookings.lock().unwrap().push(VenueBookingRow {
            id,
            title: Some(request.title.clone()),
            date: date(&request.date),
            start_time: request.start_time.clone(),
            end_time: request.end_time.clone(),
            booking_type: request.booking_type.as_str().to_string(),
            status: "approved".to_string(),
        });

        Ok(BookingOutcome::Accepted {
            estimated_price: Some(request.forced_total),
            status: "pending".to_string(),
            invoice_id: Some(format!("inv-{}", id)),
        })
    }

    async fn generate_invoice(&self, invoice_id: &str) -> Result<(), BackendError> {
        self.invoices.lock().unwrap().push(invoice_id.to_string());
        Ok(())
    }
}

/// Router wired to `backend` with default calendar settings
pub fn app(backend: Arc<FakeBackend>) -> Router {
    let settings = SettingsFeed::new(backend.policy.lock().unwrap().clone());
    let services = Services::with_settings(
        backend as Arc<dyn Backend>,
        &CalendarConfig::default(),
        settings,
    );
    api::router(AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(services),
    })
}

/// Send one request through the router and decode the JSON body
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Open a streaming endpoint and return its first body chunk as text
pub async fn first_chunk(app: &Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let mut body = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(std::time::Duration::from_secs(5), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    (status, String::from_utf8(chunk.to_vec()).unwrap())
}

/// Mount a calendar and return its id
pub async fn mount(app: &Router, mode: &str, view: &str, day: &str) -> String {
    let (status, props) = send(
        app,
        Method::POST,
        "/api/v1/calendars",
        Some(serde_json::json!({ "mode": mode, "view": view, "date": day })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    props["calendar_id"].as_str().unwrap().to_string()
}
