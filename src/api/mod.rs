//! API handlers for the calendar REST endpoints

pub mod bookings;
pub mod calendars;
pub mod health;
pub mod openapi;
pub mod settings;

use std::any::Any;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{ErrorCode, ErrorResponse},
    AppState,
};

/// Message shown in place of a calendar that failed to render
pub const RENDER_FAILURE_MESSAGE: &str = "The calendar failed to render, please reload the page";

/// Venue-local date used for past-day checks
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Last-resort boundary: a panic in a handler becomes a static reload message
fn render_failure(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    let body = Json(ErrorResponse {
        code: ErrorCode::Failure as u32,
        error: format!("{:?}", ErrorCode::Failure),
        message: RENDER_FAILURE_MESSAGE.to_string(),
        fields: None,
    });
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CACHE_CONTROL, "no-store")],
        body,
    )
        .into_response()
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Venue settings
        .route("/settings", get(settings::get_settings))
        .route("/settings/stream", get(settings::stream_settings))
        // Calendar instances
        .route("/calendars", post(calendars::mount_calendar))
        .route(
            "/calendars/:id",
            get(calendars::get_calendar).delete(calendars::unmount_calendar),
        )
        .route("/calendars/:id/range", put(calendars::set_range))
        .route("/calendars/:id/date-click", post(calendars::date_click))
        .route("/calendars/:id/select", post(calendars::select_range))
        .route("/calendars/:id/event-click", post(calendars::event_click))
        .route(
            "/calendars/:id/events/:event_id/roster",
            get(calendars::event_roster),
        )
        // Booking form
        .route(
            "/calendars/:id/booking",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::close_booking),
        )
        .route("/calendars/:id/booking/submit", post(bookings::submit_booking))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(CatchPanicLayer::custom(render_failure))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
