//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, calendars, health, settings};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clubhouse Calendar API",
        version = "0.3.0",
        description = "Venue booking and scheduling calendar REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Settings
        settings::get_settings,
        settings::stream_settings,
        // Calendars
        calendars::mount_calendar,
        calendars::get_calendar,
        calendars::unmount_calendar,
        calendars::set_range,
        calendars::date_click,
        calendars::select_range,
        calendars::event_click,
        calendars::event_roster,
        // Bookings
        bookings::get_booking,
        bookings::update_booking,
        bookings::close_booking,
        bookings::submit_booking,
    ),
    components(
        schemas(
            // Calendars
            calendars::MountCalendarRequest,
            calendars::RangeRequest,
            calendars::DateClickRequest,
            calendars::SelectRequest,
            calendars::EventClickRequest,
            crate::services::presentation::CalendarProps,
            crate::services::presentation::RenderedEvent,
            crate::services::calendar::InteractionOutcome,
            crate::services::interaction::Action,
            crate::services::interaction::Prefill,
            crate::models::DateRange,
            crate::models::CalendarEvent,
            crate::models::CalendarView,
            crate::models::EventCategory,
            crate::models::ViewerMode,
            // Bookings
            crate::services::booking::SessionView,
            crate::services::policy::Derived,
            crate::services::policy::Schedule,
            crate::models::BookingDraft,
            crate::models::DraftEdit,
            crate::models::BookingType,
            crate::models::PriceEstimate,
            crate::models::ConflictCheck,
            crate::models::booking::BookingReceipt,
            // Settings
            crate::models::VenuePolicy,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "settings", description = "Live venue policy"),
        (name = "calendars", description = "Calendar instances and widget callbacks"),
        (name = "bookings", description = "Booking form and submission")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
