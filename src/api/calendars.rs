//! Calendar instance endpoints (widget callbacks)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CalendarView, DateRange, ViewerMode},
    services::{
        calendar::InteractionOutcome,
        presentation::{self, CalendarProps, RenderedEvent},
    },
    AppState,
};

use super::today;

/// Mount calendar request
#[derive(Deserialize, ToSchema)]
pub struct MountCalendarRequest {
    pub mode: ViewerMode,
    /// Initial view (default: month)
    #[serde(default)]
    pub view: CalendarView,
    /// Date to show first (default: today)
    pub date: Option<NaiveDate>,
}

/// Visible range reported by the widget
#[derive(Deserialize, ToSchema)]
pub struct RangeRequest {
    pub view: CalendarView,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct DateClickRequest {
    pub date: NaiveDate,
    /// Occupancy as seen by the widget; derived from loaded events when absent
    pub has_events: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct SelectRequest {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Deserialize, ToSchema)]
pub struct EventClickRequest {
    pub event_id: String,
}

/// Mount a calendar for a viewer and load its first range
#[utoipa::path(
    post,
    path = "/calendars",
    tag = "calendars",
    request_body = MountCalendarRequest,
    responses(
        (status = 201, description = "Calendar mounted", body = CalendarProps)
    )
)]
pub async fn mount_calendar(
    State(state): State<AppState>,
    Json(request): Json<MountCalendarRequest>,
) -> AppResult<(StatusCode, Json<CalendarProps>)> {
    let calendar = state
        .services
        .mount_calendar(request.mode, request.view)
        .await;
    let range = presentation::initial_range(request.view, request.date.unwrap_or_else(today));
    let props = calendar.set_range(request.view, range).await;
    Ok((StatusCode::CREATED, Json(props)))
}

/// Get the current calendar configuration and events
#[utoipa::path(
    get,
    path = "/calendars/{id}",
    tag = "calendars",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    responses(
        (status = 200, description = "Calendar configuration", body = CalendarProps),
        (status = 404, description = "Calendar not found")
    )
)]
pub async fn get_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CalendarProps>> {
    let calendar = state.services.calendars.get(id).await?;
    Ok(Json(calendar.props().await))
}

/// Unmount a calendar, discarding any open booking form
#[utoipa::path(
    delete,
    path = "/calendars/{id}",
    tag = "calendars",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    responses(
        (status = 204, description = "Calendar unmounted"),
        (status = 404, description = "Calendar not found")
    )
)]
pub async fn unmount_calendar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.calendars.remove(id).await?;
    tracing::info!(calendar = %id, "Calendar unmounted");
    Ok(StatusCode::NO_CONTENT)
}

/// View or visible range changed
#[utoipa::path(
    put,
    path = "/calendars/{id}/range",
    tag = "calendars",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    request_body = RangeRequest,
    responses(
        (status = 200, description = "Calendar configuration for the new range", body = CalendarProps),
        (status = 404, description = "Calendar not found")
    )
)]
pub async fn set_range(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RangeRequest>,
) -> AppResult<Json<CalendarProps>> {
    let calendar = state.services.calendars.get(id).await?;
    let range = DateRange::new(request.start, request.end);
    Ok(Json(calendar.set_range(request.view, range).await))
}

/// Day cell clicked
#[utoipa::path(
    post,
    path = "/calendars/{id}/date-click",
    tag = "calendars",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    request_body = DateClickRequest,
    responses(
        (status = 200, description = "Resulting action", body = InteractionOutcome),
        (status = 404, description = "Calendar not found")
    )
)]
pub async fn date_click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<DateClickRequest>,
) -> AppResult<Json<InteractionOutcome>> {
    let calendar = state.services.calendars.get(id).await?;
    let outcome = calendar
        .date_click(today(), request.date, request.has_events)
        .await?;
    Ok(Json(outcome))
}

/// Time range drag-selected
#[utoipa::path(
    post,
    path = "/calendars/{id}/select",
    tag = "calendars",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Resulting action", body = InteractionOutcome),
        (status = 404, description = "Calendar not found")
    )
)]
pub async fn select_range(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectRequest>,
) -> AppResult<Json<InteractionOutcome>> {
    let calendar = state.services.calendars.get(id).await?;
    let outcome = calendar.select(today(), request.start, request.end).await?;
    Ok(Json(outcome))
}

/// Existing event clicked
#[utoipa::path(
    post,
    path = "/calendars/{id}/event-click",
    tag = "calendars",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    request_body = EventClickRequest,
    responses(
        (status = 200, description = "Resulting action", body = InteractionOutcome),
        (status = 404, description = "Calendar or event not found")
    )
)]
pub async fn event_click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EventClickRequest>,
) -> AppResult<Json<InteractionOutcome>> {
    let calendar = state.services.calendars.get(id).await?;
    let outcome = calendar.event_click(today(), &request.event_id).await?;
    Ok(Json(outcome))
}

/// Course event re-rendered with its student roster
#[utoipa::path(
    get,
    path = "/calendars/{id}/events/{event_id}/roster",
    tag = "calendars",
    params(
        ("id" = Uuid, Path, description = "Calendar ID"),
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event with roster", body = RenderedEvent),
        (status = 400, description = "No roster for this event in the current view"),
        (status = 404, description = "Calendar or event not found")
    )
)]
pub async fn event_roster(
    State(state): State<AppState>,
    Path((id, event_id)): Path<(Uuid, String)>,
) -> AppResult<Json<RenderedEvent>> {
    let calendar = state.services.calendars.get(id).await?;
    Ok(Json(calendar.render_roster(&event_id).await?))
}
