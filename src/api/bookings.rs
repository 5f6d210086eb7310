//! Booking form endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{booking::BookingReceipt, DraftEdit},
    services::booking::SessionView,
    AppState,
};

/// Get the open booking form
#[utoipa::path(
    get,
    path = "/calendars/{id}/booking",
    tag = "bookings",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    responses(
        (status = 200, description = "Booking form", body = SessionView),
        (status = 404, description = "No booking in progress")
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    let calendar = state.services.calendars.get(id).await?;
    Ok(Json(calendar.booking().await?))
}

/// Edit the booking form; end time and price are re-derived
#[utoipa::path(
    patch,
    path = "/calendars/{id}/booking",
    tag = "bookings",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    request_body = DraftEdit,
    responses(
        (status = 200, description = "Updated booking form", body = SessionView),
        (status = 404, description = "No booking in progress"),
        (status = 409, description = "Submission in progress"),
        (status = 422, description = "Edit not allowed")
    )
)]
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<DraftEdit>,
) -> AppResult<Json<SessionView>> {
    let calendar = state.services.calendars.get(id).await?;
    Ok(Json(calendar.update_booking(edit).await?))
}

/// Close the booking form without submitting
#[utoipa::path(
    delete,
    path = "/calendars/{id}/booking",
    tag = "bookings",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    responses(
        (status = 204, description = "Booking form closed"),
        (status = 404, description = "No booking in progress")
    )
)]
pub async fn close_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let calendar = state.services.calendars.get(id).await?;
    if !calendar.close_booking().await {
        return Err(AppError::NotFound("No booking in progress".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Submit the booking request with the total currently shown
#[utoipa::path(
    post,
    path = "/calendars/{id}/booking/submit",
    tag = "bookings",
    params(
        ("id" = Uuid, Path, description = "Calendar ID")
    ),
    responses(
        (status = 201, description = "Booking request accepted", body = BookingReceipt),
        (status = 404, description = "No booking in progress"),
        (status = 409, description = "Time range not available, or submission in progress"),
        (status = 422, description = "Invalid fields or request rejected"),
        (status = 502, description = "Backend failure, form kept for retry")
    )
)]
pub async fn submit_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<BookingReceipt>)> {
    let calendar = state.services.calendars.get(id).await?;
    let receipt = calendar.submit_booking().await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}
