//! Venue settings endpoints

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use crate::{error::AppResult, models::VenuePolicy, AppState};

/// Get the venue policy currently in effect
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    responses(
        (status = 200, description = "Current venue policy", body = VenuePolicy)
    )
)]
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<VenuePolicy>> {
    Ok(Json(state.services.settings.current()))
}

/// Stream venue policy changes as server-sent events.
///
/// The current policy is sent first, then one `settings` event per change.
#[utoipa::path(
    get,
    path = "/settings/stream",
    tag = "settings",
    responses(
        (status = 200, description = "Event stream of venue policies", content_type = "text/event-stream", body = VenuePolicy)
    )
)]
pub async fn stream_settings(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.services.settings.subscribe()).map(|policy| {
        let event = Event::default().event("settings");
        Ok(event.clone().json_data(&policy).unwrap_or_else(|e| {
            tracing::warn!("Failed to encode settings event: {}", e);
            event.comment("settings unavailable")
        }))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
