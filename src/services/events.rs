//! Event reconciliation engine
//!
//! A failed source is logged and contributes no events; the calendar renders
//! whatever the other sources returned.

use chrono::{Datelike, NaiveDate, Weekday};
use indexmap::IndexMap;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OnceCell, RwLock};

use crate::{
    backend::Backend,
    models::{event::DedupKey, CalendarEvent, DateRange, EventCategory, ViewerMode},
};

/// One all-day `closed` event per closed weekday in the range
pub fn closed_days(range: DateRange, closed_weekdays: &[Weekday]) -> Vec<CalendarEvent> {
    range
        .days()
        .filter(|d| closed_weekdays.contains(&d.weekday()))
        .map(CalendarEvent::closed_day)
        .collect()
}

/// Concatenate sources and collapse events sharing (title, start, end), keeping the first
pub fn merge_events<I>(sources: I) -> Vec<CalendarEvent>
where
    I: IntoIterator<Item = Vec<CalendarEvent>>,
{
    let mut unique: IndexMap<DedupKey, CalendarEvent> = IndexMap::new();
    for event in sources.into_iter().flatten() {
        unique.entry(event.dedup_key()).or_insert(event);
    }
    unique.into_values().collect()
}

type RosterCell = Arc<OnceCell<Arc<Vec<String>>>>;

pub struct EventReconciler {
    backend: Arc<dyn Backend>,
    mode: ViewerMode,
    closed_weekdays: Vec<Weekday>,
    /// Range of the last completed fetch; also serializes fetches
    visible: Mutex<Option<DateRange>>,
    events: RwLock<Arc<Vec<CalendarEvent>>>,
    rosters: Mutex<HashMap<i64, RosterCell>>,
}

impl EventReconciler {
    pub fn new(backend: Arc<dyn Backend>, mode: ViewerMode, closed_weekdays: Vec<Weekday>) -> Self {
        Self {
            backend,
            mode,
            closed_weekdays,
            visible: Mutex::new(None),
            events: RwLock::new(Arc::new(Vec::new())),
            rosters: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch all sources for `range` and merge them, without touching state
    pub async fn load_events(&self, range: DateRange) -> Vec<CalendarEvent> {
        let (sessions, bookings) = tokio::join!(
            self.backend.fetch_sessions(range),
            self.backend.fetch_approved_bookings(range),
        );

        let courses: Vec<CalendarEvent> = match sessions {
            Ok(rows) => rows
                .iter()
                .filter(|r| !r.is_deleted())
                .map(CalendarEvent::from_session)
                .collect(),
            Err(e) => {
                tracing::warn!(?range, "Failed to load course sessions: {}", e);
                Vec::new()
            }
        };

        let venue: Vec<CalendarEvent> = match bookings {
            Ok(rows) => rows
                .iter()
                .filter(|r| r.is_approved())
                .map(|r| CalendarEvent::from_booking(r, self.mode))
                .collect(),
            Err(e) => {
                tracing::warn!(?range, "Failed to load venue bookings: {}", e);
                Vec::new()
            }
        };

        // Closed markers first: they win any key collision
        merge_events([closed_days(range, &self.closed_weekdays), courses, venue])
    }

    /// Show `range`, fetching only when it differs from the last fetched one.
    ///
    /// Returns whether a fetch happened.
    pub async fn show_range(&self, range: DateRange) -> bool {
        let mut visible = self.visible.lock().await;
        if *visible == Some(range) {
            return false;
        }
        let events = self.load_events(range).await;
        *self.events.write().await = Arc::new(events);
        *visible = Some(range);
        true
    }

    /// Refetch the current range, e.g. after a booking was submitted
    pub async fn reload(&self) {
        let visible = self.visible.lock().await;
        if let Some(range) = *visible {
            let events = self.load_events(range).await;
            *self.events.write().await = Arc::new(events);
            tracing::debug!(?range, "Calendar events reloaded");
        }
    }

    pub async fn visible_range(&self) -> Option<DateRange> {
        *self.visible.lock().await
    }

    pub async fn events(&self) -> Arc<Vec<CalendarEvent>> {
        self.events.read().await.clone()
    }

    pub async fn find(&self, event_id: &str) -> Option<CalendarEvent> {
        self.events
            .read()
            .await
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
    }

    /// Whether a day is occupied; closed-day markers do not count
    pub async fn has_events_on(&self, date: NaiveDate) -> bool {
        self.events
            .read()
            .await
            .iter()
            .any(|e| e.category != EventCategory::Closed && e.date() == date)
    }

    async fn roster_cell(&self, session_id: i64) -> RosterCell {
        self.rosters
            .lock()
            .await
            .entry(session_id)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Enrolled student names for a course session, fetched at most once.
    ///
    /// A failed fetch yields an empty roster and is retried on the next call.
    pub async fn roster(&self, session_id: i64) -> Arc<Vec<String>> {
        let cell = self.roster_cell(session_id).await;
        let loaded = cell
            .get_or_try_init(|| async {
                let rows = self.backend.fetch_roster(session_id).await?;
                let names: Vec<String> = rows
                    .into_iter()
                    .filter_map(|r| r.student_name)
                    .filter(|n| !n.trim().is_empty())
                    .collect();
                Ok::<_, crate::backend::BackendError>(Arc::new(names))
            })
            .await;

        match loaded {
            Ok(names) => names.clone(),
            Err(e) => {
                tracing::warn!(session_id, "Failed to load roster: {}", e);
                Arc::new(Vec::new())
            }
        }
    }

    /// Roster already in cache, without fetching
    pub async fn cached_roster(&self, session_id: i64) -> Option<Arc<Vec<String>>> {
        let rosters = self.rosters.lock().await;
        rosters.get(&session_id).and_then(|cell| cell.get().cloned())
    }
}
