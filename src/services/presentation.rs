//! Widget-facing calendar configuration
//!
//! Maps reconciled events and the venue policy onto a rendering-library
//! agnostic props object. Nothing here talks to the backend.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CalendarEvent, CalendarView, DateRange, EventCategory, VenuePolicy, ViewerMode};

pub const AVAILABLE_VIEWS: [CalendarView; 4] = [
    CalendarView::Month,
    CalendarView::Week,
    CalendarView::Day,
    CalendarView::Agenda,
];

/// One event as handed to the widget's render callback
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RenderedEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
    pub category: EventCategory,
    pub class_names: Vec<String>,
    /// Enrolled students, only for privileged viewers in detailed views
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster: Option<Vec<String>>,
    /// The roster can be shown but has not been loaded yet
    pub roster_pending: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarProps {
    pub calendar_id: Uuid,
    pub mode: ViewerMode,
    pub view: CalendarView,
    pub available_views: Vec<CalendarView>,
    pub range: Option<DateRange>,
    /// Day cells react to clicks
    pub date_clickable: bool,
    /// Time ranges can be drag-selected
    pub selectable: bool,
    /// Venue closing time, end of regular business hours
    pub business_hours_end: String,
    /// Last time a selection may reach
    pub slot_max_time: String,
    /// Closed days of week, 0 = Sunday
    pub closed_days_of_week: Vec<u32>,
    pub booking_open: bool,
    pub events: Vec<RenderedEvent>,
}

/// Range a widget shows for `view` around `date`, used when mounting
pub fn initial_range(view: CalendarView, date: NaiveDate) -> DateRange {
    match view {
        CalendarView::Month => {
            let first = date.with_day(1).unwrap_or(date);
            let last = first
                .checked_add_months(Months::new(1))
                .and_then(|d| d.pred_opt())
                .unwrap_or(date);
            DateRange::new(first, last)
        }
        CalendarView::Week => {
            let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            DateRange::new(monday, monday + Duration::days(6))
        }
        CalendarView::Day => DateRange::single(date),
        CalendarView::Agenda => DateRange::new(date, date + Duration::days(6)),
    }
}

/// Whether a course roster label applies to `event` for this viewer and view
pub fn wants_roster(event: &CalendarEvent, mode: ViewerMode, view: CalendarView) -> bool {
    event.category == EventCategory::Course
        && event.session_id.is_some()
        && mode.is_privileged()
        && view.shows_details()
}

pub fn render_event(
    event: &CalendarEvent,
    mode: ViewerMode,
    view: CalendarView,
    roster: Option<&[String]>,
) -> RenderedEvent {
    let with_roster = wants_roster(event, mode, view);
    let mut class_names = vec![event.category.class_name().to_string()];
    if event.all_day {
        class_names.push("event-all-day".to_string());
    }

    RenderedEvent {
        id: event.id.clone(),
        title: event.title.clone(),
        start: event.start,
        end: event.end,
        all_day: event.all_day,
        category: event.category,
        class_names,
        roster: roster.filter(|_| with_roster).map(<[String]>::to_vec),
        roster_pending: with_roster && roster.is_none(),
    }
}

pub struct PropsInput<'a> {
    pub calendar_id: Uuid,
    pub mode: ViewerMode,
    pub view: CalendarView,
    pub range: Option<DateRange>,
    pub policy: &'a VenuePolicy,
    pub closed_weekdays: &'a [Weekday],
    pub booking_open: bool,
    pub events: Vec<RenderedEvent>,
}

pub fn build_props(input: PropsInput<'_>) -> CalendarProps {
    let mut closed_days_of_week: Vec<u32> = input
        .closed_weekdays
        .iter()
        .map(|d| d.num_days_from_sunday())
        .collect();
    closed_days_of_week.sort_unstable();
    closed_days_of_week.dedup();

    CalendarProps {
        calendar_id: input.calendar_id,
        mode: input.mode,
        view: input.view,
        available_views: AVAILABLE_VIEWS.to_vec(),
        range: input.range,
        date_clickable: input.mode.can_book(),
        selectable: input.mode.can_book() && input.view.is_timegrid(),
        business_hours_end: input.policy.closing_time.clone(),
        slot_max_time: input.policy.overtime_cutoff_time.clone(),
        closed_days_of_week,
        booking_open: input.booking_open,
        events: input.events,
    }
}
