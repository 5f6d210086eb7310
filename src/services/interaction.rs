//! Calendar interaction state machine

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::{CalendarEvent, CalendarView, EventCategory, ViewerMode},
    time,
};

/// What the user clicked or selected
#[derive(Debug, Clone)]
pub enum ClickTarget {
    /// A day cell
    Day { date: NaiveDate, has_events: bool },
    /// A drag-selected range in a time grid
    Range { start: NaiveDateTime, end: NaiveDateTime },
    /// An existing event
    Event(CalendarEvent),
}

/// Initial values of a booking form opened from the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Prefill {
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    OpenModal { prefill: Prefill },
    SwitchView { view: CalendarView, date: NaiveDate },
    Reject { reason: String },
    Noop,
}

/// Inputs of a transition besides the target
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    pub mode: ViewerMode,
    pub view: CalendarView,
    pub today: NaiveDate,
    pub overtime_cutoff_minutes: i64,
    pub closed_weekdays: &'a [Weekday],
}

impl InteractionContext<'_> {
    fn is_bookable_day(&self, date: NaiveDate) -> bool {
        date >= self.today && !self.closed_weekdays.contains(&date.weekday())
    }
}

pub fn transition(ctx: &InteractionContext<'_>, target: &ClickTarget) -> Action {
    match target {
        ClickTarget::Event(event) => event_click(ctx, event),
        _ if !ctx.mode.can_book() => Action::Noop,
        ClickTarget::Day { date, has_events: true } => Action::SwitchView {
            view: CalendarView::Day,
            date: *date,
        },
        ClickTarget::Day { date, has_events: false } => {
            if ctx.is_bookable_day(*date) {
                Action::OpenModal {
                    prefill: Prefill {
                        date: *date,
                        start_time: None,
                        end_time: None,
                    },
                }
            } else {
                Action::Noop
            }
        }
        ClickTarget::Range { start, end } => range_select(ctx, *start, *end),
    }
}

fn range_select(ctx: &InteractionContext<'_>, start: NaiveDateTime, end: NaiveDateTime) -> Action {
    if !ctx.view.is_timegrid() || end <= start {
        return Action::Noop;
    }

    let ends_after_cutoff =
        end.date() > start.date() || time::minutes_of(end.time()) > ctx.overtime_cutoff_minutes;
    if ends_after_cutoff {
        return Action::Reject {
            reason: format!(
                "Bookings cannot end after {}",
                time::from_minutes(ctx.overtime_cutoff_minutes)
            ),
        };
    }

    Action::OpenModal {
        prefill: Prefill {
            date: start.date(),
            start_time: Some(start.format("%H:%M").to_string()),
            end_time: Some(end.format("%H:%M").to_string()),
        },
    }
}

/// Clicking an event in month view drills into that day; closed markers are inert
fn event_click(ctx: &InteractionContext<'_>, event: &CalendarEvent) -> Action {
    match (event.category, ctx.view) {
        (EventCategory::Closed, _) => Action::Noop,
        (_, CalendarView::Month) => Action::SwitchView {
            view: CalendarView::Day,
            date: event.date(),
        },
        _ => Action::Noop,
    }
}
