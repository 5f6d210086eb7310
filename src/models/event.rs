//! Calendar event model and the source rows it is built from

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::time;

use super::enums::{BookingType, EventCategory, ViewerMode};

// ---------------------------------------------------------------------------
// DateRange
// ---------------------------------------------------------------------------

/// Visible calendar range, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    /// First visible day (YYYY-MM-DD)
    pub start: NaiveDate,
    /// Last visible day (YYYY-MM-DD)
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day in the range
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

// ---------------------------------------------------------------------------
// CalendarEvent
// ---------------------------------------------------------------------------

/// A renderable occupancy record, rebuilt on every range reload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CalendarEvent {
    /// `legacy-<sessionId>`, `booking-<bookingId>` or `closed-<isoDate>`
    pub id: String,
    pub title: String,
    /// Venue-local wall clock time
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
    pub category: EventCategory,
    /// Course session backing this event, for roster enrichment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
}

/// Deduplication key: title plus ISO start and end
pub type DedupKey = (String, String, String);

fn at_minutes(date: NaiveDate, minutes: i64) -> NaiveDateTime {
    date.and_time(NaiveTime::default()) + Duration::minutes(minutes)
}

impl CalendarEvent {
    pub fn dedup_key(&self) -> DedupKey {
        (
            self.title.clone(),
            self.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            self.end.format("%Y-%m-%dT%H:%M:%S").to_string(),
        )
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Course session spanning `start_time` plus `duration_hours`
    pub fn from_session(row: &SessionRow) -> Self {
        let start_minutes = time::to_minutes(row.start_time.as_deref().unwrap_or_default());
        let duration_minutes = (row.duration_hours.unwrap_or(0.0) * 60.0).round() as i64;
        let start = at_minutes(row.start_date, start_minutes);
        Self {
            id: format!("legacy-{}", row.id),
            title: row
                .course_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Course".to_string()),
            start,
            end: start + Duration::minutes(duration_minutes.max(0)),
            all_day: false,
            category: EventCategory::Course,
            session_id: Some(row.id),
        }
    }

    /// Approved venue booking, titled for the viewer
    pub fn from_booking(row: &VenueBookingRow, mode: ViewerMode) -> Self {
        let booking_type = BookingType::from_stored(&row.booking_type);
        let title = match (&row.title, mode.is_privileged()) {
            (Some(raw), true) if !raw.trim().is_empty() => raw.clone(),
            _ => booking_type.public_label().to_string(),
        };
        Self {
            id: format!("booking-{}", row.id),
            title,
            start: at_minutes(row.date, time::to_minutes(&row.start_time)),
            end: at_minutes(row.date, time::to_minutes(&row.end_time)),
            all_day: false,
            category: booking_type.into(),
            session_id: None,
        }
    }

    /// All-day closed-venue marker
    pub fn closed_day(date: NaiveDate) -> Self {
        let start = at_minutes(date, 0);
        Self {
            id: format!("closed-{}", date.format("%Y-%m-%d")),
            title: "Closed".to_string(),
            start,
            end: start + Duration::days(1),
            all_day: true,
            category: EventCategory::Closed,
            session_id: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Source rows
// ---------------------------------------------------------------------------

/// `sessions` row (recurring course session occurrence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: i64,
    pub course_id: Option<i64>,
    pub start_date: NaiveDate,
    /// HH:MM or HH:MM:SS
    pub start_time: Option<String>,
    pub duration_hours: Option<f64>,
    pub status: Option<String>,
    pub course_name: Option<String>,
}

impl SessionRow {
    pub fn is_deleted(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("deleted"))
    }
}

/// `venue_bookings` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueBookingRow {
    pub id: i64,
    pub title: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub booking_type: String,
    pub status: String,
}

impl VenueBookingRow {
    pub fn is_approved(&self) -> bool {
        self.status.eq_ignore_ascii_case("approved")
    }
}

/// `enrollments` row, used for course rosters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRow {
    pub session_id: i64,
    pub student_name: Option<String>,
}
