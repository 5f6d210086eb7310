//! Shared calendar enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// ViewerMode
// ---------------------------------------------------------------------------

/// Who is looking at the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewerMode {
    /// Swim school viewers: read-only calendar
    School,
    /// Club members booking the venue
    Club,
    Admin,
}

impl ViewerMode {
    /// Privileged viewers see raw booking titles and course rosters
    pub fn is_privileged(self) -> bool {
        matches!(self, ViewerMode::Admin)
    }

    pub fn can_book(self) -> bool {
        !matches!(self, ViewerMode::School)
    }
}

impl std::fmt::Display for ViewerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ViewerMode::School => "school",
            ViewerMode::Club => "club",
            ViewerMode::Admin => "admin",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// CalendarView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
    Agenda,
}

impl CalendarView {
    /// Views with a time grid, where drag-selecting a range is possible
    pub fn is_timegrid(self) -> bool {
        matches!(self, CalendarView::Week | CalendarView::Day)
    }

    /// Views showing a single event in enough detail for roster labels
    pub fn shows_details(self) -> bool {
        matches!(self, CalendarView::Day | CalendarView::Agenda)
    }
}

// ---------------------------------------------------------------------------
// EventCategory
// ---------------------------------------------------------------------------

/// Category of a calendar event (drives styling and click handling)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Course,
    BookingFull,
    BookingDaypass,
    Closed,
}

impl EventCategory {
    /// Style hook for the rendering widget
    pub fn class_name(self) -> &'static str {
        match self {
            EventCategory::Course => "event-course",
            EventCategory::BookingFull => "event-booking-full",
            EventCategory::BookingDaypass => "event-booking-daypass",
            EventCategory::Closed => "event-closed",
        }
    }
}

// ---------------------------------------------------------------------------
// BookingType
// ---------------------------------------------------------------------------

/// Venue booking type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    /// Non-exclusive, the venue may host concurrent day passes
    #[default]
    Daypass,
    /// Exclusive use of the venue
    Full,
}

impl BookingType {
    /// Default booking length before any extension
    pub fn default_duration_minutes(self) -> i64 {
        match self {
            BookingType::Full => 300,
            BookingType::Daypass => 240,
        }
    }

    /// Anonymized label shown to non-privileged viewers
    pub fn public_label(self) -> &'static str {
        match self {
            BookingType::Full => "Exclusive",
            BookingType::Daypass => "Non Exclusive",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingType::Full => "full",
            BookingType::Daypass => "daypass",
        }
    }

    /// Lenient mapping from stored values; anything but `full` is a day pass
    pub fn from_stored(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("full") {
            BookingType::Full
        } else {
            BookingType::Daypass
        }
    }
}

impl std::fmt::Display for BookingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<BookingType> for EventCategory {
    fn from(t: BookingType) -> Self {
        match t {
            BookingType::Full => EventCategory::BookingFull,
            BookingType::Daypass => EventCategory::BookingDaypass,
        }
    }
}
