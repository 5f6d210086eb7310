//! Data models for the booking calendar

pub mod booking;
pub mod enums;
pub mod event;
pub mod policy;

// Re-export commonly used types
pub use booking::{BookingDraft, BookingOutcome, BookingRequest, ConflictCheck, ConflictQuery, DraftEdit, FieldErrors};
pub use enums::{BookingType, CalendarView, EventCategory, ViewerMode};
pub use event::{CalendarEvent, DateRange, EnrollmentRow, SessionRow, VenueBookingRow};
pub use policy::{PriceEstimate, VenuePolicy};
