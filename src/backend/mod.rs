//! Hosted backend access (tables, remote procedures, functions)
//!
//! Everything the calendar reads or writes goes through [`Backend`]. The
//! production implementation is [`rest::RestBackend`]; tests substitute mocks
//! or in-memory fakes.

pub mod rest;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{
    BookingOutcome, BookingRequest, BookingType, ConflictCheck, ConflictQuery, DateRange,
    EnrollmentRow, SessionRow, VenueBookingRow, VenuePolicy,
};

pub use rest::RestBackend;

/// Errors raised while talking to the hosted backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected backend response: {0}")]
    Decode(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Course sessions whose start date falls in the range, deleted ones excluded
    async fn fetch_sessions(&self, range: DateRange) -> Result<Vec<SessionRow>, BackendError>;

    /// Approved venue bookings in the range
    async fn fetch_approved_bookings(
        &self,
        range: DateRange,
    ) -> Result<Vec<VenueBookingRow>, BackendError>;

    /// Enrollments of one course session
    async fn fetch_roster(&self, session_id: i64) -> Result<Vec<EnrollmentRow>, BackendError>;

    /// Admin-configured venue settings row
    async fn fetch_venue_settings(&self) -> Result<VenuePolicy, BackendError>;

    /// `calculate_booking_price` remote procedure
    async fn calculate_booking_price(
        &self,
        booking_type: BookingType,
        quantity: i64,
    ) -> Result<Decimal, BackendError>;

    /// `check_booking_conflict` remote procedure
    async fn check_booking_conflict(
        &self,
        query: &ConflictQuery,
    ) -> Result<ConflictCheck, BackendError>;

    /// `create_booking_request` remote procedure
    async fn create_booking_request(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingOutcome, BackendError>;

    /// Downstream invoice generation for an accepted request
    async fn generate_invoice(&self, invoice_id: &str) -> Result<(), BackendError>;
}
