//! Pricing and conflict oracle adapter
//!
//! Transport failures never leave this module. A failed price estimate is
//! `None` ("unavailable", never zero). A failed conflict check resolves to "no
//! conflict" (fail-open), while a conflict the server explicitly reports is
//! always honored (fail-closed). Every request still goes through admin
//! approval downstream, which is where a conflict missed here gets caught.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::{
    backend::Backend,
    models::{BookingType, ConflictCheck, ConflictQuery},
};

#[derive(Clone)]
pub struct PricingOracle {
    backend: Arc<dyn Backend>,
}

impl PricingOracle {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Base price for a booking type and quantity, `None` when unavailable
    pub async fn estimate_base_price(&self, booking_type: BookingType, quantity: i64) -> Option<Decimal> {
        if quantity < 1 {
            return None;
        }
        match self.backend.calculate_booking_price(booking_type, quantity).await {
            Ok(price) => Some(price),
            Err(e) => {
                tracing::warn!(%booking_type, quantity, "Price estimate unavailable: {}", e);
                None
            }
        }
    }

    /// Ask the server whether the range collides with an approved booking.
    ///
    /// `query` must carry policy-derived start and end times, never raw input.
    pub async fn check_conflict(&self, query: &ConflictQuery) -> ConflictCheck {
        match self.backend.check_booking_conflict(query).await {
            Ok(check) => check,
            Err(e) => {
                tracing::warn!(
                    date = %query.date,
                    start = %query.start_time,
                    end = %query.end_time,
                    "Conflict check failed, allowing submission: {}",
                    e
                );
                ConflictCheck::default()
            }
        }
    }
}
