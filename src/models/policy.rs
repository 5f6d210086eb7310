//! Venue policy (admin-configured settings row) and price estimates

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::time;

/// Admin-configured opening boundaries and extension prices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VenuePolicy {
    /// Closing time (HH:MM)
    pub closing_time: String,
    /// Latest end time for overtime (HH:MM), never before closing
    pub overtime_cutoff_time: String,
    /// Price of one 30-minute block of extra time before closing
    #[schema(value_type = String)]
    pub extra_time_price_per_30min: Decimal,
    /// Price of one 30-minute block of overtime past closing
    #[schema(value_type = String)]
    pub overtime_price_per_30min: Decimal,
}

impl VenuePolicy {
    pub fn closing_minutes(&self) -> i64 {
        time::to_minutes(&self.closing_time)
    }

    /// Overtime cutoff in minutes, never earlier than closing
    pub fn cutoff_minutes(&self) -> i64 {
        time::to_minutes(&self.overtime_cutoff_time).max(self.closing_minutes())
    }

    /// Clean both boundaries and pull an early cutoff up to closing time
    pub fn normalized(mut self) -> Self {
        self.closing_time = time::from_minutes(time::to_minutes(&self.closing_time));
        let cutoff = time::to_minutes(&self.overtime_cutoff_time);
        if cutoff < self.closing_minutes() {
            tracing::warn!(
                "Overtime cutoff {} is before closing time {}, using closing time",
                self.overtime_cutoff_time,
                self.closing_time
            );
            self.overtime_cutoff_time = self.closing_time.clone();
        } else {
            self.overtime_cutoff_time = time::from_minutes(cutoff);
        }
        self
    }
}

impl Default for VenuePolicy {
    fn default() -> Self {
        Self {
            closing_time: "18:00".to_string(),
            overtime_cutoff_time: "20:00".to_string(),
            extra_time_price_per_30min: Decimal::ZERO,
            overtime_price_per_30min: Decimal::ZERO,
        }
    }
}

/// Live price estimate for a booking draft. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceEstimate {
    /// Oracle base price; `None` when the estimate is unavailable, never zero
    #[schema(value_type = Option<String>)]
    pub base: Option<Decimal>,
    #[schema(value_type = String)]
    pub extra_cost: Decimal,
    #[schema(value_type = String)]
    pub overtime_cost: Decimal,
    /// Sum of the known parts; excludes the base while it is unavailable
    #[schema(value_type = String)]
    pub total: Decimal,
}

impl PriceEstimate {
    pub fn compute(
        base: Option<Decimal>,
        extra_blocks: u32,
        overtime_blocks: u32,
        policy: &VenuePolicy,
    ) -> Self {
        let extra_cost = Decimal::from(extra_blocks) * policy.extra_time_price_per_30min;
        let overtime_cost = Decimal::from(overtime_blocks) * policy.overtime_price_per_30min;
        Self {
            base,
            extra_cost,
            overtime_cost,
            total: base.unwrap_or(Decimal::ZERO) + extra_cost + overtime_cost,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.base.is_some()
    }
}
