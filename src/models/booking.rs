//! Booking draft, booking requests and conflict oracle payloads

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use super::enums::BookingType;

/// Field-keyed validation messages, empty when the draft can be submitted
pub type FieldErrors = BTreeMap<String, String>;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// BookingDraft
// ---------------------------------------------------------------------------

/// In-progress form state of a new venue booking.
///
/// `end_time` is derived by the extension policy and is never taken from user
/// edits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct BookingDraft {
    #[validate(custom(function = "not_blank", message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: String,
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    /// Booking date (YYYY-MM-DD)
    #[validate(custom(function = "not_blank", message = "Date is required"))]
    pub date: String,
    /// Start time (HH:MM)
    pub start_time: String,
    /// Derived end time (HH:MM)
    pub end_time: String,
    pub booking_type: BookingType,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    pub use_extra_time: bool,
    /// Pre-closing 30-minute blocks
    pub extra_blocks: u32,
    pub use_overtime: bool,
    /// Post-closing 30-minute blocks
    pub overtime_blocks: u32,
}

impl BookingDraft {
    /// Fresh draft for a selected calendar slot
    pub fn for_slot(date: NaiveDate, start_time: Option<String>) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            start_time: start_time.unwrap_or_default(),
            quantity: 1,
            ..Self::default()
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Run the declarative field checks into a field-keyed map
    pub fn field_errors(&self) -> FieldErrors {
        match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => flatten_errors(&errors),
        }
    }
}

fn flatten_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, list)| {
            list.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

/// Partial update coming from the booking form.
///
/// Has no `end_time` field; the end time is always derived.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DraftEdit {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub booking_type: Option<BookingType>,
    pub quantity: Option<i64>,
    pub use_extra_time: Option<bool>,
    pub extra_blocks: Option<u32>,
    pub use_overtime: Option<bool>,
    pub overtime_blocks: Option<u32>,
}

impl DraftEdit {
    pub fn touches_extra_time(&self) -> bool {
        self.use_extra_time.is_some() || self.extra_blocks.is_some()
    }

    /// Whether the oracle base price depends on this edit
    pub fn touches_pricing(&self) -> bool {
        self.booking_type.is_some() || self.quantity.is_some()
    }

    pub fn apply(self, draft: &mut BookingDraft) {
        macro_rules! set_f {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field { draft.$field = value; })*
            };
        }

        set_f!(
            full_name,
            email,
            phone,
            title,
            date,
            start_time,
            booking_type,
            quantity,
            use_extra_time,
            extra_blocks,
            use_overtime,
            overtime_blocks
        );
    }
}

// ---------------------------------------------------------------------------
// Conflict oracle
// ---------------------------------------------------------------------------

/// `check_booking_conflict` arguments, always with policy-derived times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictQuery {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub venue: String,
    pub booking_type: BookingType,
    pub quantity: i64,
    pub exclude_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConflictCheck {
    pub has_conflict: bool,
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Booking request
// ---------------------------------------------------------------------------

/// `create_booking_request` arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub booking_type: BookingType,
    pub quantity: i64,
    pub venue: String,
    /// Total the user was shown, frozen at submission
    pub forced_total: Decimal,
}

/// `create_booking_request` result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingOutcome {
    Accepted {
        estimated_price: Option<Decimal>,
        status: String,
        invoice_id: Option<String>,
    },
    Rejected {
        reason: String,
    },
}

/// Submission result returned to the calendar
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingReceipt {
    pub status: String,
    pub invoice_id: Option<String>,
    #[schema(value_type = Option<String>)]
    pub estimated_price: Option<Decimal>,
    #[schema(value_type = String)]
    pub forced_total: Decimal,
}
