//! Availability and extension policy

use phonenumber::country;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::{BookingDraft, FieldErrors, PriceEstimate, VenuePolicy},
    time::{self, BLOCK_MINUTES},
};

/// End time and extension state computed for one draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Schedule {
    /// Derived end time (HH:MM), empty while no start time is set
    pub end_time: String,
    #[serde(skip)]
    pub end_minutes: i64,
    /// End time before overtime was applied
    #[serde(skip)]
    pub pre_overtime_end_minutes: i64,
    /// The requested end had to be pulled back to closing time
    pub clamped: bool,
    /// Overtime flag after the auto-disable rule
    pub use_overtime: bool,
    pub overtime_blocks: u32,
    /// Overtime was switched off because the booking ends before closing
    pub overtime_auto_disabled: bool,
    pub billed_extra_blocks: u32,
    pub billed_overtime_blocks: u32,
}

/// Everything the booking form shows that is computed rather than typed
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Derived {
    pub schedule: Schedule,
    pub price: PriceEstimate,
}

impl Derived {
    /// Write the derived fields back into the draft
    pub fn apply_to(&self, draft: &mut BookingDraft) {
        draft.end_time = self.schedule.end_time.clone();
        draft.use_overtime = self.schedule.use_overtime;
        draft.overtime_blocks = self.schedule.overtime_blocks;
    }
}

fn block_count(minutes: i64) -> u32 {
    u32::try_from(time::ceil_to_block30(minutes)).unwrap_or(u32::MAX)
}

fn extension_minutes(blocks: u32) -> i64 {
    i64::from(blocks) * BLOCK_MINUTES
}

/// Compute end time and extension state from a draft and the venue policy
pub fn derive_schedule(draft: &BookingDraft, policy: &VenuePolicy) -> Schedule {
    if draft.start_time.trim().is_empty() {
        return Schedule {
            use_overtime: draft.use_overtime,
            overtime_blocks: draft.overtime_blocks,
            ..Schedule::default()
        };
    }

    let start = time::to_minutes(&draft.start_time);
    let closing = policy.closing_minutes();
    let cutoff = policy.cutoff_minutes();
    let base_end = start + draft.booking_type.default_duration_minutes();

    let requested_end = if draft.use_extra_time && draft.extra_blocks > 0 {
        base_end + extension_minutes(draft.extra_blocks)
    } else {
        base_end
    };
    let clamped = !draft.use_overtime && requested_end > closing;
    let pre_overtime_end = requested_end.min(closing);

    // Overtime only represents time past closing.
    let overtime_auto_disabled = draft.use_overtime && pre_overtime_end < closing;
    let (use_overtime, overtime_blocks) = if overtime_auto_disabled {
        (false, 0)
    } else {
        (draft.use_overtime, draft.overtime_blocks)
    };

    // Overtime runs from closing, or from the start for late bookings.
    let overtime_from = start.max(closing);
    let end = if use_overtime && overtime_blocks > 0 {
        (overtime_from + extension_minutes(overtime_blocks)).min(cutoff)
    } else {
        pre_overtime_end
    };

    Schedule {
        end_time: time::from_minutes(end),
        end_minutes: end,
        pre_overtime_end_minutes: pre_overtime_end,
        clamped,
        use_overtime,
        overtime_blocks,
        overtime_auto_disabled,
        billed_extra_blocks: if draft.use_extra_time {
            block_count(pre_overtime_end - base_end)
        } else {
            0
        },
        billed_overtime_blocks: if use_overtime { block_count(end - overtime_from) } else { 0 },
    }
}

/// Full derivation: schedule plus the price estimate built on the oracle base price
pub fn derive(draft: &BookingDraft, policy: &VenuePolicy, base_price: Option<Decimal>) -> Derived {
    let schedule = derive_schedule(draft, policy);
    let price = PriceEstimate::compute(
        base_price,
        schedule.billed_extra_blocks,
        schedule.billed_overtime_blocks,
        policy,
    );
    Derived { schedule, price }
}

/// Turn a drag-selected end time into extension flags on a fresh draft
pub fn seed_extensions(draft: &mut BookingDraft, requested_end: i64, policy: &VenuePolicy) {
    let start = time::to_minutes(&draft.start_time);
    let base_end = start + draft.booking_type.default_duration_minutes();
    let closing = policy.closing_minutes();

    let extra = block_count(requested_end.min(closing) - base_end);
    if extra > 0 {
        draft.use_extra_time = true;
        draft.extra_blocks = extra;
    }

    let overtime = block_count(requested_end - start.max(closing));
    if overtime > 0 {
        draft.use_overtime = true;
        draft.overtime_blocks = overtime;
    }
}

pub fn phone_region(code: Option<&str>) -> Option<country::Id> {
    code.and_then(|c| c.trim().to_ascii_uppercase().parse::<country::Id>().ok())
}

pub fn is_valid_phone(phone: &str, region: Option<country::Id>) -> bool {
    let phone = phone.trim();
    if phone.is_empty() {
        return false;
    }
    phonenumber::parse(region, phone)
        .map(|number| phonenumber::is_valid(&number))
        .unwrap_or(false)
}

/// Submit-time checks, independent of the live clamp warning
pub fn validate_submission(
    draft: &BookingDraft,
    schedule: &Schedule,
    policy: &VenuePolicy,
    region: Option<country::Id>,
) -> FieldErrors {
    let mut errors = draft.field_errors();

    if !errors.contains_key("date") && draft.parsed_date().is_none() {
        errors.insert("date".to_string(), "Date must be YYYY-MM-DD".to_string());
    }

    if !is_valid_phone(&draft.phone, region) {
        errors.insert("phone".to_string(), "Invalid phone number".to_string());
    }

    let Some(start) = time::to_naive_time(&draft.start_time) else {
        errors.insert("start_time".to_string(), "Start time is required".to_string());
        return errors;
    };

    let start = time::minutes_of(start);
    if schedule.end_minutes <= start {
        errors.insert("end_time".to_string(), "End time must be after start time".to_string());
    } else if !schedule.use_overtime && schedule.end_minutes > policy.closing_minutes() {
        errors.insert(
            "end_time".to_string(),
            format!("Booking must end by closing time ({})", policy.closing_time),
        );
    } else if schedule.use_overtime && schedule.end_minutes > policy.cutoff_minutes() {
        errors.insert(
            "end_time".to_string(),
            format!("Overtime must end by {}", policy.overtime_cutoff_time),
        );
    }

    errors
}
