//! Booking form session, from the modal opening until it closes or the request is accepted

use phonenumber::country;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        BookingDraft, BookingRequest, BookingType, ConflictQuery, DraftEdit, VenuePolicy,
    },
    services::{
        interaction::Prefill,
        policy::{self, Derived},
    },
    time,
};

/// Identifies one base-price request; stale tickets are discarded on arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceTicket {
    pub session_id: Uuid,
    pub generation: u64,
    pub booking_type: BookingType,
    pub quantity: i64,
}

/// What gets sent once local validation passed
#[derive(Debug, Clone)]
pub struct Submission {
    pub conflict: ConflictQuery,
    pub request: BookingRequest,
}

/// Booking form as shown to the user
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub id: Uuid,
    pub draft: BookingDraft,
    pub derived: Derived,
    /// Set once each time the end time becomes clamped
    pub warning: Option<String>,
    /// Extra-time controls are read-only while overtime is enabled
    pub extra_time_locked: bool,
    pub submitting: bool,
}

#[derive(Debug)]
pub struct BookingSession {
    pub id: Uuid,
    pub draft: BookingDraft,
    base_price: Option<Decimal>,
    /// Total of the last view handed out
    shown_total: Option<Decimal>,
    clamp_warned: bool,
    price_generation: u64,
    submitting: bool,
}

impl BookingSession {
    /// New session for a selected slot; a dragged end time seeds the extensions
    pub fn open(prefill: &Prefill, policy: &VenuePolicy) -> Self {
        let mut draft = BookingDraft::for_slot(prefill.date, prefill.start_time.clone());
        if let Some(end) = prefill.end_time.as_deref().and_then(time::to_naive_time) {
            policy::seed_extensions(&mut draft, time::minutes_of(end), policy);
        }

        Self {
            id: Uuid::new_v4(),
            draft,
            base_price: None,
            shown_total: None,
            clamp_warned: false,
            price_generation: 0,
            submitting: false,
        }
    }

    pub fn base_price(&self) -> Option<Decimal> {
        self.base_price
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn derive(&self, policy: &VenuePolicy) -> Derived {
        policy::derive(&self.draft, policy, self.base_price)
    }

    /// Apply a form edit.
    ///
    /// Returns a ticket when the base price has to be fetched again.
    pub fn apply_edit(&mut self, edit: DraftEdit) -> AppResult<Option<PriceTicket>> {
        if self.submitting {
            return Err(AppError::Busy);
        }
        let keeps_overtime = edit.use_overtime.unwrap_or(self.draft.use_overtime);
        if self.draft.use_overtime && keeps_overtime && edit.touches_extra_time() {
            return Err(AppError::Rejected(
                "Extra time cannot be changed while overtime is enabled".to_string(),
            ));
        }

        let reprice = edit.touches_pricing();
        edit.apply(&mut self.draft);
        Ok(reprice.then(|| self.begin_price_request()))
    }

    /// Supersede any pending estimate and describe the new request
    pub fn begin_price_request(&mut self) -> PriceTicket {
        self.price_generation += 1;
        PriceTicket {
            session_id: self.id,
            generation: self.price_generation,
            booking_type: self.draft.booking_type,
            quantity: self.draft.quantity,
        }
    }

    /// Store an estimate unless a newer request has started since. Returns whether it was kept.
    pub fn finish_price_request(&mut self, ticket: &PriceTicket, base: Option<Decimal>) -> bool {
        if ticket.session_id != self.id || ticket.generation != self.price_generation {
            return false;
        }
        self.base_price = base;
        true
    }

    /// Re-derive against the current policy and build the form view
    pub fn refresh(&mut self, policy: &VenuePolicy) -> SessionView {
        let derived = self.derive(policy);
        derived.apply_to(&mut self.draft);
        self.shown_total = Some(derived.price.total);

        let warning = if derived.schedule.clamped {
            if self.clamp_warned {
                None
            } else {
                self.clamp_warned = true;
                Some(format!(
                    "The venue closes at {}; the booking was shortened. Enable overtime to stay later.",
                    policy.closing_time
                ))
            }
        } else {
            self.clamp_warned = false;
            None
        };

        SessionView {
            id: self.id,
            draft: self.draft.clone(),
            derived,
            warning,
            extra_time_locked: self.draft.use_overtime,
            submitting: self.submitting,
        }
    }

    /// Validate and freeze the draft for submission.
    ///
    /// The total of the last view becomes the forced total of the request. If
    /// the policy changed since then, the form stays open for review instead.
    pub fn begin_submit(
        &mut self,
        policy: &VenuePolicy,
        venue: &str,
        region: Option<country::Id>,
    ) -> AppResult<Submission> {
        if self.submitting {
            return Err(AppError::Busy);
        }

        let derived = self.derive(policy);
        derived.apply_to(&mut self.draft);

        let mut errors =
            policy::validate_submission(&self.draft, &derived.schedule, policy, region);
        if !derived.price.is_complete() {
            errors.insert(
                "price".to_string(),
                "Price estimate unavailable, please retry".to_string(),
            );
        } else if self.shown_total.is_some_and(|shown| shown != derived.price.total) {
            errors.insert("price".to_string(), "Price changed, please review".to_string());
        }
        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        let draft = &self.draft;
        let start_time = time::clean_time(Some(&draft.start_time));
        let end_time = derived.schedule.end_time.clone();

        let submission = Submission {
            conflict: ConflictQuery {
                date: draft.date.trim().to_string(),
                start_time: start_time.clone(),
                end_time: end_time.clone(),
                venue: venue.to_string(),
                booking_type: draft.booking_type,
                quantity: draft.quantity,
                exclude_id: None,
            },
            request: BookingRequest {
                full_name: draft.full_name.trim().to_string(),
                email: draft.email.trim().to_string(),
                phone: draft.phone.trim().to_string(),
                title: draft.title.trim().to_string(),
                date: draft.date.trim().to_string(),
                start_time,
                end_time,
                booking_type: draft.booking_type,
                quantity: draft.quantity,
                venue: venue.to_string(),
                forced_total: derived.price.total,
            },
        };

        self.submitting = true;
        Ok(submission)
    }

    /// Re-enable submission after a failed attempt; the draft is kept for retry
    pub fn end_submit(&mut self) {
        self.submitting = false;
    }
}
