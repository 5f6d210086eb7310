//! Calendar instances and their booking forms

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use phonenumber::country;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    backend::Backend,
    error::{AppError, AppResult},
    models::{
        booking::BookingReceipt, BookingOutcome, CalendarView, DateRange, DraftEdit, ViewerMode,
    },
    services::{
        booking::{BookingSession, PriceTicket, SessionView, Submission},
        events::EventReconciler,
        interaction::{self, Action, ClickTarget, InteractionContext, Prefill},
        presentation::{self, CalendarProps, PropsInput, RenderedEvent},
        pricing::PricingOracle,
        settings::SettingsFeed,
    },
};

const DEFAULT_CONFLICT_REASON: &str = "The selected time is not available";

/// Settings shared by every calendar instance
#[derive(Debug, Clone)]
pub struct CalendarOptions {
    pub venue: String,
    pub closed_weekdays: Vec<Weekday>,
    pub phone_region: Option<country::Id>,
}

/// Result of a click or selection
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InteractionOutcome {
    #[serde(flatten)]
    pub action: Action,
    /// Booking form opened by the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<SessionView>,
    /// Calendar state after a view switch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<CalendarProps>,
}

pub struct CalendarController {
    pub id: Uuid,
    pub mode: ViewerMode,
    view: RwLock<CalendarView>,
    reconciler: EventReconciler,
    session: Mutex<Option<BookingSession>>,
    backend: Arc<dyn Backend>,
    pricing: PricingOracle,
    settings: SettingsFeed,
    options: Arc<CalendarOptions>,
}

impl CalendarController {
    pub fn new(
        mode: ViewerMode,
        view: CalendarView,
        backend: Arc<dyn Backend>,
        settings: SettingsFeed,
        options: Arc<CalendarOptions>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            view: RwLock::new(view),
            reconciler: EventReconciler::new(backend.clone(), mode, options.closed_weekdays.clone()),
            session: Mutex::new(None),
            pricing: PricingOracle::new(backend.clone()),
            backend,
            settings,
            options,
        }
    }

    pub async fn view(&self) -> CalendarView {
        *self.view.read().await
    }

    /// Current widget configuration.
    ///
    /// Course rosters appear only once loaded; pending ones are flagged so the
    /// widget can ask for them one event at a time.
    pub async fn props(&self) -> CalendarProps {
        let view = self.view().await;
        let policy = self.settings.current();
        let events = self.reconciler.events().await;

        let mut rendered = Vec::with_capacity(events.len());
        for event in events.iter() {
            let roster = match event.session_id {
                Some(id) if presentation::wants_roster(event, self.mode, view) => {
                    self.reconciler.cached_roster(id).await
                }
                _ => None,
            };
            rendered.push(presentation::render_event(
                event,
                self.mode,
                view,
                roster.as_deref().map(Vec::as_slice),
            ));
        }

        presentation::build_props(PropsInput {
            calendar_id: self.id,
            mode: self.mode,
            view,
            range: self.reconciler.visible_range().await,
            policy: &policy,
            closed_weekdays: &self.options.closed_weekdays,
            booking_open: self.session.lock().await.is_some(),
            events: rendered,
        })
    }

    /// View or range change reported by the widget
    pub async fn set_range(&self, view: CalendarView, range: DateRange) -> CalendarProps {
        *self.view.write().await = view;
        if self.reconciler.show_range(range).await {
            tracing::debug!(calendar = %self.id, ?range, "Visible range changed");
        }
        self.props().await
    }

    /// Re-render one course event with its roster, loading it if needed
    pub async fn render_roster(&self, event_id: &str) -> AppResult<RenderedEvent> {
        let event = self
            .reconciler
            .find(event_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        let view = self.view().await;

        let session_id = match event.session_id {
            Some(id) if presentation::wants_roster(&event, self.mode, view) => id,
            _ => {
                return Err(AppError::BadRequest(
                    "No roster is shown for this event".to_string(),
                ))
            }
        };

        let roster = self.reconciler.roster(session_id).await;
        Ok(presentation::render_event(&event, self.mode, view, Some(roster.as_slice())))
    }

    async fn context(&self) -> (CalendarView, i64) {
        (self.view().await, self.settings.current().cutoff_minutes())
    }

    async fn dispatch(&self, today: NaiveDate, target: ClickTarget) -> AppResult<InteractionOutcome> {
        let (view, cutoff) = self.context().await;
        let ctx = InteractionContext {
            mode: self.mode,
            view,
            today,
            overtime_cutoff_minutes: cutoff,
            closed_weekdays: &self.options.closed_weekdays,
        };
        let action = interaction::transition(&ctx, &target);
        tracing::debug!(calendar = %self.id, ?action, "Calendar interaction");

        let mut outcome = InteractionOutcome {
            action: action.clone(),
            booking: None,
            props: None,
        };
        match action {
            Action::OpenModal { prefill } => {
                outcome.booking = Some(self.open_booking(prefill).await?);
            }
            Action::SwitchView { view, date } => {
                outcome.props = Some(self.set_range(view, DateRange::single(date)).await);
            }
            Action::Reject { .. } | Action::Noop => {}
        }
        Ok(outcome)
    }

    /// Day cell click; without a hint, occupancy comes from the loaded events
    pub async fn date_click(
        &self,
        today: NaiveDate,
        date: NaiveDate,
        has_events: Option<bool>,
    ) -> AppResult<InteractionOutcome> {
        let has_events = match has_events {
            Some(flag) => flag,
            None => self.reconciler.has_events_on(date).await,
        };
        self.dispatch(today, ClickTarget::Day { date, has_events }).await
    }

    pub async fn select(
        &self,
        today: NaiveDate,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> AppResult<InteractionOutcome> {
        self.dispatch(today, ClickTarget::Range { start, end }).await
    }

    pub async fn event_click(&self, today: NaiveDate, event_id: &str) -> AppResult<InteractionOutcome> {
        let event = self
            .reconciler
            .find(event_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;
        self.dispatch(today, ClickTarget::Event(event)).await
    }

    // -----------------------------------------------------------------------
    // Booking session
    // -----------------------------------------------------------------------

    /// Open the booking modal, replacing any session still open
    pub async fn open_booking(&self, prefill: Prefill) -> AppResult<SessionView> {
        let policy = self.settings.current();
        let mut session = BookingSession::open(&prefill, &policy);
        let ticket = session.begin_price_request();
        *self.session.lock().await = Some(session);
        tracing::info!(
            calendar = %self.id,
            session = %ticket.session_id,
            date = %prefill.date,
            "Booking form opened"
        );

        self.resolve_price(ticket).await;
        self.booking().await
    }

    pub async fn booking(&self) -> AppResult<SessionView> {
        let policy = self.settings.current();
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or_else(no_booking)?;
        Ok(session.refresh(&policy))
    }

    /// Apply a form edit and re-derive; pricing edits wait for a fresh estimate
    pub async fn update_booking(&self, edit: DraftEdit) -> AppResult<SessionView> {
        let ticket = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or_else(no_booking)?;
            session.apply_edit(edit)?
        };
        if let Some(ticket) = ticket {
            self.resolve_price(ticket).await;
        }
        self.booking().await
    }

    /// Discard the booking session; late results for it are ignored
    pub async fn close_booking(&self) -> bool {
        let closed = self.session.lock().await.take();
        if let Some(session) = &closed {
            tracing::debug!(calendar = %self.id, session = %session.id, "Booking form closed");
        }
        closed.is_some()
    }

    /// Fetch a base price outside the session lock and apply it if still current
    async fn resolve_price(&self, ticket: PriceTicket) {
        let base = self
            .pricing
            .estimate_base_price(ticket.booking_type, ticket.quantity)
            .await;

        let mut guard = self.session.lock().await;
        match guard.as_mut() {
            Some(session) if session.id == ticket.session_id => {
                if !session.finish_price_request(&ticket, base) {
                    tracing::debug!(generation = ticket.generation, "Discarding superseded estimate");
                }
            }
            _ => tracing::debug!(session = %ticket.session_id, "Discarding estimate for closed form"),
        }
    }

    /// Validate, check for conflicts, then send the request with the frozen total
    pub async fn submit_booking(&self) -> AppResult<BookingReceipt> {
        let policy = self.settings.current();
        let (session_id, submission) = {
            let mut guard = self.session.lock().await;
            let session = guard.as_mut().ok_or_else(no_booking)?;
            let submission =
                session.begin_submit(&policy, &self.options.venue, self.options.phone_region)?;
            (session.id, submission)
        };

        let result = self.send(&submission).await;

        match result {
            Ok(receipt) => {
                self.reconciler.reload().await;
                let mut guard = self.session.lock().await;
                if guard.as_ref().is_some_and(|s| s.id == session_id) {
                    *guard = None;
                }
                tracing::info!(
                    calendar = %self.id,
                    date = %submission.request.date,
                    total = %receipt.forced_total,
                    "Booking request submitted"
                );
                Ok(receipt)
            }
            Err(e) => {
                let mut guard = self.session.lock().await;
                if let Some(session) = guard.as_mut().filter(|s| s.id == session_id) {
                    session.end_submit();
                }
                Err(e)
            }
        }
    }

    async fn send(&self, submission: &Submission) -> AppResult<BookingReceipt> {
        let check = self.pricing.check_conflict(&submission.conflict).await;
        if check.has_conflict {
            let reason = check
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONFLICT_REASON.to_string());
            tracing::info!(date = %submission.conflict.date, "Booking conflict: {}", reason);
            return Err(AppError::Conflict(reason));
        }

        match self.backend.create_booking_request(&submission.request).await? {
            BookingOutcome::Rejected { reason } => Err(AppError::Rejected(reason)),
            BookingOutcome::Accepted {
                estimated_price,
                status,
                invoice_id,
            } => {
                if let Some(invoice_id) = invoice_id.clone() {
                    self.spawn_invoice(invoice_id);
                }
                Ok(BookingReceipt {
                    status,
                    invoice_id,
                    estimated_price,
                    forced_total: submission.request.forced_total,
                })
            }
        }
    }

    fn spawn_invoice(&self, invoice_id: String) {
        let backend = self.backend.clone();
        tokio::spawn(async move {
            if let Err(e) = backend.generate_invoice(&invoice_id).await {
                tracing::warn!(%invoice_id, "Invoice generation failed: {}", e);
            }
        });
    }
}

fn no_booking() -> AppError {
    AppError::NotFound("No booking in progress".to_string())
}

/// Mounted calendar instances
#[derive(Default)]
pub struct CalendarRegistry {
    calendars: RwLock<HashMap<Uuid, Arc<CalendarController>>>,
}

impl CalendarRegistry {
    pub async fn insert(&self, calendar: CalendarController) -> Arc<CalendarController> {
        let calendar = Arc::new(calendar);
        self.calendars
            .write()
            .await
            .insert(calendar.id, calendar.clone());
        calendar
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Arc<CalendarController>> {
        self.calendars
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Calendar {} not found", id)))
    }

    pub async fn remove(&self, id: Uuid) -> AppResult<()> {
        self.calendars
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Calendar {} not found", id)))
    }

    pub async fn count(&self) -> usize {
        self.calendars.read().await.len()
    }
}
