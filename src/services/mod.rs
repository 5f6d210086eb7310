//! Business logic services

pub mod booking;
pub mod calendar;
pub mod events;
pub mod interaction;
pub mod policy;
pub mod presentation;
pub mod pricing;
pub mod settings;

use std::sync::Arc;

use crate::{
    backend::Backend,
    config::CalendarConfig,
    models::{CalendarView, VenuePolicy, ViewerMode},
};

use self::calendar::{CalendarController, CalendarOptions, CalendarRegistry};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub backend: Arc<dyn Backend>,
    pub settings: settings::SettingsFeed,
    pub calendars: Arc<CalendarRegistry>,
    pub options: Arc<CalendarOptions>,
}

impl Services {
    /// Create all services; the venue policy is read once from the backend
    pub async fn new(
        backend: Arc<dyn Backend>,
        calendar_config: &CalendarConfig,
        fallback_policy: VenuePolicy,
    ) -> Self {
        let settings = settings::SettingsFeed::bootstrap(backend.as_ref(), fallback_policy).await;
        Self::with_settings(backend, calendar_config, settings)
    }

    pub fn with_settings(
        backend: Arc<dyn Backend>,
        calendar_config: &CalendarConfig,
        settings: settings::SettingsFeed,
    ) -> Self {
        let phone_region = policy::phone_region(calendar_config.phone_region.as_deref());
        if calendar_config.phone_region.is_some() && phone_region.is_none() {
            tracing::warn!(
                "Unknown phone region {:?}, phone numbers need a country prefix",
                calendar_config.phone_region
            );
        }

        Self {
            backend,
            settings,
            calendars: Arc::new(CalendarRegistry::default()),
            options: Arc::new(CalendarOptions {
                venue: calendar_config.venue.clone(),
                closed_weekdays: calendar_config.closed_weekdays.clone(),
                phone_region,
            }),
        }
    }

    /// Mount a new calendar instance for a viewer
    pub async fn mount_calendar(
        &self,
        mode: ViewerMode,
        view: CalendarView,
    ) -> Arc<CalendarController> {
        let calendar = CalendarController::new(
            mode,
            view,
            self.backend.clone(),
            self.settings.clone(),
            self.options.clone(),
        );
        let calendar = self.calendars.insert(calendar).await;
        tracing::info!(calendar = %calendar.id, %mode, "Calendar mounted");
        calendar
    }
}
