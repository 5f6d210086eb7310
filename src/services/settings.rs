//! Live venue settings, read at startup and then polled

use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle};

use crate::{backend::Backend, models::VenuePolicy};

#[derive(Clone)]
pub struct SettingsFeed {
    tx: Arc<watch::Sender<VenuePolicy>>,
}

impl SettingsFeed {
    pub fn new(initial: VenuePolicy) -> Self {
        let (tx, _rx) = watch::channel(initial.normalized());
        Self { tx: Arc::new(tx) }
    }

    /// Read the settings row once, falling back to `fallback` when it cannot be read
    pub async fn bootstrap(backend: &dyn Backend, fallback: VenuePolicy) -> Self {
        let initial = match backend.fetch_venue_settings().await {
            Ok(policy) => policy,
            Err(e) => {
                tracing::warn!("Venue settings unavailable, using configured policy: {}", e);
                fallback
            }
        };
        Self::new(initial)
    }

    pub fn current(&self) -> VenuePolicy {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<VenuePolicy> {
        self.tx.subscribe()
    }

    /// Publish a policy; subscribers are only woken when it actually changed
    pub fn publish(&self, policy: VenuePolicy) -> bool {
        let policy = policy.normalized();
        self.tx.send_if_modified(|current| {
            if *current == policy {
                return false;
            }
            *current = policy;
            true
        })
    }

    /// Re-read the settings row. A failed read keeps the last known policy.
    pub async fn refresh(&self, backend: &dyn Backend) -> bool {
        match backend.fetch_venue_settings().await {
            Ok(policy) => {
                let changed = self.publish(policy);
                if changed {
                    tracing::info!("Venue settings updated");
                }
                changed
            }
            Err(e) => {
                tracing::warn!("Failed to refresh venue settings: {}", e);
                false
            }
        }
    }

    pub fn spawn_refresh(&self, backend: Arc<dyn Backend>, every: Duration) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                feed.refresh(backend.as_ref()).await;
            }
        })
    }
}
