//! Clubhouse venue calendar
//!
//! Booking and scheduling core for a shared sports venue: reconciles course
//! sessions, approved venue bookings and closed days into one calendar, drives
//! the booking form through the venue's extension policy and submits requests
//! through a pricing and conflict oracle.

use std::sync::Arc;

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
