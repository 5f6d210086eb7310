//! Configuration management for the calendar server

use chrono::Weekday;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

use crate::models::VenuePolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Hosted backend (database, remote procedures, functions)
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalendarConfig {
    /// Venue identifier sent to the pricing and conflict procedures
    pub venue: String,
    /// Weekly closed days (`Sun`, `Mon`, ...)
    pub closed_weekdays: Vec<Weekday>,
    /// Refresh interval of the live venue settings
    pub settings_refresh_secs: u64,
    /// Default region for phone numbers without a country prefix (ISO 3166 alpha-2)
    pub phone_region: Option<String>,
}

/// Venue policy used until the backend settings row has been read
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    pub closing_time: String,
    pub overtime_cutoff_time: String,
    pub extra_time_price_per_30min: Decimal,
    pub overtime_price_per_30min: Decimal,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix CLUBHOUSE_)
            .add_source(
                Environment::with_prefix("CLUBHOUSE")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("backend.url", env::var("BACKEND_URL").ok())?
            .set_override_option("backend.api_key", env::var("BACKEND_API_KEY").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            venue: "club".to_string(),
            closed_weekdays: vec![Weekday::Sun],
            settings_refresh_secs: 30,
            phone_region: None,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        let policy = VenuePolicy::default();
        Self {
            closing_time: policy.closing_time,
            overtime_cutoff_time: policy.overtime_cutoff_time,
            extra_time_price_per_30min: policy.extra_time_price_per_30min,
            overtime_price_per_30min: policy.overtime_price_per_30min,
        }
    }
}

impl From<PolicyConfig> for VenuePolicy {
    fn from(c: PolicyConfig) -> Self {
        VenuePolicy {
            closing_time: c.closing_time,
            overtime_cutoff_time: c.overtime_cutoff_time,
            extra_time_price_per_30min: c.extra_time_price_per_30min,
            overtime_price_per_30min: c.overtime_price_per_30min,
        }
        .normalized()
    }
}
