//! Clubhouse Calendar Server
//!
//! REST API serving the venue booking calendar.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubhouse_calendar::{
    api,
    backend::{Backend, RestBackend},
    config::AppConfig,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("clubhouse_calendar={},tower_http=debug", config.logging.level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Clubhouse Calendar v{}", env!("CARGO_PKG_VERSION"));

    let backend: Arc<dyn Backend> = Arc::new(
        RestBackend::from_config(&config.backend).context("Failed to create backend client")?,
    );
    tracing::info!(url = %config.backend.url, "Backend client ready");

    let services = Services::new(
        backend.clone(),
        &config.calendar,
        config.policy.clone().into(),
    )
    .await;
    services.settings.spawn_refresh(
        backend,
        Duration::from_secs(config.calendar.settings_refresh_secs.max(1)),
    );

    let addr = SocketAddr::new(
        config.server.host.parse().context("Invalid host address")?,
        config.server.port,
    );

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    let app = api::router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
