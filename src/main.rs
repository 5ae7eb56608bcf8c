//! Sentinel - An emergency department surveillance dashboard.
//!
//! Runs one dashboard session and exposes it through the operator console.
//!
//! # API Endpoints
//!
//! - `GET /screen` - Render the current view
//! - `POST /hospitals/:id/select` - Open a hospital's detail view
//! - `POST /back` - Return to the map
//! - `POST /retry` - Re-fetch a failed forecast
//! - `POST /language/toggle`, `PUT /language/:tag` - Switch language
//! - `POST /layers/:layer/toggle` - Show or hide a map layer
//! - `POST /sound/toggle` - Mute or unmute announcements
//! - `GET /health` - Health check

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sentinel::api::{AppState, router, shutdown_on};
use sentinel::config::SentinelConfig;
use sentinel::dashboard::Dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("sentinel=info".parse()?))
        .init();

    let config = SentinelConfig::from_env()?;

    info!(
        port = config.port,
        prediction_url = %config.prediction_url,
        timeout_ms = config.prediction_timeout.as_millis() as u64,
        policy = ?config.failure_policy,
        "Starting Sentinel"
    );

    let dashboard = Dashboard::new(&config);
    let state = AppState {
        dashboard: dashboard.clone(),
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Sentinel console is listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    dashboard.shutdown().await;

    Ok(())
}
