//! Backend entry-point: loads settings, wires adapters and serves the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crewplan_backend::inbound::http::health::HealthState;
use server::{AppState, ServerConfig, ServerSettings, build_app_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr()?;
    let AppState { http, probe } = build_app_state(&settings).await?;

    let health_state = web::Data::new(HealthState::new(probe));
    let server = create_server(health_state, ServerConfig::new(bind_addr, http))?;
    info!(%bind_addr, "listening");
    server.await
}
