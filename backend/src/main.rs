//! Backend entry-point: loads settings and serves the snapshot proxy.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use project_explorer::config::ExplorerSettings;
use project_explorer::inbound::http::health::HealthState;
use server::{ServerConfig, create_server};

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

    let settings = ExplorerSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let config = ServerConfig::from_settings(&settings)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!(bind_addr = %config.bind_addr(), "starting project explorer");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
