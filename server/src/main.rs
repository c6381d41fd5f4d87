//! ShareIt server entry-point.

mod server;

use actix_web::web;
use color_eyre::eyre::Result;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use shareit_server::inbound::http::health::HealthState;

use server::{ServerSettings, build_http_state, build_store, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load_from_iter(std::env::args_os())?;
    let store = build_store(&settings).await?;
    let http_state = build_http_state(&store, &settings)?;
    let health_state = web::Data::new(HealthState::new());

    info!(bind_addr = %settings.bind_addr(), "starting ShareIt server");
    create_server(health_state, http_state, &settings)?.await?;
    Ok(())
}
