//! ShareIt gateway entry-point.

mod gateway;

use actix_web::web;
use color_eyre::eyre::Result;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use shareit_gateway::health::HealthState;

use gateway::{GatewaySettings, build_state, create_server};

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

    let settings = GatewaySettings::load_from_iter(std::env::args_os())?;
    let state = build_state(&settings)?;
    let health_state = web::Data::new(HealthState::new());

    info!(
        bind_addr = %settings.bind_addr(),
        server_url = ?settings.server_url,
        "starting ShareIt gateway"
    );
    create_server(health_state, state, &settings)?.await?;
    Ok(())
}
