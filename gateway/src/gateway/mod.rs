//! Gateway construction and middleware wiring.

mod config;

pub use config::GatewaySettings;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultClock;

use shareit_gateway::health::{HealthState, live, ready};
use shareit_gateway::routes::configure;
use shareit_gateway::{GatewayState, HttpForwarder, Trace};

/// Build handler state from settings.
///
/// # Errors
///
/// Fails when the server URL is invalid or the HTTP client cannot be built.
pub fn build_state(settings: &GatewaySettings) -> Result<GatewayState> {
    let base = settings
        .server_url()
        .wrap_err("invalid SHAREIT_GATEWAY_SERVER_URL")?;
    let forwarder = HttpForwarder::new(base, settings.request_timeout())
        .wrap_err("failed to build the upstream HTTP client")?;
    Ok(GatewayState::new(Arc::new(forwarder), Arc::new(DefaultClock)))
}

/// Bind the HTTP server and mark it ready.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when the socket cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    state: GatewayState,
    settings: &GatewaySettings,
) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(state.clone())
            .wrap(Trace)
            .configure(configure)
            .service(ready)
            .service(live)
    })
    .bind(settings.bind_addr())?
    .run();
    health_state.mark_ready();
    Ok(server)
}
