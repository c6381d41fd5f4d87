//! Builders choosing the persistence back-end and wiring HTTP state.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use shareit_server::domain::ports::UnitOfWork;
use shareit_server::inbound::http::state::HttpState;
use shareit_server::outbound::persistence::{
    DbPool, DieselUnitOfWork, InMemoryStore, PoolConfig, run_pending_migrations,
};

use super::ServerSettings;

/// PostgreSQL when a URL is configured, otherwise the in-process store.
pub(crate) async fn build_store(settings: &ServerSettings) -> Result<Arc<dyn UnitOfWork>> {
    let Some(url) = settings.database_url.as_deref() else {
        warn!("no database configured; state lives in process memory");
        return Ok(Arc::new(InMemoryStore::new()));
    };
    if settings.run_migrations {
        let applied = run_pending_migrations(url)
            .await
            .wrap_err("database migration failed")?;
        info!(applied, "migrations applied");
    }
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("database pool construction failed")?;
    Ok(Arc::new(DieselUnitOfWork::new(pool)))
}

/// Domain services over `store`, configured from `settings`.
pub(crate) fn build_http_state(
    store: &Arc<dyn UnitOfWork>,
    settings: &ServerSettings,
) -> Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let paging = settings
        .paging_mode()
        .wrap_err("invalid SHAREIT_SERVER_PAGING_MODE")?;
    Ok(HttpState::from_store(store, &clock, paging)
        .with_unsupported_state_as_bad_request(settings.unsupported_state_as_bad_request))
}
