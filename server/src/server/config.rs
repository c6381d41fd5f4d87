//! Server settings loaded through OrthoConfig.

use std::net::{Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use pagination::{ParsePagingModeError, PagingMode};
use serde::Deserialize;

/// Settings for the ShareIt server process.
///
/// Every field can be set on the command line, in a configuration file or
/// through `SHAREIT_SERVER_*` environment variables.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHAREIT_SERVER")]
pub struct ServerSettings {
    /// Listening address, `0.0.0.0:9090` when unset.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL; the in-process store is used when absent.
    pub database_url: Option<String>,
    /// Maximum pooled connections, 10 when unset.
    pub pool_max_size: Option<u32>,
    /// `page` (legacy `from / size` arithmetic) or `offset`.
    pub paging_mode: Option<String>,
    /// Answer unknown booking states with 400 rather than 500.
    #[ortho_config(default = false)]
    pub unsupported_state_as_bad_request: bool,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

const DEFAULT_PORT: u16 = 9090;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

impl ServerSettings {
    /// Resolved listening address.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Resolved pool size.
    #[must_use]
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Resolved paging mode.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the text is neither `page` nor `offset`.
    pub fn paging_mode(&self) -> Result<PagingMode, ParsePagingModeError> {
        self.paging_mode
            .as_deref()
            .map_or(Ok(PagingMode::default()), str::parse)
    }
}
