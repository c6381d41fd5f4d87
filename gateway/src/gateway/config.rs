//! Gateway settings loaded through OrthoConfig.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

/// Settings for the gateway process, also read from `SHAREIT_GATEWAY_*`.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHAREIT_GATEWAY")]
pub struct GatewaySettings {
    /// Listening address, `0.0.0.0:8080` when unset.
    pub bind_addr: Option<SocketAddr>,
    /// Base URL of the ShareIt server, `http://localhost:9090` when unset.
    pub server_url: Option<String>,
    /// Upstream request timeout in seconds, 30 when unset.
    pub request_timeout_secs: Option<u64>,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SERVER_URL: &str = "http://localhost:9090";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl GatewaySettings {
    /// Resolved listening address.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Resolved server base URL.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the configured text is not a URL.
    pub fn server_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL))
    }

    /// Resolved upstream timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 3] = [
        "SHAREIT_GATEWAY_BIND_ADDR",
        "SHAREIT_GATEWAY_SERVER_URL",
        "SHAREIT_GATEWAY_REQUEST_TIMEOUT_SECS",
    ];

    fn load() -> GatewaySettings {
        GatewaySettings::load_from_iter([OsString::from("shareit-gateway")])
            .expect("settings should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(
            settings.server_url().expect("url").as_str(),
            "http://localhost:9090/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SHAREIT_GATEWAY_BIND_ADDR", Some("127.0.0.1:8181".to_owned())),
            (
                "SHAREIT_GATEWAY_SERVER_URL",
                Some("http://shareit-server:9090/api".to_owned()),
            ),
            ("SHAREIT_GATEWAY_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
        ]);

        let settings = load();
        assert_eq!(settings.bind_addr().port(), 8181);
        assert_eq!(
            settings.server_url().expect("url").host_str(),
            Some("shareit-server")
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    fn malformed_server_url_is_reported() {
        let _guard = lock_env([("SHAREIT_GATEWAY_SERVER_URL", Some("not a url".to_owned()))]);
        assert!(load().server_url().is_err());
    }
}
