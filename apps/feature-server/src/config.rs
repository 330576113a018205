//! Effective configuration of the server binary.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context as _;
use apikit::config::{
    ConfigError, DatabaseConfig, LoggingConfig, MOCK_DSN, RuntimeMode, ServerConfig, load_layered,
};
use features::FeaturesConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: RuntimeMode,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// Command line values that take precedence over every other source.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub mock: bool,
}

impl AppConfig {
    /// Defaults, then the YAML file (if any), then `APP__*` and `ENVIRONMENT`.
    ///
    /// # Errors
    /// Propagates [`ConfigError`] from the layered loader.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_layered(path)
    }

    pub fn apply_cli_overrides(&mut self, cli: CliOverrides) {
        if let Some(port) = cli.port {
            self.server.bind_addr = with_port(&self.server.bind_addr, port);
        }
        if cli.mock {
            self.database.dsn = Some(MOCK_DSN.to_owned());
        }
    }

    /// # Errors
    /// Fails when `server.bind_addr` is not a socket address.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let bind_addr = &self.server.bind_addr;
        bind_addr
            .parse()
            .with_context(|| format!("Invalid bind address '{bind_addr}'"))
    }

    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn with_port(bind_addr: &str, port: u16) -> String {
    if let Ok(mut addr) = bind_addr.parse::<SocketAddr>() {
        addr.set_port(port);
        return addr.to_string();
    }
    let host = bind_addr
        .rsplit_once(':')
        .map_or(bind_addr, |(host, _)| host);
    format!("{host}:{port}")
}
