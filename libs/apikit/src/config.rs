//! Layered configuration shared by the service binary and its modules.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. `T::default()`
//! 2. an optional YAML file
//! 3. `APP__*` environment variables, nested with `__` (`APP__SERVER__BIND_ADDR`)
//! 4. the plain `ENVIRONMENT` variable, mapped onto the `environment` key
//!
//! CLI overrides are applied by the binary after loading.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Prefix for nested environment overrides.
pub const ENV_PREFIX: &str = "APP__";

/// Plain environment variable selecting the runtime mode.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Fallback DSN when neither `database.dsn` nor the `PG_*` variables are set.
pub const MOCK_DSN: &str = "sqlite::memory:";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("config file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },
    #[error("invalid configuration: {source}")]
    Invalid {
        #[source]
        source: Box<figment::Error>,
    },
    #[error("invalid database settings: {reason}")]
    Database { reason: String },
}

/// Controls how much of an unexpected failure reaches the client.
///
/// Any value other than `production` (case-insensitive) selects development.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuntimeMode {
    #[default]
    Development,
    Production,
}

impl RuntimeMode {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl From<String> for RuntimeMode {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<RuntimeMode> for String {
    fn from(mode: RuntimeMode) -> Self {
        mode.as_str().to_owned()
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Upper bound for request bodies, in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_owned(),
            body_limit_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection string. Composed from `PG_*` variables when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Resolve the DSN to connect with.
    ///
    /// An explicit `dsn` wins. Otherwise a Postgres DSN is built from `PG_USER`,
    /// `PG_PASSWORD`, `PG_HOST`, `PG_PORT` (default 5432) and `PG_DATABASE` when
    /// `PG_HOST` is set, and [`MOCK_DSN`] is used when it is not.
    ///
    /// # Errors
    /// Returns `ConfigError::Database` when the `PG_*` values do not form a valid URL.
    pub fn resolve_dsn(&self) -> Result<String, ConfigError> {
        if let Some(dsn) = self.dsn.as_deref().filter(|d| !d.trim().is_empty()) {
            return Ok(dsn.to_owned());
        }

        let Some(host) = env_non_empty("PG_HOST") else {
            return Ok(MOCK_DSN.to_owned());
        };

        let port = match env_non_empty("PG_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Database {
                reason: format!("PG_PORT '{raw}' is not a valid port: {e}"),
            })?,
            None => 5432,
        };

        let mut url = url::Url::parse(&format!("postgres://{host}:{port}")).map_err(|e| {
            ConfigError::Database {
                reason: format!("PG_HOST '{host}' is not a valid host: {e}"),
            }
        })?;

        let user = env_non_empty("PG_USER").unwrap_or_else(|| "postgres".to_owned());
        let set_user = url.set_username(&user);
        let set_password = url.set_password(env_non_empty("PG_PASSWORD").as_deref());
        if set_user.is_err() || set_password.is_err() {
            return Err(ConfigError::Database {
                reason: "credentials cannot be set on the postgres URL".to_owned(),
            });
        }
        url.set_path(&env_non_empty("PG_DATABASE").unwrap_or_else(|| "postgres".to_owned()));

        Ok(url.into())
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Load `T` from defaults, an optional YAML file and the environment.
///
/// # Errors
/// Returns `ConfigError::MissingFile` if `path` is given but is not a file, and
/// `ConfigError::Invalid` if the merged sources do not deserialize into `T`.
pub fn load_layered<T>(path: Option<&Path>) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));

    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        figment = figment.merge(Yaml::file(path));
    }

    figment = figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Env::raw().only(&[ENVIRONMENT_VAR]));

    figment.extract().map_err(|e| ConfigError::Invalid {
        source: Box::new(e),
    })
}
