//! Postgres connection configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::{StoreError, StoreResult};

/// Postgres connection settings, read from `POSTGRES_*` variables.
#[derive(Clone)]
pub struct StoreConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    /// libpq-style `sslmode` (disable, prefer, require, verify-ca, verify-full)
    pub ssl_mode: String,
    /// Maximum pool connections
    pub max_connections: u32,
    /// Timeout for acquiring a connection
    pub connect_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            user: "user".to_string(),
            password: "password".to_string(),
            host: "postgres".to_string(),
            port: 5432,
            database: "converter".to_string(),
            ssl_mode: "disable".to_string(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str, default: String| lookup(key).unwrap_or(default);

        let port = match lookup("POSTGRES_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| StoreError::config(format!("invalid POSTGRES_PORT: {raw}")))?,
            None => defaults.port,
        };

        let ssl_mode = var("POSTGRES_SSL_MODE", defaults.ssl_mode);
        PgSslMode::from_str(&ssl_mode)
            .map_err(|_| StoreError::config(format!("invalid POSTGRES_SSL_MODE: {ssl_mode}")))?;

        Ok(Self {
            user: var("POSTGRES_USER", defaults.user),
            password: var("POSTGRES_PASSWORD", defaults.password),
            host: var("POSTGRES_HOST", defaults.host),
            port,
            database: var("POSTGRES_DB", defaults.database),
            ssl_mode,
            max_connections: lookup("POSTGRES_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            connect_timeout: lookup("POSTGRES_CONNECT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        })
    }

    /// Connection URL with the password redacted, for logs.
    pub fn redacted_url(&self) -> String {
        format!(
            "postgres://{}:***@{}:{}/{}?sslmode={}",
            self.user, self.host, self.port, self.database, self.ssl_mode
        )
    }

    /// sqlx connect options for this configuration.
    pub fn connect_options(&self) -> StoreResult<PgConnectOptions> {
        let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
            .map_err(|_| StoreError::config(format!("invalid ssl mode: {}", self.ssl_mode)))?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(ssl_mode))
    }
}
