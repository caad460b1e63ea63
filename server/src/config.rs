//! Process configuration.
//!
//! Only database connection parameters come from the environment; the
//! listening address, timeouts and CORS origins are fixed.

use std::env;
use std::time::Duration;
use thiserror::Error;

pub const LISTEN_ADDR: &str = "0.0.0.0:8080";

/// How long a store call may wait for a blocking worker. A call that waits
/// longer is dropped without touching the database.
pub const DB_QUEUE_TIMEOUT: Duration = Duration::from_millis(500);

/// Pool checkout bound.
pub const DB_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(1);

/// Set as `statement_timeout` on every pooled connection. Postgres cancels
/// and rolls back any statement that runs longer.
pub const DB_STATEMENT_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-request bound on a store call. Must stay above queue, checkout and
/// statement limits combined, so that it only fires when those fail.
pub const DB_TIMEOUT: Duration = Duration::from_secs(5);

pub const CORS_ALLOWED_ORIGINS: [&str; 2] = ["https://foo.com", "https://github.com"];

const DEFAULT_DB_PORT: u16 = 5432;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("DB_PORT must be a port number, got {0:?}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl DbConfig {
    /// Read `DB_*` variables, loading `.env` first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port = match lookup("DB_PORT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_DB_PORT,
        };

        Ok(DbConfig {
            host: required("DB_HOST")?,
            port,
            user: required("DB_USER")?,
            password: lookup("DB_PASSWORD").unwrap_or_default(),
            name: required("DB_NAME")?,
        })
    }

    /// libpq keyword/value connection string.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            quote(&self.host),
            self.port,
            quote(&self.user),
            quote(&self.password),
            quote(&self.name),
        )
    }
}

// libpq: single-quote the value, backslash-escape quotes and backslashes.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}
