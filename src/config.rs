use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub db: DbConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = DbConfig {
            url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            user: std::env::var("DB_USER").ok().filter(|v| !v.is_empty()),
            password: std::env::var("DB_PASSWORD").ok().filter(|v| !v.is_empty()),
            max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
        };
        Ok(Self {
            db,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("APP_PORT", 8080)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Reads an optional variable, falling back to `default` when unset.
/// A value that is set but does not parse is an error.
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} has invalid value {raw:?}")),
        Err(_) => Ok(default),
    }
}
