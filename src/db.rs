use std::time::Duration;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::config::DbConfig;

/// Builds connect options from the URL, letting explicit credentials win.
pub fn connect_options(cfg: &DbConfig) -> anyhow::Result<PgConnectOptions> {
    let mut opts: PgConnectOptions = cfg.url.parse().context("parse DATABASE_URL")?;
    if let Some(user) = &cfg.user {
        opts = opts.username(user);
    }
    if let Some(password) = &cfg.password {
        opts = opts.password(password);
    }
    Ok(opts)
}

pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect_with(connect_options(cfg)?)
        .await
        .context("connect to database")?;
    tracing::info!(max_connections = cfg.max_connections, "database pool ready");
    Ok(pool)
}
