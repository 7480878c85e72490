mod app;
mod config;
mod db;
mod error;
mod state;
mod telemetry;
mod users;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config.db).await?;
    let app = app::build_app(AppState::with_pool(pool)?);

    app::serve(app, &config.listen_addr()).await
}
