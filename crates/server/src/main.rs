use std::path::PathBuf;
use std::sync::Arc;

use sterling_convert::Converter;

mod auth;
mod config;
mod jobs;
mod routes;
mod usage;

use auth::StaticTokens;
use config::ServerConfig;
use jobs::InMemoryJobs;
use routes::AppState;
use usage::DailyQuota;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::var_os("STERLING_CONFIG").map(PathBuf::from);
    let config = ServerConfig::load(config_path.as_deref())?;

    let state = Arc::new(AppState {
        converter: Arc::new(Converter::default()),
        auth: Arc::new(StaticTokens::new(config.api_tokens.clone())),
        gate: Arc::new(DailyQuota::new(config.daily_quota)),
        jobs: Arc::new(InMemoryJobs::new()),
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("sterling-server listening on {}", config.bind);
    axum::serve(listener, routes::router(state)).await?;
    Ok(())
}
