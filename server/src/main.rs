use meetmap_core::config::AppConfig;
use server::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    meetmap_core::init_tracing();

    let config = AppConfig::load()?;
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, data_dir = %config.storage.data_dir, "meetmap listening");

    axum::serve(listener, app).await?;
    Ok(())
}
