use anyhow::Context;

use crafter_api::app::{build_app, services};
use crafter_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    crafter_observability::init(config.log_format);
    for fallback in &config.fallbacks {
        tracing::warn!("{fallback}");
    }

    let services = services::build_services(&config)
        .await
        .context("failed to initialise the crafting store")?;
    let app = build_app(services, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        store = ?config.store,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
