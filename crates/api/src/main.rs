use anyhow::Context;
use tracing::{info, warn};

use gameshop_infra::{AppConfig, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gameshop_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.insecure_jwt_secret {
        warn!("JWT_SECRET not set; using insecure dev default");
    }

    let stores = Stores::open(&config.storage)
        .await
        .context("failed to open stores")?;

    let app = gameshop_api::app::build_app(config.jwt_secret, stores);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
