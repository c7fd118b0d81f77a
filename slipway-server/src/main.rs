//! Slipway Server Entry Point

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slipway_server::{api, config::AppConfig, db, store::Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slipway_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let stores = Stores::postgres(pool);

    let app = api::create_router(config.clone(), stores);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Slipway server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
