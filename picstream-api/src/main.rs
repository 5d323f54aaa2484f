//! # Picstream API Server
//!
//! Social media backend: accounts, image/video posts hosted on ImageKit,
//! a chronological feed, likes and comments.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=... IMAGEKIT_PRIVATE_KEY=... IMAGEKIT_PUBLIC_KEY=... \
//! IMAGEKIT_URL_ENDPOINT=... cargo run -p picstream-api
//! ```

use anyhow::Context;
use picstream_api::{
    app::{build_router, AppState},
    config::Config,
};
use picstream_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool},
    },
    media::ImageKitClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "picstream_api=debug,picstream_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Picstream API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    ensure_database_exists(&config.database.url)
        .await
        .context("Failed to create database")?;
    let pool = create_pool(config.pool_config())
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let media = ImageKitClient::new(config.imagekit.client_config())
        .context("Failed to build ImageKit client")?;
    tracing::info!(url_endpoint = %config.imagekit.url_endpoint, "ImageKit client ready");

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config, Arc::new(media));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
