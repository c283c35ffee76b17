mod config;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use wayfarer_api::AppState;
use wayfarer_api::storage::AvatarStorage;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::load()?;

    // Init database and avatar bucket
    let db = wayfarer_db::Database::open(&config.db_path)?;
    let storage = AvatarStorage::new(config.storage_dir.clone(), &config.public_url).await?;
    let state = AppState::new(db, storage, config.env.clone());

    // Unmatched paths fall through to the SPA bundle
    let index = config.static_dir.join("index.html");
    if !index.exists() {
        warn!("No frontend bundle at {}", index.display());
    }
    let spa = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

    let app = wayfarer_api::router(state)
        .fallback_service(spa)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = bind(&config.host, config.port).await?;
    info!("Wayfarer ({}) listening on {}", config.env, listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Host names such as `localhost` are resolved, not only IP literals.
async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("binding {}:{}", host, port))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_by_host_name() {
        let listener = bind("localhost", 0).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn unresolvable_host_is_an_error() {
        assert!(bind("no such host", 0).await.is_err());
    }
}
