//! # cuanbeat-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to a configurable port (default
//! 8080) and selects the storage backend from the environment:
//! `DATABASE_URL` set means Postgres, absent means in-memory.

use std::sync::Arc;

use cuanbeat_api::state::{AppConfig, AppState};
use cuanbeat_api::storage::{memory::MemStorage, postgres::PgStorage, Storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let config = AppConfig {
        port,
        public_backend_url: std::env::var("PUBLIC_BACKEND_URL").ok(),
        public_backend_anon_key: std::env::var("PUBLIC_BACKEND_ANON_KEY").ok(),
    };

    // Select the storage backend. DATABASE_URL set but unreachable is a
    // startup failure, not a silent fallback to in-memory.
    let storage: Arc<dyn Storage> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pg = PgStorage::connect(&url).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            Arc::new(pg)
        }
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running with the in-memory store. \
                 Records will not survive restarts."
            );
            Arc::new(MemStorage::new())
        }
    };

    let state = AppState::with_storage(config, storage);
    let app = cuanbeat_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("cuanbeat API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
