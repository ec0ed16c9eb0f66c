//! # cuanbeat-api — Axum API Service
//!
//! The HTTP surface of the cuanbeat platform: TikTok creators register,
//! browse the song catalog, submit video links, and accrue per-video
//! earnings once an admin approves the submission; referrals grant a
//! fixed bonus for invited registrations.
//!
//! ## API Surface
//!
//! | Prefix                    | Module                  | Domain              |
//! |---------------------------|-------------------------|---------------------|
//! | `/api/creators/*`         | [`routes::creators`]    | Registration, profiles |
//! | `/api/songs/*`            | [`routes::songs`]       | Song catalog        |
//! | `/api/submissions/*`      | [`routes::submissions`] | Submission review   |
//! | `/api/referrals/*`        | [`routes::referrals`]   | Referral program    |
//! | `/api/config`             | [`app`]                 | Client bootstrap    |
//! | `/health/*`               | [`app`]                 | Probes              |
//! | `/openapi.json`           | [`openapi`]             | Spec                |
//!
//! ## Persistence
//!
//! Handlers talk to [`storage::Storage`], the uniform adapter over the
//! ephemeral in-memory backend and the durable Postgres backend; see
//! `main.rs` for backend selection.

pub mod error;
pub mod extractors;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod storage;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Public, non-secret configuration values served to the client so it
/// can initialize its own backend connection.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicConfig {
    pub backend_url: String,
    pub backend_anon_key: String,
    /// Which storage backend this instance runs on.
    pub storage_backend: String,
}

/// Assemble the full application router.
///
/// Health probes are mounted alongside the API routes; the service has
/// no authentication layer (admin endpoints are admin-only by
/// deployment convention), so nothing needs to sit outside it.
///
/// The permissive CORS layer is what lets the browser SPA call this
/// API from its own origin.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::creators::router())
        .merge(routes::songs::router())
        .merge(routes::submissions::router())
        .merge(routes::referrals::router())
        .merge(openapi::router())
        .route("/api/config", axum::routing::get(public_config))
        // Form-sized JSON bodies only; nothing on this API uploads media.
        .layer(DefaultBodyLimit::max(64 * 1024));

    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new()
        .merge(probes)
        .merge(api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /api/config — Client bootstrap values.
async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(PublicConfig {
        backend_url: state.config.public_backend_url.clone().unwrap_or_default(),
        backend_anon_key: state
            .config
            .public_backend_anon_key
            .clone()
            .unwrap_or_default(),
        storage_backend: state.storage.backend_name().to_string(),
    })
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the storage backend answers.
///
/// The in-memory backend is always ready; the Postgres backend pings
/// the database, so an unreachable database flips readiness to 503.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.storage.healthy().await {
        Ok(()) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "storage unreachable").into_response()
        }
    }
}
