//! # Song Catalog API
//!
//! Admin-managed song catalog. Creators pick from the active-only
//! listing; deactivated songs stay in the catalog (nothing is ever
//! hard-deleted) but are not offered for submission.
//!
//! ## Endpoints
//!
//! - `GET /api/songs` — full catalog
//! - `GET /api/songs/active` — songs currently offered for submission
//! - `POST /api/songs` — add a song (validated)
//! - `PUT /api/songs/:id` — partial update (validated)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use cuanbeat_core::{
    validation::require_non_empty, ValidationError, DEFAULT_EARNINGS_PER_VIDEO,
};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, Song};
use crate::storage::{NewSong, SongUpdate};

// ── Request DTOs ────────────────────────────────────────────────────

fn default_rate() -> i64 {
    DEFAULT_EARNINGS_PER_VIDEO
}

fn default_active() -> bool {
    true
}

/// Request to add a song to the catalog.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSongRequest {
    pub title: String,
    pub artist: String,
    /// Free-text label shown to creators, e.g. "trending".
    pub status: String,
    #[serde(default = "default_rate")]
    pub earnings_per_video: i64,
    /// Display duration, e.g. "3:45".
    pub duration: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub spotify_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for CreateSongRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        problems.extend(require_non_empty("title", &self.title));
        problems.extend(require_non_empty("artist", &self.artist));
        problems.extend(require_non_empty("status", &self.status));
        problems.extend(require_non_empty("duration", &self.duration));
        if self.earnings_per_video < 0 {
            problems.push(cuanbeat_core::FieldProblem::new(
                "earnings_per_video",
                "must not be negative",
            ));
        }
        ValidationError::check(problems)
    }
}

/// Partial song update. Unknown fields are rejected.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateSongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub status: Option<String>,
    pub earnings_per_video: Option<i64>,
    pub duration: Option<String>,
    pub file_url: Option<String>,
    pub spotify_url: Option<String>,
    pub is_active: Option<bool>,
}

impl Validate for UpdateSongRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if let Some(ref title) = self.title {
            problems.extend(require_non_empty("title", title));
        }
        if let Some(ref artist) = self.artist {
            problems.extend(require_non_empty("artist", artist));
        }
        if let Some(rate) = self.earnings_per_video {
            if rate < 0 {
                problems.push(cuanbeat_core::FieldProblem::new(
                    "earnings_per_video",
                    "must not be negative",
                ));
            }
        }
        ValidationError::check(problems)
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the songs router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs).post(create_song))
        .route("/api/songs/active", get(list_active_songs))
        .route("/api/songs/:id", get(get_song).put(update_song))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/songs — List the full catalog.
#[utoipa::path(
    get,
    path = "/api/songs",
    responses(
        (status = 200, description = "List of songs", body = Vec<Song>),
    ),
    tag = "songs"
)]
pub async fn list_songs(State(state): State<AppState>) -> Result<Json<Vec<Song>>, AppError> {
    Ok(Json(state.storage.list_songs().await?))
}

/// GET /api/songs/active — List songs offered for submission.
#[utoipa::path(
    get,
    path = "/api/songs/active",
    responses(
        (status = 200, description = "Active songs", body = Vec<Song>),
    ),
    tag = "songs"
)]
pub async fn list_active_songs(
    State(state): State<AppState>,
) -> Result<Json<Vec<Song>>, AppError> {
    Ok(Json(state.storage.list_active_songs().await?))
}

/// GET /api/songs/:id — Get a single song.
#[utoipa::path(
    get,
    path = "/api/songs/{id}",
    params(("id" = i64, Path, description = "Song ID")),
    responses(
        (status = 200, description = "Song found", body = Song),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "songs"
)]
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Song>, AppError> {
    state
        .storage
        .get_song(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Song not found".to_string()))
}

/// POST /api/songs — Add a song to the catalog.
#[utoipa::path(
    post,
    path = "/api/songs",
    request_body = CreateSongRequest,
    responses(
        (status = 201, description = "Song created", body = Song),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "songs"
)]
pub async fn create_song(
    State(state): State<AppState>,
    body: Result<Json<CreateSongRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<Song>), AppError> {
    let req = extract_validated_json(body)?;

    let song = state
        .storage
        .create_song(NewSong {
            title: req.title,
            artist: req.artist,
            status: req.status,
            earnings_per_video: req.earnings_per_video,
            duration: req.duration,
            file_url: req.file_url,
            spotify_url: req.spotify_url,
            is_active: req.is_active,
        })
        .await?;

    tracing::info!(song_id = song.id, title = %song.title, "song added to catalog");
    Ok((axum::http::StatusCode::CREATED, Json(song)))
}

/// PUT /api/songs/:id — Update a song.
#[utoipa::path(
    put,
    path = "/api/songs/{id}",
    params(("id" = i64, Path, description = "Song ID")),
    request_body = UpdateSongRequest,
    responses(
        (status = 200, description = "Song updated", body = Song),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "songs"
)]
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateSongRequest>, JsonRejection>,
) -> Result<Json<Song>, AppError> {
    let req = extract_validated_json(body)?;

    state
        .storage
        .update_song(
            id,
            SongUpdate {
                title: req.title,
                artist: req.artist,
                status: req.status,
                earnings_per_video: req.earnings_per_video,
                duration: req.duration,
                file_url: req.file_url,
                spotify_url: req.spotify_url,
                is_active: req.is_active,
            },
        )
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Song not found".to_string()))
}
