//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "cuanbeat API",
        version = "0.3.2",
        description = "Creator registration, song catalog, video submission review with earnings cascade, and the referral program.",
        license(name = "MIT")
    ),
    paths(
        // Creators
        crate::routes::creators::list_creators,
        crate::routes::creators::get_creator,
        crate::routes::creators::create_creator,
        crate::routes::creators::update_creator,
        // Songs
        crate::routes::songs::list_songs,
        crate::routes::songs::list_active_songs,
        crate::routes::songs::get_song,
        crate::routes::songs::create_song,
        crate::routes::songs::update_song,
        // Submissions
        crate::routes::submissions::list_submissions,
        crate::routes::submissions::list_submissions_by_creator,
        crate::routes::submissions::create_submission,
        crate::routes::submissions::update_submission,
        // Referrals
        crate::routes::referrals::validate_code,
        crate::routes::referrals::referral_count,
        crate::routes::referrals::list_referrals_by_creator,
    ),
    components(schemas(
        // Stored records
        crate::state::Creator,
        crate::state::Song,
        crate::state::VideoSubmission,
        crate::state::Referral,
        // Request DTOs
        crate::routes::creators::CreateCreatorRequest,
        crate::routes::creators::UpdateCreatorRequest,
        crate::routes::songs::CreateSongRequest,
        crate::routes::songs::UpdateSongRequest,
        crate::routes::submissions::CreateSubmissionRequest,
        crate::routes::submissions::UpdateSubmissionRequest,
        // Response DTOs
        crate::routes::referrals::ReferrerSummary,
        crate::routes::referrals::ValidateCodeResponse,
        crate::routes::referrals::ReferralCountResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "creators", description = "Creator registration and profiles"),
        (name = "songs", description = "Admin-managed song catalog"),
        (name = "submissions", description = "Video submissions and review"),
        (name = "referrals", description = "Referral program"),
    )
)]
pub struct ApiDoc;

/// Serve the generated spec.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
