//! # Referral API
//!
//! Read-only referral endpoints: code validation for the registration
//! form, and per-creator counts/listings for the dashboard. Referral
//! records themselves are written only as a side effect of creator
//! registration.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::{AppState, Referral};

// ── Response DTOs ───────────────────────────────────────────────────

/// The public projection of a referrer returned by code validation.
///
/// Only what the registration form needs — never the referrer's
/// contact or wallet details.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferrerSummary {
    pub id: i64,
    pub tiktok_username: String,
    pub referral_code: String,
}

/// Successful code validation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateCodeResponse {
    pub valid: bool,
    pub referrer: ReferrerSummary,
}

/// Referral count for one creator.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralCountResponse {
    pub count: i64,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the referrals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/referrals/validate/:code", get(validate_code))
        .route("/api/referrals/count/:creator_id", get(referral_count))
        .route(
            "/api/referrals/creator/:creator_id",
            get(list_referrals_by_creator),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/referrals/validate/:code — Validate a referral code.
///
/// An unknown code is a semantic lookup miss (404), not a validation
/// failure; nothing is recorded either way.
#[utoipa::path(
    get,
    path = "/api/referrals/validate/{code}",
    params(("code" = String, Path, description = "Referral code to validate")),
    responses(
        (status = 200, description = "Code is valid", body = ValidateCodeResponse),
        (status = 404, description = "Invalid referral code", body = crate::error::ErrorBody),
    ),
    tag = "referrals"
)]
pub async fn validate_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ValidateCodeResponse>, AppError> {
    let referrer = state
        .storage
        .find_creator_by_referral_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid referral code".to_string()))?;

    Ok(Json(ValidateCodeResponse {
        valid: true,
        referrer: ReferrerSummary {
            id: referrer.id,
            tiktok_username: referrer.tiktok_username,
            referral_code: referrer.referral_code,
        },
    }))
}

/// GET /api/referrals/count/:creator_id — Number of referrals made.
#[utoipa::path(
    get,
    path = "/api/referrals/count/{creator_id}",
    params(("creator_id" = i64, Path, description = "Referrer's creator ID")),
    responses(
        (status = 200, description = "Referral count", body = ReferralCountResponse),
    ),
    tag = "referrals"
)]
pub async fn referral_count(
    State(state): State<AppState>,
    Path(creator_id): Path<i64>,
) -> Result<Json<ReferralCountResponse>, AppError> {
    let count = state.storage.count_referrals(creator_id).await?;
    Ok(Json(ReferralCountResponse { count }))
}

/// GET /api/referrals/creator/:creator_id — A creator's referral records.
#[utoipa::path(
    get,
    path = "/api/referrals/creator/{creator_id}",
    params(("creator_id" = i64, Path, description = "Referrer's creator ID")),
    responses(
        (status = 200, description = "The creator's referrals", body = Vec<Referral>),
    ),
    tag = "referrals"
)]
pub async fn list_referrals_by_creator(
    State(state): State<AppState>,
    Path(creator_id): Path<i64>,
) -> Result<Json<Vec<Referral>>, AppError> {
    Ok(Json(
        state.storage.list_referrals_by_referrer(creator_id).await?,
    ))
}
