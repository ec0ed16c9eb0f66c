//! # Creator API
//!
//! Registration and profile management for TikTok creators.
//!
//! ## Endpoints
//!
//! - `GET /api/creators` — list creators
//! - `GET /api/creators/:id` — get one creator
//! - `POST /api/creators` — register (validated; records the referral
//!   edge when a known referrer is supplied)
//! - `PUT /api/creators/:id` — partial profile update (validated)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use cuanbeat_core::{
    validation::{require_digits_min_len, require_email_shape, require_non_empty},
    EwalletType, ValidationError,
};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, Creator};
use crate::storage::{CreatorUpdate, NewCreator};

// ── Request DTOs ────────────────────────────────────────────────────

/// Registration request.
///
/// `referral_code` is what the invite flow sends; `referred_by` is
/// accepted for clients that already resolved the code to a creator id.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCreatorRequest {
    pub tiktok_username: String,
    pub email: String,
    pub phone: String,
    /// One of dana, ovo, gopay, shopeepay.
    pub ewallet_type: String,
    pub ewallet_number: String,
    #[serde(default)]
    pub referred_by: Option<i64>,
    #[serde(default)]
    pub referral_code: Option<String>,
}

impl Validate for CreateCreatorRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        problems.extend(require_non_empty("tiktok_username", &self.tiktok_username));
        problems.extend(require_email_shape("email", &self.email));
        problems.extend(require_non_empty("phone", &self.phone));
        if let Err(problem) = self.ewallet_type.parse::<EwalletType>() {
            problems.push(problem);
        }
        problems.extend(require_digits_min_len(
            "ewallet_number",
            &self.ewallet_number,
            10,
        ));
        ValidationError::check(problems)
    }
}

/// Partial profile update. Unknown fields are rejected — the earnings
/// and referral fields are not client-writable.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCreatorRequest {
    pub tiktok_username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ewallet_type: Option<String>,
    pub ewallet_number: Option<String>,
}

impl Validate for UpdateCreatorRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if let Some(ref username) = self.tiktok_username {
            problems.extend(require_non_empty("tiktok_username", username));
        }
        if let Some(ref email) = self.email {
            problems.extend(require_email_shape("email", email));
        }
        if let Some(ref phone) = self.phone {
            problems.extend(require_non_empty("phone", phone));
        }
        if let Some(ref wallet) = self.ewallet_type {
            if let Err(problem) = wallet.parse::<EwalletType>() {
                problems.push(problem);
            }
        }
        if let Some(ref number) = self.ewallet_number {
            problems.extend(require_digits_min_len("ewallet_number", number, 10));
        }
        ValidationError::check(problems)
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the creators router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/creators", get(list_creators).post(create_creator))
        .route(
            "/api/creators/:id",
            get(get_creator).put(update_creator),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/creators — List all creators.
#[utoipa::path(
    get,
    path = "/api/creators",
    responses(
        (status = 200, description = "List of creators", body = Vec<Creator>),
    ),
    tag = "creators"
)]
pub async fn list_creators(State(state): State<AppState>) -> Result<Json<Vec<Creator>>, AppError> {
    Ok(Json(state.storage.list_creators().await?))
}

/// GET /api/creators/:id — Get a single creator.
#[utoipa::path(
    get,
    path = "/api/creators/{id}",
    params(("id" = i64, Path, description = "Creator ID")),
    responses(
        (status = 200, description = "Creator found", body = Creator),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "creators"
)]
pub async fn get_creator(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Creator>, AppError> {
    state
        .storage
        .get_creator(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))
}

/// POST /api/creators — Register a creator.
#[utoipa::path(
    post,
    path = "/api/creators",
    request_body = CreateCreatorRequest,
    responses(
        (status = 201, description = "Creator registered", body = Creator),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "creators"
)]
pub async fn create_creator(
    State(state): State<AppState>,
    body: Result<Json<CreateCreatorRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<Creator>), AppError> {
    let req = extract_validated_json(body)?;

    let ewallet_type: EwalletType = req
        .ewallet_type
        .parse()
        .map_err(|p| ValidationError(vec![p]))?;

    // A referral code is informational only: an unknown code never
    // blocks registration, it just records no edge.
    let referred_by = match (req.referred_by, &req.referral_code) {
        (Some(id), _) => Some(id),
        (None, Some(code)) => state
            .storage
            .find_creator_by_referral_code(code)
            .await?
            .map(|referrer| referrer.id),
        (None, None) => None,
    };

    let creator = state
        .storage
        .create_creator(NewCreator {
            tiktok_username: req.tiktok_username,
            email: req.email,
            phone: req.phone,
            ewallet_type,
            ewallet_number: req.ewallet_number,
            referred_by,
        })
        .await?;

    tracing::info!(
        creator_id = creator.id,
        referred = referred_by.is_some(),
        "creator registered"
    );
    Ok((axum::http::StatusCode::CREATED, Json(creator)))
}

/// PUT /api/creators/:id — Update a creator's profile fields.
#[utoipa::path(
    put,
    path = "/api/creators/{id}",
    params(("id" = i64, Path, description = "Creator ID")),
    request_body = UpdateCreatorRequest,
    responses(
        (status = 200, description = "Creator updated", body = Creator),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "creators"
)]
pub async fn update_creator(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateCreatorRequest>, JsonRejection>,
) -> Result<Json<Creator>, AppError> {
    let req = extract_validated_json(body)?;

    let ewallet_type = match req.ewallet_type {
        Some(ref wallet) => Some(
            wallet
                .parse::<EwalletType>()
                .map_err(|p| ValidationError(vec![p]))?,
        ),
        None => None,
    };

    state
        .storage
        .update_creator(
            id,
            CreatorUpdate {
                tiktok_username: req.tiktok_username,
                email: req.email,
                phone: req.phone,
                ewallet_type,
                ewallet_number: req.ewallet_number,
            },
        )
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Creator not found".to_string()))
}
