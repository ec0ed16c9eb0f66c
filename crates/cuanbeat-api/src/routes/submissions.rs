//! # Video Submission API
//!
//! Creators submit TikTok video links against catalog songs; admins
//! review them. A status change in the update body routes through the
//! review workflow, which applies the earnings cascade atomically —
//! there is no way to flip a submission's status without it.
//!
//! ## Endpoints
//!
//! - `GET /api/submissions` — list all submissions
//! - `GET /api/submissions/creator/:creator_id` — one creator's submissions
//! - `POST /api/submissions` — submit a video (status and earnings are
//!   forced to `pending` / 0 regardless of the body)
//! - `PUT /api/submissions/:id` — partial update; carries the review
//!   workflow when `status` is present

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use cuanbeat_core::{
    validation::require_non_empty, FieldProblem, ReviewDecision, ValidationError,
};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, VideoSubmission};
use crate::storage::{NewSubmission, SubmissionUpdate};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to submit a video.
///
/// Any `status` or `earnings` the client includes is ignored — both are
/// assigned server-side.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubmissionRequest {
    pub creator_id: i64,
    pub song_id: i64,
    pub tiktok_url: String,
}

impl Validate for CreateSubmissionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if self.creator_id < 1 {
            problems.push(FieldProblem::new("creator_id", "must be a positive id"));
        }
        if self.song_id < 1 {
            problems.push(FieldProblem::new("song_id", "must be a positive id"));
        }
        problems.extend(require_non_empty("tiktok_url", &self.tiktok_url));
        ValidationError::check(problems)
    }
}

/// Partial submission update.
///
/// `earnings` is deliberately not accepted — it is only ever written by
/// the approval cascade. Unknown fields are rejected.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateSubmissionRequest {
    pub tiktok_url: Option<String>,
    /// `"approved"` or `"rejected"` — triggers the review workflow.
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

/// Map a requested status string onto a review decision.
fn parse_decision(status: &str) -> Result<ReviewDecision, FieldProblem> {
    match status {
        "approved" => Ok(ReviewDecision::Approve),
        "rejected" => Ok(ReviewDecision::Reject),
        "pending" => Err(FieldProblem::new(
            "status",
            "a submission cannot be returned to pending",
        )),
        other => Err(FieldProblem::new(
            "status",
            format!("unknown status \"{other}\" (expected approved or rejected)"),
        )),
    }
}

impl Validate for UpdateSubmissionRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut problems = Vec::new();
        if let Some(ref url) = self.tiktok_url {
            problems.extend(require_non_empty("tiktok_url", url));
        }
        if let Some(ref status) = self.status {
            if let Err(problem) = parse_decision(status) {
                problems.push(problem);
            }
        }
        ValidationError::check(problems)
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the submissions router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/submissions",
            get(list_submissions).post(create_submission),
        )
        .route(
            "/api/submissions/creator/:creator_id",
            get(list_submissions_by_creator),
        )
        .route("/api/submissions/:id", axum::routing::put(update_submission))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/submissions — List all submissions.
#[utoipa::path(
    get,
    path = "/api/submissions",
    responses(
        (status = 200, description = "List of submissions", body = Vec<VideoSubmission>),
    ),
    tag = "submissions"
)]
pub async fn list_submissions(
    State(state): State<AppState>,
) -> Result<Json<Vec<VideoSubmission>>, AppError> {
    Ok(Json(state.storage.list_submissions().await?))
}

/// GET /api/submissions/creator/:creator_id — One creator's submissions.
#[utoipa::path(
    get,
    path = "/api/submissions/creator/{creator_id}",
    params(("creator_id" = i64, Path, description = "Creator ID")),
    responses(
        (status = 200, description = "The creator's submissions", body = Vec<VideoSubmission>),
    ),
    tag = "submissions"
)]
pub async fn list_submissions_by_creator(
    State(state): State<AppState>,
    Path(creator_id): Path<i64>,
) -> Result<Json<Vec<VideoSubmission>>, AppError> {
    Ok(Json(
        state.storage.list_submissions_by_creator(creator_id).await?,
    ))
}

/// POST /api/submissions — Submit a video for review.
#[utoipa::path(
    post,
    path = "/api/submissions",
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission created", body = VideoSubmission),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
    ),
    tag = "submissions"
)]
pub async fn create_submission(
    State(state): State<AppState>,
    body: Result<Json<CreateSubmissionRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<VideoSubmission>), AppError> {
    let req = extract_validated_json(body)?;

    let submission = state
        .storage
        .create_submission(NewSubmission {
            creator_id: req.creator_id,
            song_id: req.song_id,
            tiktok_url: req.tiktok_url,
        })
        .await?;

    tracing::info!(
        submission_id = submission.id,
        creator_id = submission.creator_id,
        song_id = submission.song_id,
        "video submitted"
    );
    Ok((axum::http::StatusCode::CREATED, Json(submission)))
}

/// PUT /api/submissions/:id — Update a submission.
///
/// With `status` in the body this is the admin review action: the
/// storage adapter applies the transition and, on approval, the
/// earnings cascade as one atomic unit. Without `status` it is a plain
/// partial update of the mutable fields.
#[utoipa::path(
    put,
    path = "/api/submissions/{id}",
    params(("id" = i64, Path, description = "Submission ID")),
    request_body = UpdateSubmissionRequest,
    responses(
        (status = 200, description = "Submission updated", body = VideoSubmission),
        (status = 400, description = "Validation failed", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already reviewed", body = crate::error::ErrorBody),
    ),
    tag = "submissions"
)]
pub async fn update_submission(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateSubmissionRequest>, JsonRejection>,
) -> Result<Json<VideoSubmission>, AppError> {
    let req = extract_validated_json(body)?;

    let decision = match req.status.as_deref() {
        Some(status) => Some(parse_decision(status).map_err(|p| ValidationError(vec![p]))?),
        None => None,
    };

    // Plain fields first, then the review transition; the cascade
    // itself stays atomic inside the storage adapter.
    if req.tiktok_url.is_some() {
        state
            .storage
            .update_submission(
                id,
                SubmissionUpdate {
                    tiktok_url: req.tiktok_url,
                    admin_notes: None,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;
    }

    let submission = match decision {
        Some(decision) => {
            let reviewed = state
                .storage
                .review_submission(id, decision, req.admin_notes)
                .await?;
            tracing::info!(
                submission_id = id,
                status = %reviewed.status,
                earnings = reviewed.earnings,
                "submission reviewed"
            );
            reviewed
        }
        None => state
            .storage
            .update_submission(
                id,
                SubmissionUpdate {
                    tiktok_url: None,
                    admin_notes: req.admin_notes,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?,
    };

    Ok(Json(submission))
}
