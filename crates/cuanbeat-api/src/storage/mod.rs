//! # Storage Adapter
//!
//! The uniform persistence contract for the four platform entities,
//! with two interchangeable backends:
//!
//! - [`memory::MemStorage`] — process-local tables behind a single
//!   lock. Ephemeral, single-instance; what tests and
//!   `DATABASE_URL`-less development runs use.
//! - [`postgres::PgStorage`] — PostgreSQL via SQLx. Durable,
//!   multi-instance; every operation is a network round-trip that can
//!   fail independently of record existence.
//!
//! The adapter owns two operations that are more than plain row writes
//! and must be atomic within a backend:
//!
//! - **Creator creation** records the referral edge in the same logical
//!   operation when `referred_by` resolves to an existing creator. An
//!   unknown referrer is ignored — registration still succeeds.
//! - **Submission review** applies the earnings cascade: validate the
//!   `pending → approved|rejected` transition, freeze the song's
//!   current rate into the submission, and credit the creator's totals.
//!   A submission is never left approved-but-uncredited.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use cuanbeat_core::{EwalletType, ReviewDecision, StateTransitionError};

use crate::state::{Creator, Referral, Song, VideoSubmission};

/// Failures surfaced by a storage backend.
///
/// `Backend` is distinguishable from `NotFound`: a missing record is a
/// client-addressable condition, an unreachable backend is not.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The operation's target record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A review was attempted against an already-reviewed submission.
    #[error(transparent)]
    InvalidTransition(#[from] StateTransitionError),

    /// The durable backend failed: network fault, pool exhaustion, or
    /// constraint violation. Never produced by the in-memory backend.
    #[error("backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Fields accepted when registering a creator.
///
/// Identifier, referral code, totals, and timestamp are system-assigned.
#[derive(Debug, Clone)]
pub struct NewCreator {
    pub tiktok_username: String,
    pub email: String,
    pub phone: String,
    pub ewallet_type: EwalletType,
    pub ewallet_number: String,
    /// Referrer's creator id, already resolved from a referral code if
    /// one was supplied. Best-effort: an id that matches no creator is
    /// ignored.
    pub referred_by: Option<i64>,
}

/// Partial update of a creator's profile fields.
///
/// Earnings, video count, and referral fields are not part of the
/// update set — they change only through the approval cascade.
#[derive(Debug, Clone, Default)]
pub struct CreatorUpdate {
    pub tiktok_username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub ewallet_type: Option<EwalletType>,
    pub ewallet_number: Option<String>,
}

/// Fields accepted when adding a song to the catalog.
#[derive(Debug, Clone)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub status: String,
    pub earnings_per_video: i64,
    pub duration: String,
    pub file_url: Option<String>,
    pub spotify_url: Option<String>,
    pub is_active: bool,
}

/// Partial update of a song. Supplied fields overwrite, absent fields
/// are left untouched (shallow merge).
#[derive(Debug, Clone, Default)]
pub struct SongUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub status: Option<String>,
    pub earnings_per_video: Option<i64>,
    pub duration: Option<String>,
    pub file_url: Option<String>,
    pub spotify_url: Option<String>,
    pub is_active: Option<bool>,
}

/// Fields accepted when a creator submits a video.
///
/// Status and earnings are forced server-side (`pending`, 0) no matter
/// what the client sent.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub creator_id: i64,
    pub song_id: i64,
    pub tiktok_url: String,
}

/// Partial update of a submission's mutable plain fields.
///
/// Status is deliberately absent: status changes go through
/// [`Storage::review_submission`] so the earnings cascade cannot be
/// bypassed.
#[derive(Debug, Clone, Default)]
pub struct SubmissionUpdate {
    pub tiktok_url: Option<String>,
    pub admin_notes: Option<String>,
}

/// The uniform persistence contract. One method family per entity;
/// identical semantics across backends.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short backend identifier for logs and diagnostics.
    fn backend_name(&self) -> &'static str;

    /// Liveness of the backing store; used by the readiness probe.
    async fn healthy(&self) -> Result<(), StorageError>;

    // ── Creators ────────────────────────────────────────────────────

    /// Register a creator: assigns the identifier, derives the referral
    /// code, zeroes the totals, and — when `referred_by` resolves —
    /// records the referral edge in the same logical operation.
    async fn create_creator(&self, new: NewCreator) -> Result<Creator, StorageError>;

    async fn get_creator(&self, id: i64) -> Result<Option<Creator>, StorageError>;

    async fn list_creators(&self) -> Result<Vec<Creator>, StorageError>;

    /// Shallow-merge profile fields onto an existing creator.
    async fn update_creator(
        &self,
        id: i64,
        update: CreatorUpdate,
    ) -> Result<Option<Creator>, StorageError>;

    /// Look up a creator by their unique referral code.
    async fn find_creator_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<Creator>, StorageError>;

    // ── Songs ───────────────────────────────────────────────────────

    async fn create_song(&self, new: NewSong) -> Result<Song, StorageError>;

    async fn get_song(&self, id: i64) -> Result<Option<Song>, StorageError>;

    async fn list_songs(&self) -> Result<Vec<Song>, StorageError>;

    /// Only songs currently offered for submission.
    async fn list_active_songs(&self) -> Result<Vec<Song>, StorageError>;

    async fn update_song(&self, id: i64, update: SongUpdate)
        -> Result<Option<Song>, StorageError>;

    // ── Video submissions ───────────────────────────────────────────

    async fn create_submission(
        &self,
        new: NewSubmission,
    ) -> Result<VideoSubmission, StorageError>;

    async fn get_submission(&self, id: i64) -> Result<Option<VideoSubmission>, StorageError>;

    async fn list_submissions(&self) -> Result<Vec<VideoSubmission>, StorageError>;

    async fn list_submissions_by_creator(
        &self,
        creator_id: i64,
    ) -> Result<Vec<VideoSubmission>, StorageError>;

    /// Shallow-merge plain fields; cannot change status or earnings.
    async fn update_submission(
        &self,
        id: i64,
        update: SubmissionUpdate,
    ) -> Result<Option<VideoSubmission>, StorageError>;

    /// Apply an admin review decision as one atomic unit.
    ///
    /// Approve: set the submission's earnings to the referenced song's
    /// current `earnings_per_video`, mark it approved, and add the same
    /// amount / one video to the creator's totals. Reject: mark
    /// rejected, earnings stay 0, the creator is untouched. Either way
    /// the optional admin notes are attached.
    ///
    /// Fails with [`StorageError::InvalidTransition`] when the
    /// submission has already been reviewed — no state change, no
    /// double credit.
    async fn review_submission(
        &self,
        id: i64,
        decision: ReviewDecision,
        admin_notes: Option<String>,
    ) -> Result<VideoSubmission, StorageError>;

    // ── Referrals ───────────────────────────────────────────────────

    async fn list_referrals_by_referrer(
        &self,
        referrer_id: i64,
    ) -> Result<Vec<Referral>, StorageError>;

    async fn count_referrals(&self, referrer_id: i64) -> Result<i64, StorageError>;
}
