//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor, plus the stored record types for the four
//! platform entities.
//!
//! The storage adapter behind [`AppState::storage`] owns every record;
//! no handler keeps an authoritative copy. Which backend sits behind
//! the trait object is decided once, at startup (see `main.rs`): the
//! in-memory store when `DATABASE_URL` is absent, Postgres otherwise.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use cuanbeat_core::{EwalletType, ReferralStatus, SubmissionStatus};

use crate::storage::{memory::MemStorage, Storage};

// ── Stored Record Types ─────────────────────────────────────────────

/// A registered TikTok creator.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Creator {
    pub id: i64,
    pub tiktok_username: String,
    pub email: String,
    pub phone: String,
    /// Payout wallet (dana, ovo, gopay, shopeepay).
    #[schema(value_type = String)]
    pub ewallet_type: EwalletType,
    pub ewallet_number: String,
    /// Lifetime earnings from approved submissions, in whole rupiah.
    /// Changes only through the submission-approval cascade.
    pub total_earnings: i64,
    /// Number of approved submissions.
    pub video_count: i64,
    /// System-derived share code, e.g. `ALICE-REF-1`. Immutable.
    pub referral_code: String,
    /// The creator who referred this one, if any. Set at creation only.
    pub referred_by: Option<i64>,
    /// Accumulated referral bonuses, in whole rupiah.
    pub referral_earnings: i64,
    pub created_at: DateTime<Utc>,
}

/// A catalog song creators can feature in their videos.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    /// Free-text admin label, e.g. a trending indicator.
    pub status: String,
    /// Payout per approved video using this song, in whole rupiah.
    /// Read at approval time; later changes never touch past approvals.
    pub earnings_per_video: i64,
    /// Display duration, e.g. `"3:45"`.
    pub duration: String,
    pub file_url: Option<String>,
    pub spotify_url: Option<String>,
    /// Inactive songs stay in the catalog but are not offered for
    /// submission. Songs are never hard-deleted.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A creator's claim that a TikTok video uses a catalog song.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoSubmission {
    pub id: i64,
    pub creator_id: i64,
    pub song_id: i64,
    pub tiktok_url: String,
    /// pending | approved | rejected. Leaves `pending` exactly once.
    #[schema(value_type = String)]
    pub status: SubmissionStatus,
    /// 0 until approval, then the song's rate frozen at approval time.
    pub earnings: i64,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A recorded referral edge between two creators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Referral {
    pub id: i64,
    pub referrer_id: i64,
    pub referred_id: i64,
    /// The referrer's code at the time of registration.
    pub referral_code: String,
    /// Bonus recorded for the referrer, in whole rupiah.
    pub bonus_amount: i64,
    /// pending | paid. No payout-confirmation flow exists yet.
    #[schema(value_type = String)]
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
}

// ── Application State ───────────────────────────────────────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Public backend URL served to the client via `/api/config`.
    pub public_backend_url: Option<String>,
    /// Public (non-secret) backend key served via `/api/config`.
    pub public_backend_anon_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_backend_url: None,
            public_backend_anon_key: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly: the storage adapter is behind an `Arc`, so clones
/// observe the same records.
#[derive(Clone)]
pub struct AppState {
    /// The persistence adapter. Sole owner of all entity storage.
    pub storage: Arc<dyn Storage>,
    pub config: AppConfig,
}

impl AppState {
    /// State backed by a fresh, isolated in-memory store.
    ///
    /// This is what tests use: each call gets its own store, so suites
    /// never observe each other's records.
    pub fn in_memory() -> Self {
        Self::with_storage(AppConfig::default(), Arc::new(MemStorage::new()))
    }

    /// State over an already-constructed storage backend.
    pub fn with_storage(config: AppConfig, storage: Arc<dyn Storage>) -> Self {
        Self { storage, config }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage.backend_name())
            .field("config", &self.config)
            .finish()
    }
}
