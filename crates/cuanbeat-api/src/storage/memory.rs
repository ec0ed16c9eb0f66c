//! # In-Memory Storage Backend
//!
//! Process-local tables for all four entities behind a single
//! `parking_lot::RwLock`. Ephemeral and single-instance: records are
//! lost on restart and never shared across processes.
//!
//! One lock for the whole store keeps the two multi-record operations
//! (creator creation with its referral edge, the review cascade)
//! trivially atomic — concurrent approvals serialize on the write lock
//! and cannot lose a creator update. The lock is `parking_lot`, not
//! `tokio::sync`, because it is never held across an `.await` point.
//!
//! Each [`MemStorage`] is an isolated store; tests instantiate one per
//! case.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use cuanbeat_core::{
    referral_code, ReferralStatus, ReviewDecision, SubmissionStatus, DEFAULT_EARNINGS_PER_VIDEO,
    REFERRAL_BONUS,
};

use crate::state::{Creator, Referral, Song, VideoSubmission};
use crate::storage::{
    CreatorUpdate, NewCreator, NewSong, NewSubmission, SongUpdate, Storage, StorageError,
    SubmissionUpdate,
};

/// One entity table: rows keyed by identifier plus the next-id counter.
///
/// A `BTreeMap` so listings come back in id (= insertion) order, the
/// order the HTTP layer exposes. Counters start at 1.
#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    /// Allocate the next identifier, build the row with it, store and
    /// return the stored copy.
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    /// Mutate a row in place. Returns the updated copy, or `None` if
    /// the id is unknown.
    fn update(&mut self, id: i64, f: impl FnOnce(&mut T)) -> Option<T> {
        let row = self.rows.get_mut(&id)?;
        f(row);
        Some(row.clone())
    }
}

#[derive(Debug)]
struct MemInner {
    creators: Table<Creator>,
    songs: Table<Song>,
    submissions: Table<VideoSubmission>,
    referrals: Table<Referral>,
}

/// The ephemeral backend. Cloning shares the underlying tables.
#[derive(Debug, Clone)]
pub struct MemStorage {
    inner: Arc<RwLock<MemInner>>,
}

impl MemStorage {
    /// Create an empty, isolated store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemInner {
                creators: Table::new(),
                songs: Table::new(),
                submissions: Table::new(),
                referrals: Table::new(),
            })),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn healthy(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn create_creator(&self, new: NewCreator) -> Result<Creator, StorageError> {
        let mut inner = self.inner.write();
        let now = Utc::now();

        // Resolve the referrer under the same lock so the referral edge
        // and the new creator appear together or not at all.
        let referrer = new.referred_by.and_then(|id| inner.creators.get(id));

        let creator = inner.creators.insert_with(|id| Creator {
            id,
            tiktok_username: new.tiktok_username.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
            ewallet_type: new.ewallet_type,
            ewallet_number: new.ewallet_number.clone(),
            total_earnings: 0,
            video_count: 0,
            referral_code: referral_code(&new.tiktok_username, id),
            referred_by: new.referred_by,
            referral_earnings: 0,
            created_at: now,
        });

        if let Some(referrer) = referrer {
            inner.referrals.insert_with(|id| Referral {
                id,
                referrer_id: referrer.id,
                referred_id: creator.id,
                referral_code: referrer.referral_code.clone(),
                bonus_amount: REFERRAL_BONUS,
                status: ReferralStatus::Pending,
                created_at: now,
            });
        }

        Ok(creator)
    }

    async fn get_creator(&self, id: i64) -> Result<Option<Creator>, StorageError> {
        Ok(self.inner.read().creators.get(id))
    }

    async fn list_creators(&self) -> Result<Vec<Creator>, StorageError> {
        Ok(self.inner.read().creators.list())
    }

    async fn update_creator(
        &self,
        id: i64,
        update: CreatorUpdate,
    ) -> Result<Option<Creator>, StorageError> {
        Ok(self.inner.write().creators.update(id, |c| {
            if let Some(v) = update.tiktok_username {
                c.tiktok_username = v;
            }
            if let Some(v) = update.email {
                c.email = v;
            }
            if let Some(v) = update.phone {
                c.phone = v;
            }
            if let Some(v) = update.ewallet_type {
                c.ewallet_type = v;
            }
            if let Some(v) = update.ewallet_number {
                c.ewallet_number = v;
            }
        }))
    }

    async fn find_creator_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<Creator>, StorageError> {
        Ok(self
            .inner
            .read()
            .creators
            .rows
            .values()
            .find(|c| c.referral_code == code)
            .cloned())
    }

    async fn create_song(&self, new: NewSong) -> Result<Song, StorageError> {
        Ok(self.inner.write().songs.insert_with(|id| Song {
            id,
            title: new.title.clone(),
            artist: new.artist.clone(),
            status: new.status.clone(),
            earnings_per_video: new.earnings_per_video,
            duration: new.duration.clone(),
            file_url: new.file_url.clone(),
            spotify_url: new.spotify_url.clone(),
            is_active: new.is_active,
            created_at: Utc::now(),
        }))
    }

    async fn get_song(&self, id: i64) -> Result<Option<Song>, StorageError> {
        Ok(self.inner.read().songs.get(id))
    }

    async fn list_songs(&self) -> Result<Vec<Song>, StorageError> {
        Ok(self.inner.read().songs.list())
    }

    async fn list_active_songs(&self) -> Result<Vec<Song>, StorageError> {
        Ok(self
            .inner
            .read()
            .songs
            .rows
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect())
    }

    async fn update_song(
        &self,
        id: i64,
        update: SongUpdate,
    ) -> Result<Option<Song>, StorageError> {
        Ok(self.inner.write().songs.update(id, |s| {
            if let Some(v) = update.title {
                s.title = v;
            }
            if let Some(v) = update.artist {
                s.artist = v;
            }
            if let Some(v) = update.status {
                s.status = v;
            }
            if let Some(v) = update.earnings_per_video {
                s.earnings_per_video = v;
            }
            if let Some(v) = update.duration {
                s.duration = v;
            }
            if let Some(v) = update.file_url {
                s.file_url = Some(v);
            }
            if let Some(v) = update.spotify_url {
                s.spotify_url = Some(v);
            }
            if let Some(v) = update.is_active {
                s.is_active = v;
            }
        }))
    }

    async fn create_submission(
        &self,
        new: NewSubmission,
    ) -> Result<VideoSubmission, StorageError> {
        Ok(self
            .inner
            .write()
            .submissions
            .insert_with(|id| VideoSubmission {
                id,
                creator_id: new.creator_id,
                song_id: new.song_id,
                tiktok_url: new.tiktok_url.clone(),
                status: SubmissionStatus::Pending,
                earnings: 0,
                admin_notes: None,
                created_at: Utc::now(),
            }))
    }

    async fn get_submission(&self, id: i64) -> Result<Option<VideoSubmission>, StorageError> {
        Ok(self.inner.read().submissions.get(id))
    }

    async fn list_submissions(&self) -> Result<Vec<VideoSubmission>, StorageError> {
        Ok(self.inner.read().submissions.list())
    }

    async fn list_submissions_by_creator(
        &self,
        creator_id: i64,
    ) -> Result<Vec<VideoSubmission>, StorageError> {
        Ok(self
            .inner
            .read()
            .submissions
            .rows
            .values()
            .filter(|s| s.creator_id == creator_id)
            .cloned()
            .collect())
    }

    async fn update_submission(
        &self,
        id: i64,
        update: SubmissionUpdate,
    ) -> Result<Option<VideoSubmission>, StorageError> {
        Ok(self.inner.write().submissions.update(id, |s| {
            if let Some(v) = update.tiktok_url {
                s.tiktok_url = v;
            }
            if let Some(v) = update.admin_notes {
                s.admin_notes = Some(v);
            }
        }))
    }

    async fn review_submission(
        &self,
        id: i64,
        decision: ReviewDecision,
        admin_notes: Option<String>,
    ) -> Result<VideoSubmission, StorageError> {
        // The whole cascade runs under one write lock: validate, then
        // mutate submission and creator together.
        let mut inner = self.inner.write();

        let submission = inner
            .submissions
            .get(id)
            .ok_or_else(|| StorageError::NotFound(format!("submission {id}")))?;

        let next = submission.status.review(decision)?;

        let earnings = if next == SubmissionStatus::Approved {
            // The rate is read now and frozen into the submission; the
            // admin console falls back to the platform default when the
            // referenced song has vanished from the catalog.
            let rate = inner
                .songs
                .get(submission.song_id)
                .map(|s| s.earnings_per_video)
                .unwrap_or(DEFAULT_EARNINGS_PER_VIDEO);

            // Validate before mutating anything: an approval must never
            // leave the submission credited but the creator not.
            if inner.creators.get(submission.creator_id).is_none() {
                return Err(StorageError::NotFound(format!(
                    "creator {}",
                    submission.creator_id
                )));
            }
            rate
        } else {
            0
        };

        let updated = inner
            .submissions
            .update(id, |s| {
                s.status = next;
                s.earnings = earnings;
                if let Some(notes) = admin_notes {
                    s.admin_notes = Some(notes);
                }
            })
            .expect("submission existed under the same lock");

        if next == SubmissionStatus::Approved {
            inner.creators.update(updated.creator_id, |c| {
                c.total_earnings += earnings;
                c.video_count += 1;
            });
        }

        Ok(updated)
    }

    async fn list_referrals_by_referrer(
        &self,
        referrer_id: i64,
    ) -> Result<Vec<Referral>, StorageError> {
        Ok(self
            .inner
            .read()
            .referrals
            .rows
            .values()
            .filter(|r| r.referrer_id == referrer_id)
            .cloned()
            .collect())
    }

    async fn count_referrals(&self, referrer_id: i64) -> Result<i64, StorageError> {
        Ok(self
            .inner
            .read()
            .referrals
            .rows
            .values()
            .filter(|r| r.referrer_id == referrer_id)
            .count() as i64)
    }
}
