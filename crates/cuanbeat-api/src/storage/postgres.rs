//! # PostgreSQL Storage Backend
//!
//! Durable persistence via SQLx. Every operation is a network
//! round-trip that can fail independently of record existence; those
//! faults surface as [`StorageError::Backend`], distinguishable from
//! not-found.
//!
//! Multi-record operations run inside transactions:
//!
//! - creator creation + referral edge (`create_creator`)
//! - the review cascade (`review_submission`), which locks the
//!   submission row with `FOR UPDATE` so two concurrent reviews of the
//!   same submission serialize and cannot double-credit the creator.
//!
//! Enum-valued columns are parsed strictly on read. A row that fails to
//! parse is an error, never silently defaulted — defaulting a
//! submission status could re-open an approved submission on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use cuanbeat_core::{
    referral_code, EwalletType, ReferralStatus, ReviewDecision, SubmissionStatus, ValidationError,
    DEFAULT_EARNINGS_PER_VIDEO, REFERRAL_BONUS,
};

use crate::state::{Creator, Referral, Song, VideoSubmission};
use crate::storage::{
    CreatorUpdate, NewCreator, NewSong, NewSubmission, SongUpdate, Storage, StorageError,
    SubmissionUpdate,
};

/// The durable backend.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect to Postgres and run the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// Wrap an existing pool (tests and tooling).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(ValidationError::single(column, message)))
}

fn parse_ewallet(s: &str) -> Result<EwalletType, sqlx::Error> {
    s.parse()
        .map_err(|_| decode_error("ewallet_type", format!("unknown e-wallet \"{s}\" in database")))
}

fn parse_submission_status(s: &str) -> Result<SubmissionStatus, sqlx::Error> {
    match s {
        "pending" => Ok(SubmissionStatus::Pending),
        "approved" => Ok(SubmissionStatus::Approved),
        "rejected" => Ok(SubmissionStatus::Rejected),
        other => Err(decode_error(
            "status",
            format!("unknown submission status \"{other}\" in database"),
        )),
    }
}

fn parse_referral_status(s: &str) -> Result<ReferralStatus, sqlx::Error> {
    match s {
        "pending" => Ok(ReferralStatus::Pending),
        "paid" => Ok(ReferralStatus::Paid),
        other => Err(decode_error(
            "status",
            format!("unknown referral status \"{other}\" in database"),
        )),
    }
}

// ── Row types for SQLx mapping ──────────────────────────────────────

#[derive(sqlx::FromRow)]
struct CreatorRow {
    id: i64,
    tiktok_username: String,
    email: String,
    phone: String,
    ewallet_type: String,
    ewallet_number: String,
    total_earnings: i64,
    video_count: i64,
    referral_code: String,
    referred_by: Option<i64>,
    referral_earnings: i64,
    created_at: DateTime<Utc>,
}

impl CreatorRow {
    fn into_record(self) -> Result<Creator, sqlx::Error> {
        Ok(Creator {
            id: self.id,
            tiktok_username: self.tiktok_username,
            email: self.email,
            phone: self.phone,
            ewallet_type: parse_ewallet(&self.ewallet_type)?,
            ewallet_number: self.ewallet_number,
            total_earnings: self.total_earnings,
            video_count: self.video_count,
            referral_code: self.referral_code,
            referred_by: self.referred_by,
            referral_earnings: self.referral_earnings,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SongRow {
    id: i64,
    title: String,
    artist: String,
    status: String,
    earnings_per_video: i64,
    duration: String,
    file_url: Option<String>,
    spotify_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl SongRow {
    fn into_record(self) -> Song {
        Song {
            id: self.id,
            title: self.title,
            artist: self.artist,
            status: self.status,
            earnings_per_video: self.earnings_per_video,
            duration: self.duration,
            file_url: self.file_url,
            spotify_url: self.spotify_url,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: i64,
    creator_id: i64,
    song_id: i64,
    tiktok_url: String,
    status: String,
    earnings: i64,
    admin_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_record(self) -> Result<VideoSubmission, sqlx::Error> {
        Ok(VideoSubmission {
            id: self.id,
            creator_id: self.creator_id,
            song_id: self.song_id,
            tiktok_url: self.tiktok_url,
            status: parse_submission_status(&self.status)?,
            earnings: self.earnings,
            admin_notes: self.admin_notes,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReferralRow {
    id: i64,
    referrer_id: i64,
    referred_id: i64,
    referral_code: String,
    bonus_amount: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl ReferralRow {
    fn into_record(self) -> Result<Referral, sqlx::Error> {
        Ok(Referral {
            id: self.id,
            referrer_id: self.referrer_id,
            referred_id: self.referred_id,
            referral_code: self.referral_code,
            bonus_amount: self.bonus_amount,
            status: parse_referral_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

const CREATOR_COLUMNS: &str = "id, tiktok_username, email, phone, ewallet_type, ewallet_number, \
     total_earnings, video_count, referral_code, referred_by, referral_earnings, created_at";

const SONG_COLUMNS: &str = "id, title, artist, status, earnings_per_video, duration, file_url, \
     spotify_url, is_active, created_at";

const SUBMISSION_COLUMNS: &str =
    "id, creator_id, song_id, tiktok_url, status, earnings, admin_notes, created_at";

const REFERRAL_COLUMNS: &str =
    "id, referrer_id, referred_id, referral_code, bonus_amount, status, created_at";

#[async_trait]
impl Storage for PgStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn healthy(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_creator(&self, new: NewCreator) -> Result<Creator, StorageError> {
        let mut tx = self.pool.begin().await?;

        // The referral code embeds the assigned id, so draw the id from
        // the sequence first and insert with both in one statement.
        let id: i64 =
            sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('creators', 'id'))")
                .fetch_one(&mut *tx)
                .await?;
        let code = referral_code(&new.tiktok_username, id);

        let row = sqlx::query_as::<_, CreatorRow>(&format!(
            "INSERT INTO creators (id, tiktok_username, email, phone, ewallet_type, \
             ewallet_number, referral_code, referred_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CREATOR_COLUMNS}"
        ))
        .bind(id)
        .bind(&new.tiktok_username)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(new.ewallet_type.as_str())
        .bind(&new.ewallet_number)
        .bind(&code)
        .bind(new.referred_by)
        .fetch_one(&mut *tx)
        .await?;

        // Best-effort referral edge: an unknown referrer id simply
        // records no edge, registration still succeeds.
        if let Some(referrer_id) = new.referred_by {
            let referrer_code: Option<String> =
                sqlx::query_scalar("SELECT referral_code FROM creators WHERE id = $1")
                    .bind(referrer_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            if let Some(referrer_code) = referrer_code {
                sqlx::query(
                    "INSERT INTO referrals (referrer_id, referred_id, referral_code, \
                     bonus_amount, status) VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(referrer_id)
                .bind(id)
                .bind(&referrer_code)
                .bind(REFERRAL_BONUS)
                .bind(ReferralStatus::Pending.as_str())
                .execute(&mut *tx)
                .await?;
            } else {
                tracing::warn!(
                    referrer_id,
                    creator_id = id,
                    "referred_by does not match any creator; no referral recorded"
                );
            }
        }

        tx.commit().await?;
        Ok(row.into_record()?)
    }

    async fn get_creator(&self, id: i64) -> Result<Option<Creator>, StorageError> {
        let row = sqlx::query_as::<_, CreatorRow>(&format!(
            "SELECT {CREATOR_COLUMNS} FROM creators WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CreatorRow::into_record).transpose()?)
    }

    async fn list_creators(&self) -> Result<Vec<Creator>, StorageError> {
        let rows = sqlx::query_as::<_, CreatorRow>(&format!(
            "SELECT {CREATOR_COLUMNS} FROM creators ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(CreatorRow::into_record)
            .collect::<Result<_, _>>()?)
    }

    async fn update_creator(
        &self,
        id: i64,
        update: CreatorUpdate,
    ) -> Result<Option<Creator>, StorageError> {
        let row = sqlx::query_as::<_, CreatorRow>(&format!(
            "UPDATE creators SET \
             tiktok_username = COALESCE($2, tiktok_username), \
             email = COALESCE($3, email), \
             phone = COALESCE($4, phone), \
             ewallet_type = COALESCE($5, ewallet_type), \
             ewallet_number = COALESCE($6, ewallet_number) \
             WHERE id = $1 \
             RETURNING {CREATOR_COLUMNS}"
        ))
        .bind(id)
        .bind(update.tiktok_username)
        .bind(update.email)
        .bind(update.phone)
        .bind(update.ewallet_type.map(|w| w.as_str().to_string()))
        .bind(update.ewallet_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CreatorRow::into_record).transpose()?)
    }

    async fn find_creator_by_referral_code(
        &self,
        code: &str,
    ) -> Result<Option<Creator>, StorageError> {
        let row = sqlx::query_as::<_, CreatorRow>(&format!(
            "SELECT {CREATOR_COLUMNS} FROM creators WHERE referral_code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CreatorRow::into_record).transpose()?)
    }

    async fn create_song(&self, new: NewSong) -> Result<Song, StorageError> {
        let row = sqlx::query_as::<_, SongRow>(&format!(
            "INSERT INTO songs (title, artist, status, earnings_per_video, duration, \
             file_url, spotify_url, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {SONG_COLUMNS}"
        ))
        .bind(&new.title)
        .bind(&new.artist)
        .bind(&new.status)
        .bind(new.earnings_per_video)
        .bind(&new.duration)
        .bind(&new.file_url)
        .bind(&new.spotify_url)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_record())
    }

    async fn get_song(&self, id: i64) -> Result<Option<Song>, StorageError> {
        let row = sqlx::query_as::<_, SongRow>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SongRow::into_record))
    }

    async fn list_songs(&self) -> Result<Vec<Song>, StorageError> {
        let rows = sqlx::query_as::<_, SongRow>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SongRow::into_record).collect())
    }

    async fn list_active_songs(&self) -> Result<Vec<Song>, StorageError> {
        let rows = sqlx::query_as::<_, SongRow>(&format!(
            "SELECT {SONG_COLUMNS} FROM songs WHERE is_active ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SongRow::into_record).collect())
    }

    async fn update_song(
        &self,
        id: i64,
        update: SongUpdate,
    ) -> Result<Option<Song>, StorageError> {
        let row = sqlx::query_as::<_, SongRow>(&format!(
            "UPDATE songs SET \
             title = COALESCE($2, title), \
             artist = COALESCE($3, artist), \
             status = COALESCE($4, status), \
             earnings_per_video = COALESCE($5, earnings_per_video), \
             duration = COALESCE($6, duration), \
             file_url = COALESCE($7, file_url), \
             spotify_url = COALESCE($8, spotify_url), \
             is_active = COALESCE($9, is_active) \
             WHERE id = $1 \
             RETURNING {SONG_COLUMNS}"
        ))
        .bind(id)
        .bind(update.title)
        .bind(update.artist)
        .bind(update.status)
        .bind(update.earnings_per_video)
        .bind(update.duration)
        .bind(update.file_url)
        .bind(update.spotify_url)
        .bind(update.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SongRow::into_record))
    }

    async fn create_submission(
        &self,
        new: NewSubmission,
    ) -> Result<VideoSubmission, StorageError> {
        // Status and earnings are forced server-side regardless of what
        // the client sent.
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "INSERT INTO video_submissions (creator_id, song_id, tiktok_url, status, earnings) \
             VALUES ($1, $2, $3, $4, 0) \
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(new.creator_id)
        .bind(new.song_id)
        .bind(&new.tiktok_url)
        .bind(SubmissionStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into_record()?)
    }

    async fn get_submission(&self, id: i64) -> Result<Option<VideoSubmission>, StorageError> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM video_submissions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SubmissionRow::into_record).transpose()?)
    }

    async fn list_submissions(&self) -> Result<Vec<VideoSubmission>, StorageError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM video_submissions ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(SubmissionRow::into_record)
            .collect::<Result<_, _>>()?)
    }

    async fn list_submissions_by_creator(
        &self,
        creator_id: i64,
    ) -> Result<Vec<VideoSubmission>, StorageError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM video_submissions WHERE creator_id = $1 ORDER BY id"
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(SubmissionRow::into_record)
            .collect::<Result<_, _>>()?)
    }

    async fn update_submission(
        &self,
        id: i64,
        update: SubmissionUpdate,
    ) -> Result<Option<VideoSubmission>, StorageError> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "UPDATE video_submissions SET \
             tiktok_url = COALESCE($2, tiktok_url), \
             admin_notes = COALESCE($3, admin_notes) \
             WHERE id = $1 \
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(id)
        .bind(update.tiktok_url)
        .bind(update.admin_notes)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SubmissionRow::into_record).transpose()?)
    }

    async fn review_submission(
        &self,
        id: i64,
        decision: ReviewDecision,
        admin_notes: Option<String>,
    ) -> Result<VideoSubmission, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Lock the submission row for the duration of the cascade so a
        // concurrent review of the same submission waits here and then
        // fails the transition check instead of double-crediting.
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM video_submissions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StorageError::NotFound(format!("submission {id}")))?;

        let submission = row.into_record()?;
        let next = submission.status.review(decision)?;

        let earnings = if next == SubmissionStatus::Approved {
            let rate: Option<i64> =
                sqlx::query_scalar("SELECT earnings_per_video FROM songs WHERE id = $1")
                    .bind(submission.song_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            rate.unwrap_or(DEFAULT_EARNINGS_PER_VIDEO)
        } else {
            0
        };

        let updated = sqlx::query_as::<_, SubmissionRow>(&format!(
            "UPDATE video_submissions SET \
             status = $2, earnings = $3, admin_notes = COALESCE($4, admin_notes) \
             WHERE id = $1 \
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(id)
        .bind(next.as_str())
        .bind(earnings)
        .bind(admin_notes)
        .fetch_one(&mut *tx)
        .await?;

        if next == SubmissionStatus::Approved {
            let result = sqlx::query(
                "UPDATE creators SET \
                 total_earnings = total_earnings + $2, \
                 video_count = video_count + 1 \
                 WHERE id = $1",
            )
            .bind(submission.creator_id)
            .bind(earnings)
            .execute(&mut *tx)
            .await?;

            // Approving must credit someone; rolling back keeps the
            // submission pending rather than approved-but-uncredited.
            if result.rows_affected() == 0 {
                return Err(StorageError::NotFound(format!(
                    "creator {}",
                    submission.creator_id
                )));
            }
        }

        tx.commit().await?;
        Ok(updated.into_record()?)
    }

    async fn list_referrals_by_referrer(
        &self,
        referrer_id: i64,
    ) -> Result<Vec<Referral>, StorageError> {
        let rows = sqlx::query_as::<_, ReferralRow>(&format!(
            "SELECT {REFERRAL_COLUMNS} FROM referrals WHERE referrer_id = $1 ORDER BY id"
        ))
        .bind(referrer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(ReferralRow::into_record)
            .collect::<Result<_, _>>()?)
    }

    async fn count_referrals(&self, referrer_id: i64) -> Result<i64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM referrals WHERE referrer_id = $1")
                .bind(referrer_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
