//! # Referral Rules
//!
//! Referral-code derivation and the platform payout constants.
//!
//! A creator's referral code is derived once, at registration, from the
//! normalized TikTok username and the assigned identifier. The
//! identifier component makes the code unique without any coordination;
//! the username component makes it recognizable when shared.

/// Bonus recorded for the referrer when an invited creator registers,
/// in whole rupiah.
pub const REFERRAL_BONUS: i64 = 500;

/// Per-video payout used when a song is created without an explicit
/// rate, in whole rupiah.
pub const DEFAULT_EARNINGS_PER_VIDEO: i64 = 100;

/// Derive a creator's referral code from their username and identifier.
///
/// The username is stripped of any leading `@` and uppercased, then
/// joined with the identifier: `@alice` with id 1 becomes
/// `ALICE-REF-1`. Codes are immutable once assigned and unique because
/// identifiers are unique.
pub fn referral_code(tiktok_username: &str, id: i64) -> String {
    let normalized = tiktok_username
        .trim()
        .trim_start_matches('@')
        .to_uppercase();
    format!("{normalized}-REF-{id}")
}
