//! # API Route Modules
//!
//! One module per entity family:
//!
//! - `creators` — registration (with the referral side effect) and
//!   profile management.
//! - `songs` — the admin-managed catalog, including the active-only
//!   listing creators pick from.
//! - `submissions` — video submissions and the admin review workflow
//!   with its earnings cascade.
//! - `referrals` — code validation, per-creator counts and listings.

pub mod creators;
pub mod referrals;
pub mod songs;
pub mod submissions;
