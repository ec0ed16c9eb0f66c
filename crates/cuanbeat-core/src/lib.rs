//! # cuanbeat-core — Foundational Domain Types
//!
//! Shared vocabulary for the cuanbeat platform: the rules that do not
//! depend on HTTP or storage.
//!
//! - **E-wallets** ([`ewallet`]): the closed set of Indonesian payout
//!   wallets a creator can register with.
//! - **Lifecycle states** ([`status`]): the submission review state
//!   machine (`pending → approved | rejected`, one-directional) and the
//!   referral bonus state. Invalid transitions are typed errors, not
//!   silent overwrites.
//! - **Referral rules** ([`referral`]): deterministic referral-code
//!   derivation and the platform payout constants.
//! - **Validation** ([`validation`]): the machine-readable per-field
//!   problem list carried from request validation to API responses.
//!
//! All monetary amounts across the platform are whole rupiah held in
//! `i64` — the payout table has no fractional amounts.

pub mod ewallet;
pub mod referral;
pub mod status;
pub mod validation;

pub use ewallet::EwalletType;
pub use referral::{referral_code, DEFAULT_EARNINGS_PER_VIDEO, REFERRAL_BONUS};
pub use status::{ReferralStatus, ReviewDecision, StateTransitionError, SubmissionStatus};
pub use validation::{FieldProblem, ValidationError};
