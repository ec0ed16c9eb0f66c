//! # Lifecycle State Machines
//!
//! Submission review states and referral bonus states as enums with
//! explicit transition methods. A submission leaves `pending` exactly
//! once; both `approved` and `rejected` are terminal. There is no path
//! back — re-reviewing is a typed error, never a silent overwrite.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The review state of a video submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Awaiting admin review. Initial state.
    Pending,
    /// Accepted — earnings credited to the creator. Terminal.
    Approved,
    /// Declined — no earnings. Terminal.
    Rejected,
}

/// The admin's verdict on a pending submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    /// The terminal state this decision produces.
    pub fn target(&self) -> SubmissionStatus {
        match self {
            Self::Approve => SubmissionStatus::Approved,
            Self::Reject => SubmissionStatus::Rejected,
        }
    }
}

impl SubmissionStatus {
    /// String form as stored and transmitted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Apply a review decision.
    ///
    /// Only `Pending` submissions can be reviewed; applying a decision
    /// to a terminal state returns [`StateTransitionError::AlreadyReviewed`]
    /// without changing anything.
    pub fn review(self, decision: ReviewDecision) -> Result<SubmissionStatus, StateTransitionError> {
        match self {
            Self::Pending => Ok(decision.target()),
            from => Err(StateTransitionError::AlreadyReviewed {
                from,
                to: decision.target(),
            }),
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The payout state of a referral bonus.
///
/// Bonuses are recorded as `pending`; no payout-confirmation operation
/// exists yet, so nothing currently moves a bonus to `paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Paid,
}

impl ReferralStatus {
    /// String form as stored and transmitted.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors during submission state transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateTransitionError {
    /// The submission has already been reviewed and cannot change again.
    #[error("submission is already {from}; cannot transition to {to}")]
    AlreadyReviewed {
        /// The terminal state the submission is in.
        from: SubmissionStatus,
        /// The state the caller attempted to reach.
        to: SubmissionStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved() {
        let next = SubmissionStatus::Pending
            .review(ReviewDecision::Approve)
            .unwrap();
        assert_eq!(next, SubmissionStatus::Approved);
        assert!(next.is_terminal());
    }

    #[test]
    fn pending_can_be_rejected() {
        let next = SubmissionStatus::Pending
            .review(ReviewDecision::Reject)
            .unwrap();
        assert_eq!(next, SubmissionStatus::Rejected);
        assert!(next.is_terminal());
    }

    #[test]
    fn approved_cannot_be_reviewed_again() {
        let err = SubmissionStatus::Approved
            .review(ReviewDecision::Approve)
            .unwrap_err();
        assert_eq!(
            err,
            StateTransitionError::AlreadyReviewed {
                from: SubmissionStatus::Approved,
                to: SubmissionStatus::Approved,
            }
        );
    }

    #[test]
    fn rejected_cannot_be_approved_later() {
        let err = SubmissionStatus::Rejected
            .review(ReviewDecision::Approve)
            .unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("already rejected"));
        assert!(msg.contains("approved"));
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&SubmissionStatus::Approved).unwrap(),
            "\"approved\""
        );
        assert_eq!(
            serde_json::to_string(&ReferralStatus::Pending).unwrap(),
            "\"pending\""
        );
    }

    #[test]
    fn status_deserializes_from_lowercase() {
        let status: SubmissionStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, SubmissionStatus::Rejected);
    }

    #[test]
    fn pending_is_not_terminal() {
        assert!(!SubmissionStatus::Pending.is_terminal());
    }
}
