//! # Structured Validation Errors
//!
//! Request validation produces a machine-readable list of per-field
//! problems rather than a single opaque message, so clients can attach
//! each problem to the offending form field. The checkers here cover
//! the formats the registration and catalog forms require; anything
//! stricter belongs to the request DTOs that use them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One problem with one field of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProblem {
    /// The field the problem is about, as named in the JSON body.
    pub field: String,
    /// Human-readable description of what is wrong.
    pub message: String,
}

impl FieldProblem {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A failed validation: one or more field problems.
///
/// Always non-empty when constructed through [`ValidationError::new`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
pub struct ValidationError(pub Vec<FieldProblem>);

impl ValidationError {
    /// Wrap a list of problems. Returns `Ok(())` when the list is empty.
    pub fn check(problems: Vec<FieldProblem>) -> Result<(), ValidationError> {
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(problems))
        }
    }

    /// A single-problem validation failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldProblem::new(field, message)])
    }

    /// The per-field problems.
    pub fn problems(&self) -> &[FieldProblem] {
        &self.0
    }
}

/// Check that a required string field is present and non-blank.
pub fn require_non_empty(field: &str, value: &str) -> Option<FieldProblem> {
    if value.trim().is_empty() {
        Some(FieldProblem::new(field, "must not be empty"))
    } else {
        None
    }
}

/// Check that a value looks like an email address: exactly one `@` with
/// a non-empty local part and a domain containing a dot.
///
/// Deliverability is not checked; this matches what the registration
/// form enforces.
pub fn require_email_shape(field: &str, value: &str) -> Option<FieldProblem> {
    let value = value.trim();
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    let ok = !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !domain.contains('@');
    if ok {
        None
    } else {
        Some(FieldProblem::new(field, "must be a valid email address"))
    }
}

/// Check that a value is all digits and at least `min_len` long.
pub fn require_digits_min_len(field: &str, value: &str, min_len: usize) -> Option<FieldProblem> {
    let value = value.trim();
    if value.len() < min_len || !value.chars().all(|c| c.is_ascii_digit()) {
        Some(FieldProblem::new(
            field,
            format!("must be numeric and at least {min_len} digits"),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_problem_list_is_ok() {
        assert!(ValidationError::check(vec![]).is_ok());
    }

    #[test]
    fn problems_surface_in_display() {
        let err = ValidationError(vec![
            FieldProblem::new("email", "must be a valid email address"),
            FieldProblem::new("phone", "must not be empty"),
        ]);
        let msg = format!("{err}");
        assert!(msg.contains("email"));
        assert!(msg.contains("phone"));
    }

    #[test]
    fn non_empty_accepts_text_and_rejects_whitespace() {
        assert!(require_non_empty("title", "Lagu Baru").is_none());
        assert!(require_non_empty("title", "   ").is_some());
        assert!(require_non_empty("title", "").is_some());
    }

    #[test]
    fn email_shape_accepts_normal_addresses() {
        assert!(require_email_shape("email", "alice@x.com").is_none());
        assert!(require_email_shape("email", "a.b+promo@mail.co.id").is_none());
    }

    #[test]
    fn email_shape_rejects_malformed_addresses() {
        for bad in ["", "alice", "alice@", "@x.com", "alice@localhost", "a@b@c.com", "alice@.com"] {
            assert!(
                require_email_shape("email", bad).is_some(),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn digits_min_len_enforces_both_rules() {
        assert!(require_digits_min_len("ewallet_number", "0812345678", 10).is_none());
        assert!(require_digits_min_len("ewallet_number", "081234567", 10).is_some());
        assert!(require_digits_min_len("ewallet_number", "08123abc90", 10).is_some());
    }

    #[test]
    fn field_problems_serialize_with_field_and_message() {
        let problem = FieldProblem::new("email", "must be a valid email address");
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["field"], "email");
        assert_eq!(json["message"], "must be a valid email address");
    }
}
