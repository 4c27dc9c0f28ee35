//! Field-level checks shared by the entities.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A field value violates its documented constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError {
            field,
            message: message.into(),
        }
    }
}

static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn email_regex() -> Option<&'static Regex> {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,7}$").ok())
        .as_ref()
}

/// Non-empty and at most `max` characters. `label` is the human name used in messages.
pub fn bounded_text(
    field: &'static str,
    label: &str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::new(field, format!("{} cannot be empty", label)));
    }
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("{} must be less than {} characters", label, max),
        ));
    }
    Ok(())
}

pub fn non_empty(field: &'static str, label: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, format!("{} cannot be empty", label)));
    }
    Ok(())
}

pub fn email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    match email_regex() {
        Some(re) if re.is_match(value) => Ok(()),
        _ => Err(ValidationError::new(field, "Invalid email format")),
    }
}

/// Inclusive range check; NaN and infinities never pass.
pub fn in_range(
    field: &'static str,
    label: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("{} must be between {} and {}", label, min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("john@example.com")]
    #[case("jane.smith+tag@mail.example.org")]
    #[case("a_b%c@sub-domain.io")]
    fn accepts_well_formed_email(#[case] value: &str) {
        assert!(email("email", value).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("not-an-email")]
    #[case("john@")]
    #[case("@example.com")]
    #[case("john@example")]
    #[case("john@example.c")]
    #[case("john doe@example.com")]
    #[case("john@example.com extra")]
    fn rejects_malformed_email(#[case] value: &str) {
        let err = email("email", value).unwrap_err();
        assert_eq!(err.field, "email");
        assert_eq!(err.message, "Invalid email format");
    }

    #[test]
    fn bounded_text_counts_characters_not_bytes() {
        let name = "é".repeat(50);
        assert!(bounded_text("name", "Name", &name, 50).is_ok());
        let err = bounded_text("name", "Name", &format!("{}é", name), 50).unwrap_err();
        assert_eq!(err.message, "Name must be less than 50 characters");
    }

    #[test]
    fn in_range_rejects_nan() {
        assert!(in_range("latitude", "Latitude", f64::NAN, -90.0, 90.0).is_err());
        assert!(in_range("latitude", "Latitude", -90.0, -90.0, 90.0).is_ok());
    }
}
