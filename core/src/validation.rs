//! Field predicates shared by request validation and storage-schema checks.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum length of free-text fields, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// Smallest accepted event capacity.
pub const MIN_CAPACITY: u32 = 1;

/// Largest accepted event capacity.
pub const MAX_CAPACITY: u32 = 1000;

#[allow(clippy::unwrap_used)] // literal pattern
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// A request field failed validation.
///
/// The display text is what clients receive as the error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Missing, blank, or overlong title.
    #[error("Invalid title")]
    InvalidTitle,
    /// Missing or unparseable date.
    #[error("Invalid date")]
    InvalidDate,
    /// Missing, blank, or overlong location.
    #[error("Invalid location")]
    InvalidLocation,
    /// Capacity missing, non-integer, or out of range.
    #[error("Invalid capacity")]
    InvalidCapacity,
    /// Missing, blank, or overlong name.
    #[error("Invalid name")]
    InvalidName,
    /// Email missing or malformed.
    #[error("Invalid email")]
    InvalidEmail,
    /// User id missing or not 24 hex characters.
    #[error("Invalid user ID")]
    InvalidUserId,
}

/// Length in characters, not bytes.
#[must_use]
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Non-blank and at most [`MAX_TEXT_LEN`] characters.
#[must_use]
pub fn is_valid_text(value: &str) -> bool {
    !value.trim().is_empty() && char_len(value) <= MAX_TEXT_LEN
}

/// Something, `@`, something, `.`, something; no whitespace.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Parses an event date.
///
/// Accepts RFC 3339 (`2030-06-01T18:00:00Z`, with any offset), a naive
/// date-time taken as UTC (`2030-06-01T18:00:00`, `2030-06-01T18:00`), or a
/// bare date taken as midnight UTC.
#[must_use]
pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Accepts an integral number within [`MIN_CAPACITY`]..=[`MAX_CAPACITY`].
#[must_use]
pub fn parse_capacity(value: f64) -> Option<u32> {
    if value.fract() != 0.0 || !(f64::from(MIN_CAPACITY)..=f64::from(MAX_CAPACITY)).contains(&value) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // range checked above
    let capacity = value as u32;
    Some(capacity)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_bounds() {
        assert!(is_valid_text("Hall A"));
        assert!(!is_valid_text(""));
        assert!(!is_valid_text("   \t"));
        assert!(is_valid_text(&"é".repeat(255)));
        assert!(!is_valid_text(&"x".repeat(256)));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user+tag@sub.example.co.uk"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@@example.com"));
    }

    #[test]
    fn test_date_formats() {
        let expected = Utc.with_ymd_and_hms(2030, 6, 1, 18, 0, 0).unwrap();
        assert_eq!(parse_date_time("2030-06-01T18:00:00Z"), Some(expected));
        assert_eq!(parse_date_time("2030-06-01T20:00:00+02:00"), Some(expected));
        assert_eq!(parse_date_time("2030-06-01T18:00:00"), Some(expected));
        assert_eq!(parse_date_time("2030-06-01T18:00"), Some(expected));
        assert_eq!(
            parse_date_time("2030-06-01"),
            Some(Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date_time("next tuesday"), None);
        assert_eq!(parse_date_time("2030-13-01"), None);
    }

    #[test]
    fn test_capacity_range() {
        assert_eq!(parse_capacity(1.0), Some(1));
        assert_eq!(parse_capacity(1000.0), Some(1000));
        assert_eq!(parse_capacity(0.0), None);
        assert_eq!(parse_capacity(1001.0), None);
        assert_eq!(parse_capacity(2.5), None);
        assert_eq!(parse_capacity(-3.0), None);
        assert_eq!(parse_capacity(f64::NAN), None);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::InvalidUserId.to_string(), "Invalid user ID");
        assert_eq!(ValidationError::InvalidDate.to_string(), "Invalid date");
    }
}
