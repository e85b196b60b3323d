//! Form validation.
//!
//! Every form is checked field by field before any backend call is made.
//! A failed check yields [`ValidationErrors`] naming each offending field,
//! a successful one yields the validated model the actions accept.

mod forms;

pub use forms::*;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `+` followed by 10 to 15 digits.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+\d{10,15}$").expect("phone pattern is valid"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Check a phone number against the accepted format.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Check an email address against the accepted format.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Parse a submitted date or date-time.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) and
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field name as submitted (camelCase)
    pub field: String,
    pub message: String,
}

/// All fields rejected by a form check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("validation failed for: {}", field_names(.fields))]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

fn field_names(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| f.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    /// Check whether a field was rejected.
    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    /// First message recorded for a field.
    pub fn message(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Collects field errors while a form is checked.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Length in characters must be within `min..=max` (no upper bound if `None`).
    pub(crate) fn length(&mut self, field: &str, value: &str, min: usize, max: Option<usize>) {
        let len = value.chars().count();
        if len < min {
            self.reject(field, format!("Must be at least {} characters", min));
        } else if let Some(max) = max.filter(|max| len > *max) {
            self.reject(field, format!("Must be at most {} characters", max));
        }
    }

    pub(crate) fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.reject(field, "Required");
        }
    }

    /// Non-blank identifier usable as a path segment.
    pub(crate) fn identifier(&mut self, field: &str, value: &str) {
        match value.trim() {
            "" => self.reject(field, "Required"),
            "." | ".." => self.reject(field, "Invalid identifier"),
            _ => {}
        }
    }

    pub(crate) fn email(&mut self, field: &str, value: &str) {
        if !is_valid_email(value) {
            self.reject(field, "Invalid email address");
        }
    }

    pub(crate) fn phone(&mut self, field: &str, value: &str) {
        if !is_valid_phone(value) {
            self.reject(field, "Invalid phone number");
        }
    }

    pub(crate) fn date(&mut self, field: &str, value: &str) -> Option<DateTime<Utc>> {
        let parsed = parse_date(value);
        if parsed.is_none() {
            self.reject(field, "Invalid date");
        }
        parsed
    }

    pub(crate) fn consent(&mut self, field: &str, value: bool, message: &str) {
        if !value {
            self.reject(field, message);
        }
    }

    pub(crate) fn one_of<T>(
        &mut self,
        field: &str,
        value: &str,
        parse: impl Fn(&str) -> Option<T>,
        allowed: &[&str],
    ) -> Option<T> {
        let parsed = parse(value);
        if parsed.is_none() {
            self.reject(
                field,
                format!("Expected one of {}, received '{}'", allowed.join(" | "), value),
            );
        }
        parsed
    }

    /// Finish the check: errors if anything was rejected, else `build()`.
    ///
    /// `build` is only invoked when every field passed, so it may rely on
    /// values the checker already parsed.
    pub(crate) fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        build().ok_or_else(ValidationErrors::default)
    }
}
