//! Redirect targets and the booking success view.
//!
//! A synthetic record cannot be fetched again, so every redirect carries the
//! submitted values in its query string. The success view falls back to them
//! when the appointment itself is unavailable.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::models::{is_temporary_id, Appointment, NewPatient, TEMP_ID_PREFIX};
use crate::notify::format_date_time;
use crate::validation::parse_date;

pub const DEFAULT_PHYSICIAN: &str = "Pending assignment";
pub const DEFAULT_REASON: &str = "Not provided";

static SITE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost/").expect("site base url is valid"));

/// Site-relative path with each segment percent-encoded.
fn site_path(segments: &[&str]) -> String {
    let mut url = SITE.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_string()
}

/// Timestamp in the form browsers produce, e.g. `2024-05-01T09:30:00.000Z`.
fn iso_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Encode pairs as a query string, dropping empty values.
fn encode_query(pairs: &[(&str, String)]) -> String {
    let kept: Vec<(&str, &str)> = pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (*key, value.as_str()))
        .collect();
    // String pairs always encode
    serde_urlencoded::to_string(kept).unwrap_or_default()
}

fn with_query(path: String, query: &str) -> String {
    if query.is_empty() {
        path
    } else {
        format!("{}?{}", path, query)
    }
}

/// Appointment booking page for a user.
pub fn new_appointment_path(user_id: &str) -> String {
    site_path(&["patients", user_id, "new-appointment"])
}

/// Where to start over: the user's booking page, or home when unknown.
pub fn book_again_path(user_id: Option<&str>) -> String {
    match user_id.filter(|id| !id.is_empty()) {
        Some(id) => new_appointment_path(id),
        None => "/".to_string(),
    }
}

/// Target after registration: the booking page, carrying the registration
/// fields as `fallback*` parameters.
pub fn registration_redirect(user_id: &str, patient: &NewPatient) -> String {
    let query = encode_query(&[
        ("fallbackName", patient.name.clone()),
        ("fallbackEmail", patient.email.clone()),
        ("fallbackPhone", patient.phone.clone()),
        ("fallbackPhysician", patient.primary_physician.clone()),
        ("fallbackInsurance", patient.insurance_provider.clone()),
        ("fallbackPolicy", patient.insurance_policy_number.clone()),
        ("fallbackEmergencyName", patient.emergency_contact_name.clone()),
        ("fallbackEmergencyPhone", patient.emergency_contact_number.clone()),
        ("fallbackBirthDate", iso_timestamp(&patient.birth_date)),
    ]);
    with_query(new_appointment_path(user_id), &query)
}

/// Target after booking: the success redirect for the new appointment.
pub fn booking_redirect(appointment: &Appointment) -> String {
    let query = encode_query(&[
        ("appointmentId", appointment.id.clone()),
        ("fallbackDoctor", appointment.primary_physician.clone()),
        ("fallbackSchedule", iso_timestamp(&appointment.schedule)),
        ("fallbackReason", appointment.reason.clone().unwrap_or_default()),
        ("fallbackNote", appointment.note.clone().unwrap_or_default()),
    ]);
    with_query(
        site_path(&["patients", appointment.user_id.as_str(), "new-appointment", "success"]),
        &query,
    )
}

/// Resolve the success redirect for a user's booking.
///
/// The appointment ID comes from the query, or is a `temp-{millis}`
/// placeholder. `userId` is added to the forwarded query when absent.
pub fn success_redirect(user_id: &str, query: &[(String, String)], now: DateTime<Utc>) -> String {
    let appointment_id = query
        .iter()
        .find(|(key, value)| key == "appointmentId" && !value.is_empty())
        .map(|(_, value)| value.clone())
        .unwrap_or_else(|| format!("{}{}", TEMP_ID_PREFIX, now.timestamp_millis()));

    let mut forwarded: Vec<(&str, &str)> = query
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let has_user = query.iter().any(|(key, value)| key == "userId" && !value.is_empty());
    if !user_id.is_empty() && !has_user {
        forwarded.retain(|(key, _)| *key != "userId");
        forwarded.push(("userId", user_id));
    }

    let encoded = serde_urlencoded::to_string(&forwarded).unwrap_or_default();
    format!("{}?{}", site_path(&["success", appointment_id.as_str()]), encoded)
}

/// Query parameters understood by the success view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SuccessQuery {
    pub user_id: Option<String>,
    pub fallback_doctor: Option<String>,
    pub fallback_schedule: Option<String>,
    pub fallback_reason: Option<String>,
    pub fallback_note: Option<String>,
}

impl SuccessQuery {
    fn present(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Whether enough was carried over to describe the appointment.
    pub fn has_fallback(&self) -> bool {
        Self::present(&self.fallback_doctor).is_some()
            || Self::present(&self.fallback_schedule).is_some()
    }
}

/// Where the displayed details came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetailsSource {
    Backend,
    QueryFallback,
}

/// Appointment details shown after booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetails {
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    /// `schedule` as shown to the patient
    pub schedule_display: String,
    pub reason: String,
    pub note: String,
}

impl AppointmentDetails {
    fn new(primary_physician: String, schedule: DateTime<Utc>, reason: String, note: String) -> Self {
        Self {
            primary_physician,
            schedule_display: format_date_time(&schedule),
            schedule,
            reason,
            note,
        }
    }
}

/// State of the success view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SuccessView {
    MissingId {
        #[serde(rename = "bookAgain")]
        book_again: String,
    },
    NotFound {
        #[serde(rename = "appointmentId")]
        appointment_id: String,
        #[serde(rename = "bookAgain")]
        book_again: String,
    },
    Found {
        #[serde(rename = "appointmentId")]
        appointment_id: String,
        details: AppointmentDetails,
        source: DetailsSource,
        #[serde(rename = "bookAgain")]
        book_again: String,
    },
}

impl SuccessView {
    /// Whether the view must look the appointment up on the backend.
    pub fn needs_lookup(appointment_id: &str) -> bool {
        !appointment_id.is_empty() && !is_temporary_id(appointment_id)
    }

    /// Build the view from whatever was fetched plus the query fallback.
    pub fn build(
        appointment_id: &str,
        query: &SuccessQuery,
        fetched: Option<Appointment>,
        now: DateTime<Utc>,
    ) -> Self {
        let book_again = book_again_path(query.user_id.as_deref());

        if appointment_id.is_empty() {
            return SuccessView::MissingId { book_again };
        }

        if let Some(appointment) = fetched {
            let details = AppointmentDetails::new(
                appointment.primary_physician,
                appointment.schedule,
                appointment.reason.unwrap_or_else(|| DEFAULT_REASON.to_string()),
                appointment.note.unwrap_or_default(),
            );
            return SuccessView::Found {
                appointment_id: appointment_id.to_string(),
                details,
                source: DetailsSource::Backend,
                book_again,
            };
        }

        if query.has_fallback() {
            let details = AppointmentDetails::new(
                SuccessQuery::present(&query.fallback_doctor)
                    .unwrap_or(DEFAULT_PHYSICIAN)
                    .to_string(),
                SuccessQuery::present(&query.fallback_schedule)
                    .and_then(parse_date)
                    .unwrap_or(now),
                SuccessQuery::present(&query.fallback_reason)
                    .unwrap_or(DEFAULT_REASON)
                    .to_string(),
                SuccessQuery::present(&query.fallback_note)
                    .unwrap_or_default()
                    .to_string(),
            );
            return SuccessView::Found {
                appointment_id: appointment_id.to_string(),
                details,
                source: DetailsSource::QueryFallback,
                book_again,
            };
        }

        SuccessView::NotFound {
            appointment_id: appointment_id.to_string(),
            book_again,
        }
    }

    pub fn book_again(&self) -> &str {
        match self {
            SuccessView::MissingId { book_again }
            | SuccessView::NotFound { book_again, .. }
            | SuccessView::Found { book_again, .. } => book_again,
        }
    }
}
