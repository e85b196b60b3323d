//! Patient models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Patient gender as offered by the registration form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse the form value ("male", "female", "other").
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Validated registration data, stored as the patient document body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    /// Identity service user this patient extends
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    /// Physician the patient prefers to see
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub current_medication: Option<String>,
    #[serde(default)]
    pub family_medical_history: Option<String>,
    #[serde(default)]
    pub past_medical_history: Option<String>,
    /// Kind of identification (e.g., "Passport", "Driver's License")
    #[serde(default)]
    pub identification_type: Option<String>,
    #[serde(default)]
    pub identification_number: Option<String>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

/// A stored patient document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Document ID, `temp-` prefixed when never persisted
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(flatten)]
    pub details: NewPatient,
    /// File ID of the uploaded identification document
    #[serde(rename = "identificationDocumentId", default)]
    pub identification_document_id: Option<String>,
    /// Public view URL of the uploaded identification document
    #[serde(rename = "identificationDocumentUrl", default)]
    pub identification_document_url: Option<String>,
}

/// Identification document attached to a registration.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentificationDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Everything needed to register a patient.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRegistration {
    pub patient: NewPatient,
    pub identification_document: Option<IdentificationDocument>,
}

impl Patient {
    /// Stand-in patient carrying the submitted fields under `id`.
    pub fn synthetic(id: String, input: &NewPatient) -> Self {
        Self {
            id,
            details: input.clone(),
            identification_document_id: None,
            identification_document_url: None,
        }
    }

    /// Check if an identification document is on file.
    pub fn has_identification_document(&self) -> bool {
        self.identification_document_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_input() -> NewPatient {
        NewPatient {
            user_id: "user-1".into(),
            name: "Mahi Shah".into(),
            email: "mahi@example.com".into(),
            phone: "+15555550100".into(),
            birth_date: Utc.with_ymd_and_hms(1990, 4, 2, 0, 0, 0).unwrap(),
            gender: Gender::Female,
            address: "14 Elm Street".into(),
            occupation: "Engineer".into(),
            emergency_contact_name: "Ravi Shah".into(),
            emergency_contact_number: "+15555550101".into(),
            primary_physician: "John Green".into(),
            insurance_provider: "BlueCross".into(),
            insurance_policy_number: "ABC123".into(),
            allergies: None,
            current_medication: None,
            family_medical_history: None,
            past_medical_history: None,
            identification_type: Some("Passport".into()),
            identification_number: Some("P1234".into()),
            treatment_consent: true,
            disclosure_consent: true,
            privacy_consent: true,
        }
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse("other"), Some(Gender::Other));
        assert_eq!(Gender::parse("Male"), None);
    }

    #[test]
    fn test_document_shape_is_flat() {
        let patient = Patient::synthetic("temp-1".into(), &make_input());
        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["$id"], "temp-1");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["gender"], "female");
        assert!(json["identificationDocumentId"].is_null());

        let back: Patient = serde_json::from_value(json).unwrap();
        assert_eq!(back, patient);
        assert!(!back.has_identification_document());
    }
}
