//! Submitted forms and their checks.

use serde::{Deserialize, Serialize};

use super::{parse_date, Checker, ValidationErrors};
use crate::models::{
    AppointmentChange, Gender, NewAppointment, NewPatient, NewUser, UpdateKind,
};

const GENDERS: &[&str] = &["male", "female", "other"];

/// Sign-up form: the first step of registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl UserForm {
    pub fn validate(&self) -> Result<NewUser, ValidationErrors> {
        let mut check = Checker::new();
        check.length("name", &self.name, 2, Some(50));
        check.email("email", &self.email);
        check.phone("phone", &self.phone);
        check.finish(|| {
            Some(NewUser {
                name: self.name.clone(),
                email: self.email.clone(),
                phone: self.phone.clone(),
            })
        })
    }
}

/// Full patient registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PatientForm {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub gender: String,
    pub address: String,
    pub occupation: String,
    pub emergency_contact_name: String,
    pub emergency_contact_number: String,
    pub primary_physician: String,
    pub insurance_provider: String,
    pub insurance_policy_number: String,
    pub allergies: Option<String>,
    pub current_medication: Option<String>,
    pub family_medical_history: Option<String>,
    pub past_medical_history: Option<String>,
    pub identification_type: Option<String>,
    pub identification_number: Option<String>,
    pub treatment_consent: bool,
    pub disclosure_consent: bool,
    pub privacy_consent: bool,
}

impl PatientForm {
    pub fn validate(&self) -> Result<NewPatient, ValidationErrors> {
        let mut check = Checker::new();
        check.identifier("userId", &self.user_id);
        check.length("name", &self.name, 2, Some(50));
        check.email("email", &self.email);
        check.phone("phone", &self.phone);
        let birth_date = check.date("birthDate", &self.birth_date);
        let gender = check.one_of("gender", &self.gender, Gender::parse, GENDERS);
        check.length("address", &self.address, 5, Some(500));
        check.length("occupation", &self.occupation, 2, Some(500));
        check.length("emergencyContactName", &self.emergency_contact_name, 2, Some(50));
        check.phone("emergencyContactNumber", &self.emergency_contact_number);
        check.length("primaryPhysician", &self.primary_physician, 2, None);
        check.length("insuranceProvider", &self.insurance_provider, 2, Some(50));
        check.length("insurancePolicyNumber", &self.insurance_policy_number, 2, Some(50));
        check.consent("treatmentConsent", self.treatment_consent, "You must consent to treatment");
        check.consent("disclosureConsent", self.disclosure_consent, "You must consent to disclosure");
        check.consent("privacyConsent", self.privacy_consent, "You must consent to privacy");

        check.finish(|| {
            Some(NewPatient {
                user_id: self.user_id.clone(),
                name: self.name.clone(),
                email: self.email.clone(),
                phone: self.phone.clone(),
                birth_date: birth_date?,
                gender: gender?,
                address: self.address.clone(),
                occupation: self.occupation.clone(),
                emergency_contact_name: self.emergency_contact_name.clone(),
                emergency_contact_number: self.emergency_contact_number.clone(),
                primary_physician: self.primary_physician.clone(),
                insurance_provider: self.insurance_provider.clone(),
                insurance_policy_number: self.insurance_policy_number.clone(),
                allergies: non_empty(&self.allergies),
                current_medication: non_empty(&self.current_medication),
                family_medical_history: non_empty(&self.family_medical_history),
                past_medical_history: non_empty(&self.past_medical_history),
                identification_type: non_empty(&self.identification_type),
                identification_number: non_empty(&self.identification_number),
                treatment_consent: self.treatment_consent,
                disclosure_consent: self.disclosure_consent,
                privacy_consent: self.privacy_consent,
            })
        })
    }
}

/// Which appointment form is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentFormKind {
    /// Patient requests a new appointment
    Create,
    /// Administrator confirms an appointment
    Schedule,
    /// Administrator cancels an appointment
    Cancel,
}

impl AppointmentFormKind {
    /// Select the form by its type name; unknown names mean schedule.
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "create" => AppointmentFormKind::Create,
            "cancel" => AppointmentFormKind::Cancel,
            _ => AppointmentFormKind::Schedule,
        }
    }
}

impl From<UpdateKind> for AppointmentFormKind {
    fn from(kind: UpdateKind) -> Self {
        match kind {
            UpdateKind::Schedule => AppointmentFormKind::Schedule,
            UpdateKind::Cancel => AppointmentFormKind::Cancel,
        }
    }
}

/// Appointment form shared by booking, scheduling and cancelling.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppointmentForm {
    pub user_id: String,
    /// Patient document ID
    pub patient: String,
    pub primary_physician: String,
    pub schedule: String,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl AppointmentForm {
    /// Check the form's fields for the given kind, without building anything.
    pub fn check(&self, kind: AppointmentFormKind) -> Result<(), ValidationErrors> {
        let mut check = Checker::new();
        self.check_fields(&mut check, kind);
        check.finish(|| Some(()))
    }

    fn check_fields(&self, check: &mut Checker, kind: AppointmentFormKind) {
        match kind {
            AppointmentFormKind::Create => {
                check.identifier("userId", &self.user_id);
                check.required("patient", &self.patient);
                check.length("primaryPhysician", &self.primary_physician, 2, None);
                check.date("schedule", &self.schedule);
                check.length("reason", self.reason.as_deref().unwrap_or(""), 2, Some(500));
            }
            AppointmentFormKind::Schedule => {
                check.length("primaryPhysician", &self.primary_physician, 2, None);
                check.date("schedule", &self.schedule);
            }
            AppointmentFormKind::Cancel => {
                // Surrounding whitespace is not part of the reason
                let reason = self.cancellation_reason.as_deref().unwrap_or("").trim();
                check.length("cancellationReason", reason, 2, Some(500));
            }
        }
    }

    /// Validate a booking request.
    pub fn validate_create(&self) -> Result<NewAppointment, ValidationErrors> {
        let mut check = Checker::new();
        self.check_fields(&mut check, AppointmentFormKind::Create);
        let schedule = parse_date(&self.schedule);
        check.finish(|| {
            Some(NewAppointment::new(
                self.user_id.clone(),
                self.patient.clone(),
                self.primary_physician.clone(),
                schedule?,
                self.reason.clone().unwrap_or_default(),
                non_empty(&self.note),
            ))
        })
    }

    /// Validate an administrator transition.
    ///
    /// Cancelling checks only the cancellation reason; physician and
    /// schedule are passed through when present and well-formed.
    pub fn validate_change(&self, kind: UpdateKind) -> Result<AppointmentChange, ValidationErrors> {
        self.check(kind.into())?;
        let cancellation_reason = match kind {
            UpdateKind::Cancel => non_empty(&self.cancellation_reason),
            UpdateKind::Schedule => None,
        };
        Ok(AppointmentChange {
            status: kind.target_status(),
            primary_physician: Some(self.primary_physician.clone()).filter(|p| !p.is_empty()),
            schedule: parse_date(&self.schedule),
            note: non_empty(&self.note),
            cancellation_reason,
        })
    }
}

/// Trimmed value, or `None` when blank.
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
