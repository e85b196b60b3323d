//! Appointment models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Appointment lifecycle status.
///
/// New appointments are `Pending`; an administrator moves them to
/// `Scheduled` or `Cancelled`. A cancelled appointment is never reverted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Cancelled,
    /// Any status string this portal does not recognize
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Unknown => "unknown",
        }
    }
}

/// Reference to the patient document an appointment belongs to.
///
/// The backend returns either the bare document ID or the embedded
/// patient document; both decode to the ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientRef(pub String);

impl PatientRef {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl Serialize for PatientRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PatientRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Embedded {
            #[serde(rename = "$id")]
            id: String,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Id(String),
            Document(Embedded),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Id(id)) => PatientRef(id),
            Some(Repr::Document(doc)) => PatientRef(doc.id),
            None => PatientRef::default(),
        })
    }
}

/// A stored appointment document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Document ID, `temp-` prefixed when never persisted
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub patient: PatientRef,
    /// Identity service user who booked the appointment
    pub user_id: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Validated request for a new appointment, stored as the document body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub user_id: String,
    /// Patient document ID
    pub patient: String,
    pub primary_physician: String,
    pub schedule: DateTime<Utc>,
    pub reason: String,
    #[serde(default)]
    pub note: Option<String>,
    pub status: AppointmentStatus,
}

impl NewAppointment {
    /// Create a pending appointment request.
    pub fn new(
        user_id: String,
        patient: String,
        primary_physician: String,
        schedule: DateTime<Utc>,
        reason: String,
        note: Option<String>,
    ) -> Self {
        Self {
            user_id,
            patient,
            primary_physician,
            schedule,
            reason,
            note,
            status: AppointmentStatus::Pending,
        }
    }
}

/// Administrator transition applied to an appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Schedule,
    Cancel,
}

impl UpdateKind {
    /// Status the appointment ends up in.
    pub fn target_status(&self) -> AppointmentStatus {
        match self {
            UpdateKind::Schedule => AppointmentStatus::Scheduled,
            UpdateKind::Cancel => AppointmentStatus::Cancelled,
        }
    }
}

/// Fields written by an administrator update. Absent fields are left as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentChange {
    pub status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_physician: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

/// Update request for a single appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentUpdate {
    pub appointment_id: String,
    /// Recipient of the notification
    pub user_id: String,
    pub kind: UpdateKind,
    pub change: AppointmentChange,
}

impl Appointment {
    /// Stand-in appointment carrying the requested fields under `id`.
    pub fn synthetic(id: String, input: &NewAppointment) -> Self {
        Self {
            id,
            patient: PatientRef(input.patient.clone()),
            user_id: input.user_id.clone(),
            primary_physician: input.primary_physician.clone(),
            schedule: input.schedule,
            status: input.status,
            reason: Some(input.reason.clone()),
            note: input.note.clone(),
            cancellation_reason: None,
            created_at: None,
        }
    }

    /// Stand-in for an update that could not be stored.
    ///
    /// Starts from `base` when the current document is known.
    pub fn synthetic_update(id: String, base: Option<&Appointment>, update: &AppointmentUpdate) -> Self {
        let mut appointment = match base {
            Some(current) => current.clone(),
            None => Appointment {
                id: String::new(),
                patient: PatientRef::default(),
                user_id: update.user_id.clone(),
                primary_physician: String::new(),
                schedule: Utc::now(),
                status: AppointmentStatus::Pending,
                reason: None,
                note: None,
                cancellation_reason: None,
                created_at: None,
            },
        };
        appointment.id = id;
        appointment.apply(&update.change);
        appointment
    }

    /// Merge a change into this appointment.
    pub fn apply(&mut self, change: &AppointmentChange) {
        self.status = change.status;
        if let Some(physician) = &change.primary_physician {
            self.primary_physician = physician.clone();
        }
        if let Some(schedule) = change.schedule {
            self.schedule = schedule;
        }
        if change.note.is_some() {
            self.note = change.note.clone();
        }
        if change.cancellation_reason.is_some() {
            self.cancellation_reason = change.cancellation_reason.clone();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }
}
