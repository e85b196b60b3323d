//! Appointment status aggregation for the administrator dashboard.

use serde::{Deserialize, Serialize};

use crate::models::{Appointment, AppointmentStatus};

/// Appointment counts by status, plus the appointments themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub total_count: u64,
    pub scheduled_count: u64,
    pub pending_count: u64,
    pub cancelled_count: u64,
    /// In the order received
    pub documents: Vec<Appointment>,
}

impl AppointmentSummary {
    /// All-zero summary with no appointments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Summarize a bare list; the total is its length.
    pub fn from_documents(documents: Vec<Appointment>) -> Self {
        let total = documents.len() as u64;
        Self::tally(total, documents)
    }

    /// Summarize a page whose total was reported by the backend.
    ///
    /// Unrecognized statuses are not counted in any bucket.
    pub fn tally(total_count: u64, documents: Vec<Appointment>) -> Self {
        let mut summary = Self {
            total_count,
            ..Self::default()
        };

        for appointment in &documents {
            match appointment.status {
                AppointmentStatus::Scheduled => summary.scheduled_count += 1,
                AppointmentStatus::Pending => summary.pending_count += 1,
                AppointmentStatus::Cancelled => summary.cancelled_count += 1,
                AppointmentStatus::Unknown => {}
            }
        }

        summary.documents = documents;
        summary
    }

    /// Sum of the status buckets.
    pub fn counted(&self) -> u64 {
        self.scheduled_count + self.pending_count + self.cancelled_count
    }
}
