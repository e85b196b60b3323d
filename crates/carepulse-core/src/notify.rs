//! SMS notifications for administrator updates.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::backend::Backend;
use crate::models::{unique_id, Appointment, UpdateKind};

/// Render a timestamp the way patients see it, e.g. `Oct 17, 2023, 8:30 AM` (UTC).
pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.format("%b %-d, %Y, %-I:%M %p").to_string()
}

/// Text sent to the patient after an appointment is scheduled or cancelled.
pub fn sms_message(kind: UpdateKind, appointment: &Appointment) -> String {
    let when = format_date_time(&appointment.schedule);
    match kind {
        UpdateKind::Schedule => format!(
            "Greetings from CarePulse. Your appointment is confirmed for {} with Dr. {}.",
            when, appointment.primary_physician
        ),
        UpdateKind::Cancel => format!(
            "Greetings from CarePulse. We regret to inform that your appointment for {} is cancelled. Reason:  {}.",
            when,
            appointment.cancellation_reason.as_deref().unwrap_or_default()
        ),
    }
}

/// Send an SMS to a single user. Failures are logged and swallowed.
///
/// Returns whether the messaging service accepted the message.
pub async fn send_sms_notification(backend: &dyn Backend, user_id: &str, content: &str) -> bool {
    let recipients = [user_id.to_string()];
    match backend.send_sms(&unique_id(), content, &recipients).await {
        Ok(message) => {
            info!(message_id = %message.id, user_id, "sms notification sent");
            true
        }
        Err(e) => {
            warn!(error = %e, user_id, "failed to send sms notification");
            false
        }
    }
}
