//! Appointment actions.

use chrono::Utc;
use tracing::{error, info, warn};

use super::{ActionError, ActionResult, Actions};
use crate::backend::{BackendResult, Query};
use crate::models::{
    is_temporary_id, synthetic_id, unique_id, Appointment, AppointmentUpdate, NewAppointment,
    Outcome,
};
use crate::navigation::{SuccessQuery, SuccessView};
use crate::notify::{send_sms_notification, sms_message};
use crate::stats::AppointmentSummary;

impl Actions {
    async fn store_appointment(
        &self,
        database_id: &str,
        collection_id: &str,
        input: &NewAppointment,
    ) -> BackendResult<Appointment> {
        let data = serde_json::to_value(input)?;
        self.backend
            .create_document(database_id, collection_id, &unique_id(), data)
            .await?
            .decode()
    }

    async fn list_recent(
        &self,
        database_id: &str,
        collection_id: &str,
    ) -> BackendResult<AppointmentSummary> {
        let list = self
            .backend
            .list_documents(database_id, collection_id, &[Query::order_desc("$createdAt")])
            .await?;
        // Undecodable documents are left out like unknown statuses
        let documents = list
            .documents
            .into_iter()
            .filter_map(|document| {
                let id = document.id.clone();
                match document.decode::<Appointment>() {
                    Ok(appointment) => Some(appointment),
                    Err(e) => {
                        warn!(appointment_id = %id, error = %e, "skipping undecodable appointment");
                        None
                    }
                }
            })
            .collect();
        Ok(AppointmentSummary::tally(list.total, documents))
    }

    async fn store_update(
        &self,
        database_id: &str,
        collection_id: &str,
        update: &AppointmentUpdate,
    ) -> BackendResult<Appointment> {
        let data = serde_json::to_value(&update.change)?;
        self.backend
            .update_document(database_id, collection_id, &update.appointment_id, data)
            .await?
            .decode()
    }

    /// Book an appointment.
    pub async fn create_appointment(&self, input: &NewAppointment) -> Outcome<Appointment> {
        let Some((database_id, collection_id)) = self.collections.appointments() else {
            warn!("missing database or appointment collection id, returning temporary appointment");
            return Outcome::Synthetic(Appointment::synthetic(synthetic_id(), input));
        };

        match self.store_appointment(database_id, collection_id, input).await {
            Ok(appointment) => Outcome::Persisted(appointment),
            Err(e) => {
                error!(error = %e, "error creating appointment, returning temporary appointment");
                Outcome::Synthetic(Appointment::synthetic(synthetic_id(), input))
            }
        }
    }

    /// Fetch an appointment. Blank and temporary IDs are never looked up.
    pub async fn get_appointment(&self, appointment_id: &str) -> Option<Appointment> {
        if appointment_id.trim().is_empty() || is_temporary_id(appointment_id) {
            return None;
        }

        let (database_id, collection_id) = self.collections.appointments()?;
        let fetched = self
            .backend
            .get_document(database_id, collection_id, appointment_id)
            .await
            .and_then(|document| document.decode());

        match fetched {
            Ok(appointment) => Some(appointment),
            Err(e) => {
                warn!(appointment_id, error = %e, "error retrieving appointment");
                None
            }
        }
    }

    /// Newest appointments first, with counts by status.
    ///
    /// Returns the empty summary when the list cannot be loaded.
    pub async fn recent_appointments(&self) -> AppointmentSummary {
        let Some((database_id, collection_id)) = self.collections.appointments() else {
            warn!("missing database or appointment collection id, returning empty summary");
            return AppointmentSummary::empty();
        };

        self.list_recent(database_id, collection_id)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "error retrieving recent appointments");
                AppointmentSummary::empty()
            })
    }

    /// Schedule or cancel an appointment and notify the patient.
    ///
    /// A cancelled appointment is never changed again. When the update cannot
    /// be stored the change is returned on a synthetic record and no message
    /// is sent.
    pub async fn update_appointment(
        &self,
        update: &AppointmentUpdate,
    ) -> ActionResult<Outcome<Appointment>> {
        if is_temporary_id(&update.appointment_id) {
            warn!(appointment_id = %update.appointment_id, "temporary appointment cannot be updated");
            return Ok(Outcome::Synthetic(Appointment::synthetic_update(
                update.appointment_id.clone(),
                None,
                update,
            )));
        }

        let Some((database_id, collection_id)) = self.collections.appointments() else {
            warn!("missing database or appointment collection id, returning temporary appointment");
            return Ok(Outcome::Synthetic(Appointment::synthetic_update(
                synthetic_id(),
                None,
                update,
            )));
        };

        let current = self.get_appointment(&update.appointment_id).await;
        if current.as_ref().is_some_and(Appointment::is_cancelled) {
            return Err(ActionError::AlreadyCancelled(update.appointment_id.clone()));
        }

        match self.store_update(database_id, collection_id, update).await {
            Ok(appointment) => {
                info!(
                    appointment_id = %appointment.id,
                    status = appointment.status.as_str(),
                    "appointment updated"
                );
                let content = sms_message(update.kind, &appointment);
                send_sms_notification(self.backend(), &update.user_id, &content).await;
                Ok(Outcome::Persisted(appointment))
            }
            Err(e) => {
                error!(error = %e, "error updating appointment, returning temporary appointment");
                Ok(Outcome::Synthetic(Appointment::synthetic_update(
                    synthetic_id(),
                    current.as_ref(),
                    update,
                )))
            }
        }
    }

    /// Resolve the success view shown after booking.
    pub async fn success_view(&self, appointment_id: &str, query: &SuccessQuery) -> SuccessView {
        let fetched = if SuccessView::needs_lookup(appointment_id) {
            self.get_appointment(appointment_id).await
        } else {
            None
        };
        SuccessView::build(appointment_id, query, fetched, Utc::now())
    }
}
