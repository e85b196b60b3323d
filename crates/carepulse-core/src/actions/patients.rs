//! Patient actions.

use serde_json::Value;
use tracing::{error, warn};

use super::Actions;
use crate::backend::{BackendError, BackendResult, InputFile, Query};
use crate::models::{
    synthetic_id, unique_id, IdentificationDocument, NewPatient, Outcome, Patient,
    PatientRegistration,
};

impl Actions {
    /// Upload the identification document, returning its file ID and view URL.
    async fn upload_identification(
        &self,
        document: IdentificationDocument,
    ) -> BackendResult<Option<(String, String)>> {
        let Some(bucket_id) = self.collections.bucket_id.as_deref() else {
            warn!("no bucket configured, identification document not stored");
            return Ok(None);
        };

        let file = InputFile::from_buffer(document.bytes, document.file_name, document.content_type);
        let stored = self.backend.create_file(bucket_id, &unique_id(), file).await?;
        let url = self.backend.file_view_url(bucket_id, &stored.id);
        Ok(Some((stored.id, url)))
    }

    async fn store_patient(
        &self,
        database_id: &str,
        collection_id: &str,
        patient: &NewPatient,
        document: Option<IdentificationDocument>,
    ) -> BackendResult<Patient> {
        let file = match document {
            Some(document) => self.upload_identification(document).await?,
            None => None,
        };

        let mut data = match serde_json::to_value(patient)? {
            Value::Object(map) => map,
            _ => {
                return Err(BackendError::Service {
                    code: 400,
                    message: "patient did not serialize to an object".into(),
                })
            }
        };
        let (file_id, url) = match file {
            Some((id, url)) => (Value::String(id), Value::String(url)),
            None => (Value::Null, Value::Null),
        };
        data.insert("identificationDocumentId".into(), file_id);
        data.insert("identificationDocumentUrl".into(), url);

        let document = self
            .backend
            .create_document(database_id, collection_id, &unique_id(), Value::Object(data))
            .await?;
        document.decode()
    }

    /// Register a patient, uploading the identification document first.
    pub async fn register_patient(&self, registration: PatientRegistration) -> Outcome<Patient> {
        let PatientRegistration {
            patient,
            identification_document,
        } = registration;

        let Some((database_id, collection_id)) = self.collections.patients() else {
            warn!("missing database or patient collection id, returning temporary patient");
            return Outcome::Synthetic(Patient::synthetic(synthetic_id(), &patient));
        };

        match self
            .store_patient(database_id, collection_id, &patient, identification_document)
            .await
        {
            Ok(stored) => Outcome::Persisted(stored),
            Err(e) => {
                error!(error = %e, "error creating patient, returning temporary patient");
                Outcome::Synthetic(Patient::synthetic(synthetic_id(), &patient))
            }
        }
    }

    /// Fetch the patient registered for a user.
    pub async fn get_patient(&self, user_id: &str) -> Option<Patient> {
        if user_id.trim().is_empty() {
            warn!("patient lookup without user id");
            return None;
        }

        let Some((database_id, collection_id)) = self.collections.patients() else {
            warn!("missing database or patient collection id, unable to load patient");
            return None;
        };

        let found = self
            .backend
            .list_documents(database_id, collection_id, &[Query::equal("userId", user_id)])
            .await
            .and_then(|list| list.documents.into_iter().next().map(|d| d.decode()).transpose());

        match found {
            Ok(patient) => patient,
            Err(e) => {
                error!(user_id, error = %e, "error retrieving patient");
                None
            }
        }
    }
}
