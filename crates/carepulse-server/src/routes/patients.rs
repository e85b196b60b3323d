//! Patient registration and lookup.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use carepulse_core::models::{IdentificationDocument, Outcome, Patient, PatientRegistration};
use carepulse_core::navigation::registration_redirect;
use carepulse_core::PatientForm;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Largest accepted registration upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/patients",
            post(register_patient).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/patients/{user_id}", get(get_patient))
}

#[derive(Debug, Serialize)]
struct RegisteredPatient {
    patient: Outcome<Patient>,
    /// Booking page to continue to
    redirect: String,
}

/// Register a patient from a multipart form.
///
/// Parts: `patient` (JSON registration form) and an optional
/// `identificationDocument` file.
async fn register_patient(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<RegisteredPatient>)> {
    let mut form: Option<PatientForm> = None;
    let mut document: Option<IdentificationDocument> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("patient") => {
                let text = field.text().await?;
                form = Some(serde_json::from_str(&text)?);
            }
            Some("identificationDocument") => {
                let file_name = field.file_name().unwrap_or("identification").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    document = Some(IdentificationDocument {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    let form = form.ok_or_else(|| ApiError::BadRequest("Missing patient form".into()))?;
    let patient = form.validate()?;
    let redirect = registration_redirect(&patient.user_id, &patient);

    let outcome = state
        .actions
        .register_patient(PatientRegistration {
            patient,
            identification_document: document,
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredPatient {
            patient: outcome,
            redirect,
        }),
    ))
}

async fn get_patient(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Patient>> {
    state
        .actions
        .get_patient(&user_id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Patient"))
}
