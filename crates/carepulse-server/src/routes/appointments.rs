//! Appointment booking and administrator updates.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use carepulse_core::models::{Appointment, AppointmentUpdate, Outcome, UpdateKind};
use carepulse_core::navigation::booking_redirect;
use carepulse_core::validation::AppointmentFormKind;
use carepulse_core::{AppointmentForm, AppointmentSummary};

use crate::auth::AdminAccess;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/appointments", post(create_appointment))
        .route(
            "/api/appointments/{appointment_id}",
            get(get_appointment).patch(update_appointment),
        )
        .route("/api/admin/appointments", get(recent_appointments))
}

#[derive(Debug, Serialize)]
struct BookedAppointment {
    appointment: Outcome<Appointment>,
    /// Success page to continue to
    redirect: String,
}

async fn create_appointment(
    State(state): State<AppState>,
    body: Result<Json<AppointmentForm>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<BookedAppointment>)> {
    let Json(form) = body?;
    let input = form.validate_create()?;
    let outcome = state.actions.create_appointment(&input).await;
    let redirect = booking_redirect(outcome.record());

    Ok((
        StatusCode::CREATED,
        Json(BookedAppointment {
            appointment: outcome,
            redirect,
        }),
    ))
}

async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
) -> ApiResult<Json<Appointment>> {
    state
        .actions
        .get_appointment(&appointment_id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("Appointment"))
}

/// Administrator update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAppointmentBody {
    /// `schedule` or `cancel`
    #[serde(rename = "type")]
    kind: String,
    /// Recipient of the notification; defaults to the form's user
    #[serde(default)]
    user_id: Option<String>,
    appointment: AppointmentForm,
}

fn update_kind(kind: &str) -> UpdateKind {
    match AppointmentFormKind::from_type(kind) {
        AppointmentFormKind::Cancel => UpdateKind::Cancel,
        _ => UpdateKind::Schedule,
    }
}

async fn update_appointment(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    body: Result<Json<UpdateAppointmentBody>, JsonRejection>,
) -> ApiResult<Json<Outcome<Appointment>>> {
    let Json(body) = body?;
    let kind = update_kind(&body.kind);
    let change = body.appointment.validate_change(kind)?;

    let user_id = body
        .user_id
        .filter(|id| !id.is_empty())
        .unwrap_or(body.appointment.user_id);

    let update = AppointmentUpdate {
        appointment_id,
        user_id,
        kind,
        change,
    };
    let outcome = state.actions.update_appointment(&update).await?;
    Ok(Json(outcome))
}

async fn recent_appointments(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Json<AppointmentSummary> {
    Json(state.actions.recent_appointments().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_kind_from_type() {
        assert_eq!(update_kind("cancel"), UpdateKind::Cancel);
        assert_eq!(update_kind("schedule"), UpdateKind::Schedule);
        assert_eq!(update_kind("create"), UpdateKind::Schedule);
        assert_eq!(update_kind("anything"), UpdateKind::Schedule);
    }
}
