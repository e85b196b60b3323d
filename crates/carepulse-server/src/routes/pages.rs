//! Redirects and the booking success view.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use carepulse_core::navigation::{success_redirect, SuccessQuery, SuccessView};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/patients/{user_id}/new-appointment/success",
            get(booking_success),
        )
        .route("/success", get(success_without_id))
        .route("/success/{appointment_id}", get(success))
}

/// Forward to the success view, keeping the fallback parameters.
async fn booking_success(
    Path(user_id): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Redirect> {
    let Query(pairs) = query?;
    Ok(Redirect::to(&success_redirect(&user_id, &pairs, Utc::now())))
}

async fn success(
    State(state): State<AppState>,
    Path(appointment_id): Path<String>,
    query: Result<Query<SuccessQuery>, QueryRejection>,
) -> ApiResult<Json<SuccessView>> {
    let Query(query) = query?;
    Ok(Json(state.actions.success_view(&appointment_id, &query).await))
}

async fn success_without_id(
    State(state): State<AppState>,
    query: Result<Query<SuccessQuery>, QueryRejection>,
) -> ApiResult<Json<SuccessView>> {
    let Query(query) = query?;
    Ok(Json(state.actions.success_view("", &query).await))
}
