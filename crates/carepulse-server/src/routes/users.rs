//! User sign-up and lookup.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use carepulse_core::models::{Outcome, User};
use carepulse_core::validation::{is_valid_email, UserForm};
use carepulse_core::UserRegistration;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/create-user", post(register_user))
        .route("/api/users", post(create_user))
        .route("/api/users/{user_id}", get(get_user))
}

#[derive(Debug, Deserialize)]
struct RegisterUserBody {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Register a user, surfacing backend failures as error statuses.
async fn register_user(
    State(state): State<AppState>,
    body: Result<Json<RegisterUserBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = body?;

    let (Some(name), Some(email), Some(phone)) =
        (present(body.name), present(body.email), present(body.phone))
    else {
        return Err(ApiError::BadRequest(
            "Missing required fields: name, email, and phone are required".into(),
        ));
    };
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email format".into()));
    }

    let input = UserForm { name, email, phone }.validate()?;
    let registration = state.actions.register_user(&input).await?;

    let status = match registration {
        UserRegistration::Created(_) => StatusCode::CREATED,
        UserRegistration::Existing(_) => StatusCode::OK,
    };
    Ok((
        status,
        Json(json!({ "success": true, "user": registration.user() })),
    ))
}

/// Create a user, falling back to a temporary one when the backend fails.
async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserForm>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Outcome<User>>)> {
    let Json(form) = body?;
    let input = form.validate()?;
    let outcome = state.actions.create_user(&input).await;
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<User>> {
    state
        .actions
        .get_user(&user_id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}
