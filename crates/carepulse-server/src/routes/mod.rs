//! HTTP routes, one router per resource.

pub mod appointments;
pub mod files;
pub mod pages;
pub mod patients;
pub mod users;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(users::router())
        .merge(patients::router())
        .merge(appointments::router())
        .merge(pages::router())
        .merge(files::router())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
