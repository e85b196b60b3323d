//! HTTP API for the CarePulse booking portal.
//!
//! Thin axum layer over [`carepulse_core::Actions`]: handlers validate the
//! submitted form, call the action, and return its result as JSON together
//! with the page the client should continue to. Administrator endpoints are
//! guarded by [`auth::AdminAccess`].

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
