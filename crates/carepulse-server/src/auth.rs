//! Administrator passkey guard.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

pub const PASSKEY_HEADER: &str = "x-admin-passkey";

/// SHA-256 hex digest of a passkey.
pub fn passkey_digest(passkey: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(passkey.as_bytes());
    hex::encode(hasher.finalize())
}

/// Proof that the request carried the admin passkey.
///
/// Missing header is 401; a wrong passkey is 403.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get(PASSKEY_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Admin passkey required".into()))?
            .to_str()
            .map_err(|_| ApiError::Forbidden("Invalid passkey. Please try again.".into()))?;

        if passkey_digest(supplied) != state.admin_digest() {
            warn!(path = %parts.uri.path(), "rejected admin passkey");
            return Err(ApiError::Forbidden("Invalid passkey. Please try again.".into()));
        }
        Ok(AdminAccess)
    }
}
