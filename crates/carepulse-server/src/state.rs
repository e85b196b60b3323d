//! Shared handler state.

use carepulse_core::Actions;

use crate::auth::passkey_digest;

/// State shared by every handler: the actions and the admin passkey digest.
#[derive(Clone)]
pub struct AppState {
    pub actions: Actions,
    /// SHA-256 hex digest of the configured admin passkey
    admin_digest: String,
}

impl AppState {
    pub fn new(actions: Actions, admin_passkey: &str) -> Self {
        Self {
            actions,
            admin_digest: passkey_digest(admin_passkey),
        }
    }

    pub fn admin_digest(&self) -> &str {
        &self.admin_digest
    }
}
