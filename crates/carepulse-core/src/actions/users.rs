//! User actions.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::Actions;
use crate::backend::{BackendError, BackendResult};
use crate::models::{is_temporary_id, synthetic_id, unique_id, NewUser, Outcome, User};

/// Result of registering a user whose errors are surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "user", rename_all = "snake_case")]
pub enum UserRegistration {
    /// A new user was created
    Created(User),
    /// The email was already registered; this is that user
    Existing(User),
}

impl UserRegistration {
    pub fn user(&self) -> &User {
        match self {
            UserRegistration::Created(user) | UserRegistration::Existing(user) => user,
        }
    }
}

impl Actions {
    async fn existing_user(&self, email: &str) -> BackendResult<Option<User>> {
        let mut users = self.backend.list_users_by_email(email).await?;
        Ok(if users.is_empty() {
            None
        } else {
            Some(users.remove(0))
        })
    }

    /// Register a user, reporting every failure.
    ///
    /// A conflict resolves to the existing user with the same email when
    /// one can be found.
    pub async fn register_user(&self, input: &NewUser) -> BackendResult<UserRegistration> {
        let created = self
            .backend
            .create_user(&unique_id(), &input.email, Some(input.phone.as_str()), &input.name)
            .await;

        match created {
            Ok(user) => Ok(UserRegistration::Created(user)),
            Err(BackendError::Conflict(message)) => match self.existing_user(&input.email).await {
                Ok(Some(user)) => Ok(UserRegistration::Existing(user)),
                Ok(None) => Err(BackendError::Conflict(message)),
                Err(e) => {
                    error!(error = %e, "error retrieving existing user");
                    Err(BackendError::Conflict(
                        "User already exists but could not be retrieved".into(),
                    ))
                }
            },
            Err(e) => {
                error!(error = %e, code = ?e.code(), "user creation failed");
                Err(e)
            }
        }
    }

    /// Create a user, falling back to a synthetic one on any failure.
    pub async fn create_user(&self, input: &NewUser) -> Outcome<User> {
        match self.register_user(input).await {
            Ok(registration) => Outcome::Persisted(registration.user().clone()),
            Err(e) => {
                if matches!(e, BackendError::Unauthorized { .. }) {
                    warn!(error = %e, "api key rejected, using temporary user to continue");
                } else {
                    warn!(error = %e, "using temporary user to continue");
                }
                Outcome::Synthetic(User::synthetic(synthetic_id(), input))
            }
        }
    }

    /// Fetch a user. Blank and temporary IDs are never looked up.
    pub async fn get_user(&self, user_id: &str) -> Option<User> {
        if user_id.trim().is_empty() || is_temporary_id(user_id) {
            warn!(user_id, "skipping lookup of blank or temporary user id");
            return None;
        }

        match self.backend.get_user(user_id).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(user_id, error = %e, "error retrieving user");
                None
            }
        }
    }
}
