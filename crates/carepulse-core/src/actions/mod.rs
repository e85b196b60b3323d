//! Server actions: the operations the API exposes.
//!
//! Each action validates nothing itself (forms do that first) and forwards
//! to the [`Backend`]. Create and update actions never fail on backend
//! errors: they log the error and return an [`Outcome::Synthetic`] record
//! built from the input so the booking flow can continue. Read actions
//! return `None` instead of an error.
//!
//! [`Outcome::Synthetic`]: crate::models::Outcome::Synthetic

mod appointments;
mod patients;
mod users;

pub use users::UserRegistration;

use std::sync::Arc;
use thiserror::Error;

use crate::backend::Backend;
use crate::config::Collections;

/// Errors surfaced by actions.
#[derive(Error, Debug, PartialEq)]
pub enum ActionError {
    #[error("Appointment {0} is cancelled and cannot be changed")]
    AlreadyCancelled(String),
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Shared handle to the backend and the configured collections.
#[derive(Clone)]
pub struct Actions {
    backend: Arc<dyn Backend>,
    collections: Collections,
}

impl Actions {
    pub fn new(backend: Arc<dyn Backend>, collections: Collections) -> Self {
        Self {
            backend,
            collections,
        }
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }
}
