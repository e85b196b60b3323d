//! CarePulse Core Library
//!
//! Patient registration and appointment booking over a hosted
//! backend-as-a-service.
//!
//! # Architecture
//!
//! ```text
//! Form input ──► validation ──► actions ──► Backend ──┬── AppwriteClient (REST)
//!                                  │                  └── LocalBackend (SQLite)
//!                                  │
//!                   ┌──────────────┼────────────────┐
//!                   │              │                │
//!                   ▼              ▼                ▼
//!              Outcome<T>     stats (admin)    notify (SMS)
//!         Persisted | Synthetic
//!                   │
//!                   ▼
//!            navigation (redirects carrying fallback query params)
//! ```
//!
//! # Core Principle
//!
//! **The booking flow never dead-ends.** When the backend is unreachable or
//! misconfigured, create and update actions return a synthetic record with a
//! `temp-` identifier, and the redirects carry enough of the submitted form
//! for the next page to render without it.
//!
//! # Modules
//!
//! - [`models`]: Domain types (User, Patient, Appointment, Outcome)
//! - [`validation`]: Form schemas and field checks
//! - [`backend`]: Backend contract, Appwrite client, local SQLite backend
//! - [`db`]: SQLite store used by the local backend
//! - [`actions`]: Server actions with fallback synthesis
//! - [`stats`]: Appointment status aggregation
//! - [`notify`]: SMS templates and delivery
//! - [`navigation`]: Redirect targets and the success view
//! - [`config`]: Environment configuration

pub mod actions;
pub mod backend;
pub mod config;
pub mod db;
pub mod models;
pub mod navigation;
pub mod notify;
pub mod stats;
pub mod validation;

// Re-export commonly used types
pub use actions::{ActionError, Actions, UserRegistration};
pub use backend::{AppwriteClient, Backend, BackendError, LocalBackend};
pub use config::{BackendConfig, Collections, Config, ConfigError};
pub use models::{
    Appointment, AppointmentStatus, AppointmentUpdate, NewAppointment, NewPatient, NewUser,
    Outcome, Patient, PatientRegistration, UpdateKind, User,
};
pub use navigation::{SuccessQuery, SuccessView};
pub use stats::AppointmentSummary;
pub use validation::{AppointmentForm, PatientForm, UserForm, ValidationErrors};

use std::sync::Arc;

/// Build the backend selected by the configuration.
pub fn connect_backend(config: &BackendConfig) -> Result<Arc<dyn Backend>, BackendError> {
    let backend: Arc<dyn Backend> = match config {
        BackendConfig::Appwrite(settings) => Arc::new(AppwriteClient::new(settings)?),
        BackendConfig::Local { path } => Arc::new(LocalBackend::open(path)?),
    };
    Ok(backend)
}
