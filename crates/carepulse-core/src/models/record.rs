//! Record identity and durability.

use serde::{Deserialize, Serialize};

/// Prefix marking identifiers of records that were never persisted.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Generate a backend-compatible unique identifier (32 hex chars).
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Generate an identifier for a synthetic (non-persisted) record.
pub fn synthetic_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, unique_id())
}

/// Whether an identifier belongs to a synthetic record.
///
/// Such identifiers must never be sent to the backend.
pub fn is_temporary_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Result of a create or update action.
///
/// `Synthetic` records were fabricated locally because the backend was
/// unreachable or misconfigured; their identifiers carry [`TEMP_ID_PREFIX`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "durability", content = "record", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// Stored by the backend
    Persisted(T),
    /// Fabricated locally, not stored anywhere
    Synthetic(T),
}

impl<T> Outcome<T> {
    /// Check if the record was stored by the backend.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Outcome::Persisted(_))
    }

    /// Borrow the record regardless of durability.
    pub fn record(&self) -> &T {
        match self {
            Outcome::Persisted(record) | Outcome::Synthetic(record) => record,
        }
    }

    /// Take the record regardless of durability.
    pub fn into_record(self) -> T {
        match self {
            Outcome::Persisted(record) | Outcome::Synthetic(record) => record,
        }
    }

    /// Transform the record, keeping the durability tag.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Persisted(record) => Outcome::Persisted(f(record)),
            Outcome::Synthetic(record) => Outcome::Synthetic(f(record)),
        }
    }
}
