//! Hosted backend collaborator.
//!
//! The portal owns no data: patients and appointments live in document
//! collections, identification documents in a file bucket, users in the
//! identity service, and notifications go out through the messaging service.
//! [`Backend`] is that contract; [`AppwriteClient`] speaks it over REST and
//! [`LocalBackend`] implements it on SQLite for offline development.

mod appwrite;
mod local;

pub use appwrite::*;
pub use local::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use thiserror::Error;

use crate::db::DbError;
use crate::models::User;

/// Backend errors.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Authorization failed ({code}): {message}")]
    Unauthorized { code: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backend error ({code}): {message}")]
    Service { code: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not configured: {0}")]
    NotConfigured(&'static str),
}

pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// Build from an HTTP status and the service's message.
    pub fn from_status(code: u16, message: String) -> Self {
        match code {
            401 | 403 => BackendError::Unauthorized { code, message },
            404 => BackendError::NotFound(message),
            409 => BackendError::Conflict(message),
            _ => BackendError::Service { code, message },
        }
    }

    /// HTTP-style status code, if the error carries one.
    pub fn code(&self) -> Option<u16> {
        match self {
            BackendError::Unauthorized { code, .. } | BackendError::Service { code, .. } => {
                Some(*code)
            }
            BackendError::NotFound(_) => Some(404),
            BackendError::Conflict(_) => Some(409),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => BackendError::from_status(status.as_u16(), e.to_string()),
            None => BackendError::Transport(e.to_string()),
        }
    }
}

impl From<DbError> for BackendError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => BackendError::NotFound(what),
            DbError::Constraint(what) => BackendError::Conflict(what),
            DbError::Json(e) => BackendError::Json(e),
            other => BackendError::Service {
                code: 500,
                message: other.to_string(),
            },
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for BackendError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        BackendError::Service {
            code: 500,
            message: format!("Lock poisoned: {}", e),
        }
    }
}

// =========================================================================
// Wire Types
// =========================================================================

/// A document as returned by the backend: system fields plus the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    /// Body fields (and any other system fields the backend adds)
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    /// Look up a field, including the `$id`/`$createdAt`/`$updatedAt` system fields.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "$id" => Some(Value::String(self.id.clone())),
            "$createdAt" => Some(Value::String(self.created_at.clone())),
            "$updatedAt" => Some(Value::String(self.updated_at.clone())),
            _ => self.data.get(name).cloned(),
        }
    }

    /// Decode into a typed record.
    pub fn decode<T: DeserializeOwned>(self) -> BackendResult<T> {
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }
}

/// A page of documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentList {
    /// Total matching documents on the backend
    pub total: u64,
    pub documents: Vec<Document>,
}

/// File metadata in a storage bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "bucketId")]
    pub bucket_id: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(rename = "sizeOriginal")]
    pub size: u64,
}

/// A file to upload, held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Wrap an in-memory buffer; unknown content types become octet-stream.
    pub fn from_buffer(bytes: Vec<u8>, file_name: String, content_type: Option<String>) -> Self {
        Self {
            file_name,
            content_type: content_type.unwrap_or_else(|| "application/octet-stream".into()),
            bytes,
        }
    }
}

/// A message accepted by the messaging service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    #[serde(rename = "$id")]
    pub id: String,
    /// Recipient user IDs
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Filter and ordering clauses for listing documents.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Attribute equals any of the values
    Equal { attribute: String, values: Vec<Value> },
    OrderAsc(String),
    OrderDesc(String),
    Limit(u32),
}

impl Query {
    /// Equality filter on a single string value.
    pub fn equal(attribute: &str, value: &str) -> Self {
        Query::Equal {
            attribute: attribute.to_string(),
            values: vec![Value::String(value.to_string())],
        }
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::OrderAsc(attribute.to_string())
    }

    /// Encode as the backend's JSON query string.
    pub fn to_query_string(&self) -> String {
        let value = match self {
            Query::Equal { attribute, values } => serde_json::json!({
                "method": "equal",
                "attribute": attribute,
                "values": values,
            }),
            Query::OrderAsc(attribute) => serde_json::json!({
                "method": "orderAsc",
                "attribute": attribute,
            }),
            Query::OrderDesc(attribute) => serde_json::json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
            Query::Limit(limit) => serde_json::json!({
                "method": "limit",
                "values": [limit],
            }),
        };
        value.to_string()
    }

    /// Check whether a document passes this clause (non-filters always pass).
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Query::Equal { attribute, values } => document
                .attribute(attribute)
                .map(|v| values.contains(&v))
                .unwrap_or(false),
            _ => true,
        }
    }
}

/// Apply queries to an in-memory document set, in insertion order.
///
/// Returns the matching total (before limit) and the selected page.
pub fn apply_queries(documents: Vec<Document>, queries: &[Query]) -> DocumentList {
    let mut documents: Vec<Document> = documents
        .into_iter()
        .filter(|doc| queries.iter().all(|q| q.matches(doc)))
        .collect();
    let total = documents.len() as u64;

    for query in queries {
        match query {
            Query::OrderAsc(attribute) => {
                documents.sort_by(|a, b| compare_attribute(a, b, attribute));
            }
            Query::OrderDesc(attribute) => {
                // Reverse first so that ties list the newest insert first
                documents.reverse();
                documents.sort_by(|a, b| compare_attribute(b, a, attribute));
            }
            _ => {}
        }
    }

    if let Some(limit) = queries.iter().find_map(|q| match q {
        Query::Limit(limit) => Some(*limit as usize),
        _ => None,
    }) {
        documents.truncate(limit);
    }

    DocumentList { total, documents }
}

fn compare_attribute(a: &Document, b: &Document, attribute: &str) -> Ordering {
    match (a.attribute(attribute), b.attribute(attribute)) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(&y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

// =========================================================================
// Collaborator Contract
// =========================================================================

/// Operations the portal needs from the hosted backend.
#[async_trait]
pub trait Backend: Send + Sync {
    // Documents

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document>;

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> BackendResult<Document>;

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList>;

    /// Partial update: only the given fields change.
    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document>;

    // Storage

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
    ) -> BackendResult<StoredFile>;

    async fn get_file(&self, bucket_id: &str, file_id: &str) -> BackendResult<StoredFile>;

    /// Raw file content.
    async fn get_file_view(&self, bucket_id: &str, file_id: &str) -> BackendResult<Vec<u8>>;

    /// Public URL where a stored file can be viewed.
    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> String;

    // Identity

    async fn create_user(
        &self,
        user_id: &str,
        email: &str,
        phone: Option<&str>,
        name: &str,
    ) -> BackendResult<User>;

    async fn get_user(&self, user_id: &str) -> BackendResult<User>;

    async fn list_users_by_email(&self, email: &str) -> BackendResult<Vec<User>>;

    // Messaging

    async fn send_sms(
        &self,
        message_id: &str,
        content: &str,
        user_ids: &[String],
    ) -> BackendResult<Message>;
}
