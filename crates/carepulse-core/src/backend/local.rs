//! SQLite-backed implementation of the backend contract.

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

use super::{
    apply_queries, Backend, BackendError, BackendResult, Document, DocumentList, InputFile,
    Message, Query, StoredFile,
};
use crate::db::{Database, OutboxMessage};
use crate::models::User;

/// Local stand-in for the hosted backend.
///
/// Enforces the same uniqueness rules (user email/phone, document and file
/// IDs) so conflicts surface exactly as they would remotely. Messages are
/// recorded in an outbox instead of being delivered.
#[derive(Clone)]
pub struct LocalBackend {
    db: Arc<Mutex<Database>>,
}

impl LocalBackend {
    /// Open or create a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> BackendResult<Self> {
        let db = Database::open(path)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory() -> BackendResult<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Messages recorded so far, oldest first.
    pub fn outbox(&self) -> BackendResult<Vec<OutboxMessage>> {
        let db = self.db.lock()?;
        Ok(db.list_messages()?)
    }
}

fn into_object(data: Value) -> BackendResult<serde_json::Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::Service {
            code: 400,
            message: format!("Document data must be a JSON object, got {}", other),
        }),
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document> {
        let data = into_object(data)?;
        let db = self.db.lock()?;
        Ok(db.insert_document(database_id, collection_id, document_id, &data)?)
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> BackendResult<Document> {
        let db = self.db.lock()?;
        db.get_document(database_id, collection_id, document_id)?
            .ok_or_else(|| BackendError::NotFound(format!("document {}", document_id)))
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        let documents = {
            let db = self.db.lock()?;
            db.list_documents(database_id, collection_id)?
        };
        Ok(apply_queries(documents, queries))
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document> {
        let patch = into_object(data)?;
        let db = self.db.lock()?;
        Ok(db.update_document(database_id, collection_id, document_id, &patch)?)
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
    ) -> BackendResult<StoredFile> {
        let db = self.db.lock()?;
        Ok(db.insert_file(bucket_id, file_id, &file)?)
    }

    async fn get_file(&self, bucket_id: &str, file_id: &str) -> BackendResult<StoredFile> {
        let db = self.db.lock()?;
        db.get_file(bucket_id, file_id)?
            .ok_or_else(|| BackendError::NotFound(format!("file {}", file_id)))
    }

    async fn get_file_view(&self, bucket_id: &str, file_id: &str) -> BackendResult<Vec<u8>> {
        let db = self.db.lock()?;
        db.get_file_content(bucket_id, file_id)?
            .ok_or_else(|| BackendError::NotFound(format!("file {}", file_id)))
    }

    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> String {
        format!("/storage/buckets/{}/files/{}/view", bucket_id, file_id)
    }

    async fn create_user(
        &self,
        user_id: &str,
        email: &str,
        phone: Option<&str>,
        name: &str,
    ) -> BackendResult<User> {
        let user = User {
            id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.map(str::to_string),
        };
        let db = self.db.lock()?;
        db.insert_user(&user)?;
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> BackendResult<User> {
        let db = self.db.lock()?;
        db.get_user(user_id)?
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))
    }

    async fn list_users_by_email(&self, email: &str) -> BackendResult<Vec<User>> {
        let db = self.db.lock()?;
        Ok(db.find_users_by_email(email)?)
    }

    async fn send_sms(
        &self,
        message_id: &str,
        content: &str,
        user_ids: &[String],
    ) -> BackendResult<Message> {
        let db = self.db.lock()?;
        let recorded = db.insert_message(message_id, content, user_ids)?;
        Ok(Message {
            id: recorded.id,
            users: recorded.user_ids,
            status: Some("processing".into()),
        })
    }
}
