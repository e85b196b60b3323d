//! Appwrite REST client.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{
    Backend, BackendError, BackendResult, Document, DocumentList, InputFile, Message, Query,
    StoredFile,
};
use crate::config::AppwriteSettings;
use crate::models::User;

/// Error body returned by the service.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<u16>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserList {
    users: Vec<User>,
}

/// Server-side client authenticated with an API key.
#[derive(Clone)]
pub struct AppwriteClient {
    http: reqwest::Client,
    endpoint: Url,
    project_id: String,
    api_key: String,
}

impl AppwriteClient {
    /// Create a client for the configured project.
    pub fn new(settings: &AppwriteSettings) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("carepulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let endpoint = Url::parse(settings.endpoint.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                BackendError::Transport(format!("invalid endpoint: {}", settings.endpoint))
            })?;
        Ok(Self {
            http,
            endpoint,
            project_id: settings.project_id.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Endpoint URL extended by `segments`, each percent-encoded as a
    /// single path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http
            .request(method, self.url(segments))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    async fn send_raw(&self, builder: RequestBuilder) -> BackendResult<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => {
                debug!(code = ?body.code, kind = ?body.kind, "backend returned error");
                BackendError::from_status(body.code.unwrap_or(status.as_u16()), body.message)
            }
            Err(_) => BackendError::from_status(status.as_u16(), text),
        };
        Err(error)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> BackendResult<T> {
        let response = self.send_raw(builder).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Check that an identifier can stand as one path segment.
///
/// Empty and dot segments would be dropped or resolved by URL parsing and
/// address a different resource.
fn segment(id: &str) -> BackendResult<&str> {
    match id {
        "" | "." | ".." => Err(BackendError::NotFound(format!("invalid identifier {:?}", id))),
        _ => Ok(id),
    }
}

fn documents_path<'a>(database_id: &'a str, collection_id: &'a str) -> BackendResult<[&'a str; 5]> {
    Ok([
        "databases",
        segment(database_id)?,
        "collections",
        segment(collection_id)?,
        "documents",
    ])
}

fn query_params(queries: &[Query]) -> Vec<(&'static str, String)> {
    queries
        .iter()
        .map(|q| ("queries[]", q.to_query_string()))
        .collect()
}

fn document_path<'a>(
    database_id: &'a str,
    collection_id: &'a str,
    document_id: &'a str,
) -> BackendResult<[&'a str; 6]> {
    Ok([
        "databases",
        segment(database_id)?,
        "collections",
        segment(collection_id)?,
        "documents",
        segment(document_id)?,
    ])
}

#[async_trait]
impl Backend for AppwriteClient {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document> {
        let path = documents_path(database_id, collection_id)?;
        let body = json!({ "documentId": document_id, "data": data });
        self.send(self.request(Method::POST, &path).json(&body)).await
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> BackendResult<Document> {
        let path = document_path(database_id, collection_id, document_id)?;
        self.send(self.request(Method::GET, &path)).await
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> BackendResult<DocumentList> {
        let path = documents_path(database_id, collection_id)?;
        let builder = self.request(Method::GET, &path).query(&query_params(queries));
        self.send(builder).await
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> BackendResult<Document> {
        let path = document_path(database_id, collection_id, document_id)?;
        let body = json!({ "data": data });
        self.send(self.request(Method::PATCH, &path).json(&body)).await
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: InputFile,
    ) -> BackendResult<StoredFile> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        let path = ["storage", "buckets", segment(bucket_id)?, "files"];
        self.send(self.request(Method::POST, &path).multipart(form)).await
    }

    async fn get_file(&self, bucket_id: &str, file_id: &str) -> BackendResult<StoredFile> {
        let path = ["storage", "buckets", segment(bucket_id)?, "files", segment(file_id)?];
        self.send(self.request(Method::GET, &path)).await
    }

    async fn get_file_view(&self, bucket_id: &str, file_id: &str) -> BackendResult<Vec<u8>> {
        let path = [
            "storage",
            "buckets",
            segment(bucket_id)?,
            "files",
            segment(file_id)?,
            "view",
        ];
        let response = self.send_raw(self.request(Method::GET, &path)).await?;
        Ok(response.bytes().await?.to_vec())
    }

    fn file_view_url(&self, bucket_id: &str, file_id: &str) -> String {
        let mut url = self.url(&["storage", "buckets", bucket_id, "files", file_id, "view"]);
        url.query_pairs_mut().append_pair("project", &self.project_id);
        url.into()
    }

    async fn create_user(
        &self,
        user_id: &str,
        email: &str,
        phone: Option<&str>,
        name: &str,
    ) -> BackendResult<User> {
        let body = json!({
            "userId": user_id,
            "email": email,
            "phone": phone,
            "name": name,
        });
        self.send(self.request(Method::POST, &["users"]).json(&body)).await
    }

    async fn get_user(&self, user_id: &str) -> BackendResult<User> {
        self.send(self.request(Method::GET, &["users", segment(user_id)?]))
            .await
    }

    async fn list_users_by_email(&self, email: &str) -> BackendResult<Vec<User>> {
        let builder = self
            .request(Method::GET, &["users"])
            .query(&query_params(&[Query::equal("email", email)]));
        let list: UserList = self.send(builder).await?;
        Ok(list.users)
    }

    async fn send_sms(
        &self,
        message_id: &str,
        content: &str,
        user_ids: &[String],
    ) -> BackendResult<Message> {
        let body = json!({
            "messageId": message_id,
            "content": content,
            "topics": [],
            "users": user_ids,
        });
        self.send(self.request(Method::POST, &["messaging", "messages", "sms"]).json(&body))
            .await
    }
}
