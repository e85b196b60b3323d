//! Document collection operations.

use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};

use super::{constraint_aware, now_timestamp, Database, DbError, DbResult};
use crate::backend::Document;

/// Raw row before the JSON body is parsed.
struct DocumentRow {
    id: String,
    data: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> DbResult<Self> {
        let data: Map<String, Value> = serde_json::from_str(&row.data)?;
        Ok(Document {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            data,
        })
    }
}

/// Strip `$`-prefixed system fields from a body before storing it.
fn body_fields(data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl Database {
    /// Insert a new document.
    pub fn insert_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: &Map<String, Value>,
    ) -> DbResult<Document> {
        let body = body_fields(data);
        let now = now_timestamp();

        self.conn
            .execute(
                r#"
                INSERT INTO documents (
                    database_id, collection_id, id, data, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                "#,
                params![
                    database_id,
                    collection_id,
                    document_id,
                    serde_json::to_string(&body)?,
                    now,
                ],
            )
            .map_err(constraint_aware)?;

        Ok(Document {
            id: document_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
            data: body,
        })
    }

    /// Get a document by ID.
    pub fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> DbResult<Option<Document>> {
        self.conn
            .query_row(
                r#"
                SELECT id, data, created_at, updated_at
                FROM documents
                WHERE database_id = ?1 AND collection_id = ?2 AND id = ?3
                "#,
                params![database_id, collection_id, document_id],
                |row| {
                    Ok(DocumentRow {
                        id: row.get(0)?,
                        data: row.get(1)?,
                        created_at: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List every document in a collection, in insertion order.
    pub fn list_documents(&self, database_id: &str, collection_id: &str) -> DbResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, data, created_at, updated_at
            FROM documents
            WHERE database_id = ?1 AND collection_id = ?2
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![database_id, collection_id], |row| {
            Ok(DocumentRow {
                id: row.get(0)?,
                data: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?.try_into()?);
        }
        Ok(documents)
    }

    /// Merge `patch` into an existing document's body.
    pub fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        patch: &Map<String, Value>,
    ) -> DbResult<Document> {
        let mut document = self
            .get_document(database_id, collection_id, document_id)?
            .ok_or_else(|| DbError::NotFound(format!("document {}", document_id)))?;

        for (key, value) in body_fields(patch) {
            document.data.insert(key, value);
        }
        document.updated_at = now_timestamp();

        self.conn.execute(
            r#"
            UPDATE documents SET data = ?4, updated_at = ?5
            WHERE database_id = ?1 AND collection_id = ?2 AND id = ?3
            "#,
            params![
                database_id,
                collection_id,
                document_id,
                serde_json::to_string(&document.data)?,
                document.updated_at,
            ],
        )?;

        Ok(document)
    }
}
