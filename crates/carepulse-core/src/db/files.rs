//! File bucket operations.

use rusqlite::{params, OptionalExtension};

use super::{constraint_aware, now_timestamp, Database, DbResult};
use crate::backend::{InputFile, StoredFile};

impl Database {
    /// Store a file in a bucket.
    pub fn insert_file(&self, bucket_id: &str, file_id: &str, file: &InputFile) -> DbResult<StoredFile> {
        let size = file.bytes.len() as u64;
        self.conn
            .execute(
                r#"
                INSERT INTO files (bucket_id, id, name, mime_type, size, content, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    bucket_id,
                    file_id,
                    file.file_name,
                    file.content_type,
                    size as i64,
                    file.bytes,
                    now_timestamp(),
                ],
            )
            .map_err(constraint_aware)?;

        Ok(StoredFile {
            id: file_id.to_string(),
            bucket_id: bucket_id.to_string(),
            name: file.file_name.clone(),
            mime_type: file.content_type.clone(),
            size,
        })
    }

    /// Get file metadata.
    pub fn get_file(&self, bucket_id: &str, file_id: &str) -> DbResult<Option<StoredFile>> {
        self.conn
            .query_row(
                "SELECT id, bucket_id, name, mime_type, size FROM files WHERE bucket_id = ?1 AND id = ?2",
                params![bucket_id, file_id],
                |row| {
                    Ok(StoredFile {
                        id: row.get(0)?,
                        bucket_id: row.get(1)?,
                        name: row.get(2)?,
                        mime_type: row.get(3)?,
                        size: row.get::<_, i64>(4)? as u64,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get file content.
    pub fn get_file_content(&self, bucket_id: &str, file_id: &str) -> DbResult<Option<Vec<u8>>> {
        self.conn
            .query_row(
                "SELECT content FROM files WHERE bucket_id = ?1 AND id = ?2",
                params![bucket_id, file_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}
