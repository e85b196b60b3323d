//! Message outbox operations.

use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{constraint_aware, now_timestamp, Database, DbResult};

/// A message recorded by the local backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboxMessage {
    pub id: String,
    pub content: String,
    pub user_ids: Vec<String>,
    pub created_at: String,
}

impl Database {
    /// Record an outgoing message.
    pub fn insert_message(&self, id: &str, content: &str, user_ids: &[String]) -> DbResult<OutboxMessage> {
        let created_at = now_timestamp();
        self.conn
            .execute(
                "INSERT INTO messages (id, content, user_ids, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, content, serde_json::to_string(user_ids)?, created_at],
            )
            .map_err(constraint_aware)?;

        Ok(OutboxMessage {
            id: id.to_string(),
            content: content.to_string(),
            user_ids: user_ids.to_vec(),
            created_at,
        })
    }

    /// List recorded messages, oldest first.
    pub fn list_messages(&self) -> DbResult<Vec<OutboxMessage>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, content, user_ids, created_at FROM messages ORDER BY rowid")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, content, user_ids, created_at) = row?;
            messages.push(OutboxMessage {
                id,
                content,
                user_ids: serde_json::from_str(&user_ids)?,
                created_at,
            });
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_list() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message("m1", "Hello", &["u1".to_string()]).unwrap();
        db.insert_message("m2", "Again", &["u1".to_string(), "u2".to_string()])
            .unwrap();

        let messages = db.list_messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[1].user_ids, vec!["u1", "u2"]);
    }
}
