//! Identity store operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{constraint_aware, now_timestamp, Database, DbResult};
use crate::models::User;

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
    })
}

impl Database {
    /// Insert a new user. Email and phone must be unused.
    pub fn insert_user(&self, user: &User) -> DbResult<()> {
        let now = now_timestamp();
        self.conn
            .execute(
                r#"
                INSERT INTO users (id, name, email, phone, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                "#,
                params![user.id, user.name, user.email, user.phone, now],
            )
            .map_err(constraint_aware)?;
        Ok(())
    }

    /// Get a user by ID.
    pub fn get_user(&self, user_id: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT id, name, email, phone FROM users WHERE id = ?",
                [user_id],
                user_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Find users registered under an email address.
    pub fn find_users_by_email(&self, email: &str) -> DbResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, phone FROM users WHERE email = ? ORDER BY created_at")?;
        let rows = stmt.query_map([email], user_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn user(id: &str, email: &str, phone: Option<&str>) -> User {
        User {
            id: id.into(),
            name: "Riya".into(),
            email: email.into(),
            phone: phone.map(Into::into),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        db.insert_user(&user("u1", "riya@example.com", Some("+15555550100")))
            .unwrap();

        let fetched = db.get_user("u1").unwrap().unwrap();
        assert_eq!(fetched.email, "riya@example.com");
        assert_eq!(fetched.phone.as_deref(), Some("+15555550100"));
        assert!(db.get_user("u2").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_constraint() {
        let db = setup_db();
        db.insert_user(&user("u1", "riya@example.com", None)).unwrap();
        let result = db.insert_user(&user("u2", "riya@example.com", None));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_duplicate_phone_is_constraint() {
        let db = setup_db();
        db.insert_user(&user("u1", "a@example.com", Some("+15555550100")))
            .unwrap();
        let result = db.insert_user(&user("u2", "b@example.com", Some("+15555550100")));
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_find_by_email() {
        let db = setup_db();
        db.insert_user(&user("u1", "riya@example.com", None)).unwrap();
        db.insert_user(&user("u2", "manya@example.com", None)).unwrap();

        let found = db.find_users_by_email("manya@example.com").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "u2");
        assert!(db.find_users_by_email("nobody@example.com").unwrap().is_empty());
    }
}
