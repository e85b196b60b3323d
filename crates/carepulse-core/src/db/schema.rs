//! SQLite schema definition.

/// Complete database schema for the local backend.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Identity
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT UNIQUE,                           -- NULL allowed many times
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- ============================================================================
-- Document collections (patients, appointments, ...)
-- ============================================================================

CREATE TABLE IF NOT EXISTS documents (
    database_id TEXT NOT NULL,
    collection_id TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL,                          -- JSON object without system fields
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (database_id, collection_id, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_created
    ON documents(database_id, collection_id, created_at);

-- ============================================================================
-- File storage
-- ============================================================================

CREATE TABLE IF NOT EXISTS files (
    bucket_id TEXT NOT NULL,
    id TEXT NOT NULL,
    name TEXT NOT NULL,
    mime_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    content BLOB NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (bucket_id, id)
);

-- ============================================================================
-- Messaging (outbox; delivery is out of scope locally)
-- ============================================================================

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    user_ids TEXT NOT NULL DEFAULT '[]',         -- JSON array of user IDs
    created_at TEXT NOT NULL
);
"#;
