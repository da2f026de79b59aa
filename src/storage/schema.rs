//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Kumo-Press
//! database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Extracted article records, one row per canonical URL
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    content TEXT,
    url TEXT NOT NULL UNIQUE,
    published_date TEXT,
    source TEXT,
    fetched_at TEXT,
    tags TEXT
);

CREATE INDEX IF NOT EXISTS idx_articles_url ON articles(url);
CREATE INDEX IF NOT EXISTS idx_articles_source ON articles(source);
CREATE INDEX IF NOT EXISTS idx_articles_published ON articles(published_date);

-- Durable tier of the response cache, keyed by URL digest
CREATE TABLE IF NOT EXISTS request_cache (
    key_hash TEXT PRIMARY KEY,
    url TEXT UNIQUE,
    payload TEXT,
    stored_at TEXT
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Gets the current schema version
///
/// This can be used for future migrations if the schema changes.
pub fn get_schema_version() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["articles", "request_cache"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_url_uniqueness_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        conn.execute(
            "INSERT INTO articles (title, url) VALUES ('a', 'https://example.com/x')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO articles (title, url) VALUES ('b', 'https://example.com/x')",
            [],
        );
        assert!(dup.is_err());
    }
}
