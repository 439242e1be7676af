use rusqlite::Connection;

use crate::errors::SqlBenchError;

/// Name of the covering index the optimized demo variant leans on.
pub const RATING_INDEX: &str = "idx_ratings_book_id";

/// Create the fixture tables. Embeddings are JSON arrays of floats stored
/// as TEXT; similarity search over them belongs to the external engine, not
/// this crate.
pub fn ensure_schema(conn: &Connection) -> Result<(), SqlBenchError> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;
        CREATE TABLE IF NOT EXISTS books (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            title     TEXT NOT NULL,
            embedding TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS ratings (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            book_id INTEGER NOT NULL REFERENCES books(id),
            rating  INTEGER NOT NULL,
            ts      INTEGER NOT NULL
        );
        "#,
    )
    .map_err(|e| SqlBenchError::schema(e.to_string()))
}

/// Apply the optimization the demo is about: without this index both demo
/// variants scan ratings per book.
pub fn ensure_rating_index(conn: &Connection) -> Result<(), SqlBenchError> {
    conn.execute_batch(&format!(
        "CREATE INDEX IF NOT EXISTS {RATING_INDEX} ON ratings(book_id, rating);"
    ))
    .map_err(|e| SqlBenchError::schema(e.to_string()))
}

pub fn drop_rating_index(conn: &Connection) -> Result<(), SqlBenchError> {
    conn.execute_batch(&format!("DROP INDEX IF EXISTS {RATING_INDEX};"))
        .map_err(|e| SqlBenchError::schema(e.to_string()))
}

/// Drop the fixture tables and index.
pub fn teardown(conn: &Connection) -> Result<(), SqlBenchError> {
    conn.execute_batch(&format!(
        r#"
        DROP INDEX IF EXISTS {RATING_INDEX};
        DROP TABLE IF EXISTS ratings;
        DROP TABLE IF EXISTS books;
        "#
    ))
    .map_err(|e| SqlBenchError::schema(e.to_string()))
}
