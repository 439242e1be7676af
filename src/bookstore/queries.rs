//! The demo comparison pair: one top-books query written with correlated
//! subqueries and the same query rewritten as a join with grouping. Both
//! return identical rows over any fixture because the ordering ends with
//! the book id as a tiebreaker.

use rusqlite::Connection;

use crate::errors::SqlBenchError;
use crate::variant::QueryVariant;

pub const SLOW_TOP_BOOKS_SQL: &str = "\
SELECT b.id, b.title, \
       (SELECT AVG(r.rating) FROM ratings r WHERE r.book_id = b.id) AS avg_rating, \
       (SELECT COUNT(*) FROM ratings r WHERE r.book_id = b.id) AS num_ratings \
FROM books b \
WHERE (SELECT COUNT(*) FROM ratings r WHERE r.book_id = b.id) >= 3 \
ORDER BY avg_rating DESC, num_ratings DESC, b.id ASC \
LIMIT 10";

pub const OPTIMIZED_TOP_BOOKS_SQL: &str = "\
SELECT b.id, b.title, AVG(r.rating) AS avg_rating, COUNT(r.id) AS num_ratings \
FROM books b \
JOIN ratings r ON r.book_id = b.id \
GROUP BY b.id, b.title \
HAVING COUNT(r.id) >= 3 \
ORDER BY avg_rating DESC, num_ratings DESC, b.id ASC \
LIMIT 10";

/// The stock comparison: original query first, rewrite second.
pub fn demo_pair() -> Vec<QueryVariant> {
    vec![
        QueryVariant::new("Original", SLOW_TOP_BOOKS_SQL),
        QueryVariant::new("Optimized", OPTIMIZED_TOP_BOOKS_SQL),
    ]
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixtureStats {
    pub books: i64,
    pub ratings: i64,
    /// None until at least one rating exists.
    pub avg_rating: Option<f64>,
}

pub fn fixture_stats(conn: &Connection) -> Result<FixtureStats, SqlBenchError> {
    let books: i64 = conn
        .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
        .map_err(|e| SqlBenchError::query(e.to_string()))?;
    let ratings: i64 = conn
        .query_row("SELECT COUNT(*) FROM ratings", [], |row| row.get(0))
        .map_err(|e| SqlBenchError::query(e.to_string()))?;
    let avg_rating: Option<f64> = conn
        .query_row("SELECT AVG(rating) FROM ratings", [], |row| row.get(0))
        .map_err(|e| SqlBenchError::query(e.to_string()))?;
    Ok(FixtureStats {
        books,
        ratings,
        avg_rating,
    })
}
