#![cfg(feature = "sqlite-backend")]

use rusqlite::Connection;
use sqlbench::{
    BenchConfig, BenchmarkRunner, Improvement, SessionStatus, SqliteExecutor,
    bookstore::{
        queries::{self, OPTIMIZED_TOP_BOOKS_SQL, SLOW_TOP_BOOKS_SQL},
        schema,
        seed::{SeedConfig, seed_fixture},
    },
};

fn small_seed() -> SeedConfig {
    SeedConfig {
        seed: 7,
        books: 30,
        users: 10,
        ratings: 300,
        embedding_dim: 8,
    }
}

fn seeded_connection(config: &SeedConfig) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    schema::ensure_schema(&conn).unwrap();
    seed_fixture(&conn, config).unwrap();
    conn
}

fn table_exists(conn: &Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        > 0
}

fn index_exists(conn: &Connection, name: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?1",
        [name],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        > 0
}

fn top_books(conn: &Connection, sql: &str) -> Vec<(i64, String, f64, i64)> {
    let mut stmt = conn.prepare(sql).unwrap();
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .unwrap();
    rows.map(|row| row.unwrap()).collect()
}

#[test]
fn test_schema_creates_tables_and_index() {
    let conn = Connection::open_in_memory().unwrap();
    schema::ensure_schema(&conn).unwrap();
    assert!(table_exists(&conn, "books"));
    assert!(table_exists(&conn, "ratings"));

    schema::ensure_rating_index(&conn).unwrap();
    assert!(index_exists(&conn, schema::RATING_INDEX));

    // Both calls are idempotent.
    schema::ensure_schema(&conn).unwrap();
    schema::ensure_rating_index(&conn).unwrap();

    schema::drop_rating_index(&conn).unwrap();
    assert!(!index_exists(&conn, schema::RATING_INDEX));
}

#[test]
fn test_teardown_removes_fixture() {
    let conn = seeded_connection(&small_seed());
    schema::ensure_rating_index(&conn).unwrap();
    schema::teardown(&conn).unwrap();

    assert!(!table_exists(&conn, "books"));
    assert!(!table_exists(&conn, "ratings"));
    assert!(queries::fixture_stats(&conn).is_err());
}

#[test]
fn test_seed_counts_match_config() {
    let config = small_seed();
    let conn = Connection::open_in_memory().unwrap();
    schema::ensure_schema(&conn).unwrap();
    let report = seed_fixture(&conn, &config).unwrap();
    assert_eq!(report.books, config.books);
    assert_eq!(report.ratings, config.ratings);

    let stats = queries::fixture_stats(&conn).unwrap();
    assert_eq!(stats.books, config.books as i64);
    assert_eq!(stats.ratings, config.ratings as i64);
    let avg = stats.avg_rating.unwrap();
    assert!((1.0..=5.0).contains(&avg));
}

#[test]
fn test_seed_is_deterministic_per_seed() {
    let config = small_seed();
    let a = seeded_connection(&config);
    let b = seeded_connection(&config);

    let books = |conn: &Connection| -> Vec<(String, String)> {
        let mut stmt = conn
            .prepare("SELECT title, embedding FROM books ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();
        rows.map(|row| row.unwrap()).collect()
    };
    assert_eq!(books(&a), books(&b));

    // Timestamps track the wall clock, so compare everything but `ts`.
    let ratings = |conn: &Connection| -> Vec<(i64, i64, i64)> {
        let mut stmt = conn
            .prepare("SELECT user_id, book_id, rating FROM ratings ORDER BY id")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .unwrap();
        rows.map(|row| row.unwrap()).collect()
    };
    assert_eq!(ratings(&a), ratings(&b));
}

#[test]
fn test_different_seeds_produce_different_fixtures() {
    let mut other = small_seed();
    other.seed = 8;
    let a = seeded_connection(&small_seed());
    let b = seeded_connection(&other);

    let titles = |conn: &Connection| -> Vec<String> {
        let mut stmt = conn.prepare("SELECT title FROM books ORDER BY id").unwrap();
        let rows = stmt.query_map([], |row| row.get(0)).unwrap();
        rows.map(|row| row.unwrap()).collect()
    };
    assert_ne!(titles(&a), titles(&b));
}

#[test]
fn test_seed_rejects_empty_pools() {
    let conn = Connection::open_in_memory().unwrap();
    schema::ensure_schema(&conn).unwrap();

    let mut config = small_seed();
    config.books = 0;
    assert!(seed_fixture(&conn, &config).is_err());

    let mut config = small_seed();
    config.users = 0;
    assert!(seed_fixture(&conn, &config).is_err());

    let mut config = small_seed();
    config.embedding_dim = 0;
    assert!(seed_fixture(&conn, &config).is_err());
}

#[test]
fn test_embeddings_are_json_vectors_of_requested_length() {
    let config = small_seed();
    let conn = seeded_connection(&config);
    let embedding: String = conn
        .query_row("SELECT embedding FROM books WHERE id=1", [], |row| {
            row.get(0)
        })
        .unwrap();
    let values: Vec<f64> = serde_json::from_str(&embedding).unwrap();
    assert_eq!(values.len(), config.embedding_dim);
    assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
}

#[test]
fn test_ratings_stay_in_star_range_and_reference_books() {
    let conn = seeded_connection(&small_seed());
    let out_of_range: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM ratings WHERE rating < 1 OR rating > 5",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(out_of_range, 0);

    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM ratings r LEFT JOIN books b ON b.id = r.book_id \
             WHERE b.id IS NULL",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn test_demo_pair_queries_return_identical_rows() {
    let conn = seeded_connection(&small_seed());
    schema::ensure_rating_index(&conn).unwrap();

    let slow = top_books(&conn, SLOW_TOP_BOOKS_SQL);
    let optimized = top_books(&conn, OPTIMIZED_TOP_BOOKS_SQL);
    assert!(!slow.is_empty());
    assert!(slow.len() <= 10);
    assert_eq!(slow, optimized);
}

#[test]
fn test_benchmark_end_to_end_on_seeded_fixture() {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    schema::ensure_schema(executor.connection()).unwrap();
    seed_fixture(executor.connection(), &small_seed()).unwrap();
    schema::ensure_rating_index(executor.connection()).unwrap();

    let report = BenchmarkRunner::new(BenchConfig::with_iterations(3))
        .run(executor, &queries::demo_pair())
        .unwrap();

    assert_eq!(report.status, SessionStatus::Completed);
    assert_eq!(report.variants.len(), 2);
    let summaries = report.summaries();
    assert_eq!(summaries.len(), 2);
    for summary in &summaries {
        assert_eq!(summary.completed_runs, 3);
        assert_eq!(summary.failed_runs, 0);
        assert!(summary.min_time_ms <= summary.max_time_ms);
    }
    // Equivalent variants return the same rows, so the row metric is a wash.
    let comparison = &report.comparisons[0];
    assert_eq!(comparison.rows[5].metric, "Avg Rows");
    assert_eq!(comparison.rows[5].improvement, Improvement::Percent(0.0));
}
