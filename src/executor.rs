//! The seam between the benchmark loop and a live database connection.
//!
//! [`QueryExecutor`] keeps the runner independent of any one engine while
//! preserving the error split the loop depends on: per-run query failures
//! are recoverable, connection-level failures are not. The bundled
//! `SqliteExecutor` implements the trait over a `rusqlite` connection; the
//! `sqlite-backend` Cargo feature (enabled by default) keeps it compiled in.

use std::time::Duration;
#[cfg(feature = "sqlite-backend")]
use std::{path::Path, time::Instant};

#[cfg(feature = "sqlite-backend")]
use rusqlite::{Connection, ErrorCode};

#[cfg(feature = "sqlite-backend")]
use crate::errors::SqlBenchError;

/// Why a query execution failed.
///
/// `Query` covers anything local to one run (bad SQL, constraint violation,
/// interrupt from a configured timeout); the loop records it and moves on.
/// `Connection` means the handle itself is unusable and further runs are
/// meaningless.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecError {
    Query { message: String },
    Connection { message: String },
}

impl ExecError {
    pub fn message(&self) -> &str {
        match self {
            ExecError::Query { message } | ExecError::Connection { message } => message,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Connection { .. })
    }
}

/// Executes one SQL statement at a time against an exclusively owned
/// connection.
///
/// Implementations must not return from [`execute`](Self::execute) until the
/// full result set has been materialized; the runner stops its clock on
/// return, so an executor that yields after the first row would understate
/// latency.
pub trait QueryExecutor {
    /// Execute `sql` to full materialization and return the row count.
    fn execute(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64, ExecError>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &mut E {
    fn execute(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64, ExecError> {
        (**self).execute(sql, timeout)
    }
}

/// [`QueryExecutor`] over a SQLite connection.
///
/// Owns the connection; dropping the executor releases it. A configured
/// timeout is enforced with a progress handler that interrupts the statement
/// once the deadline passes, surfacing as a per-run query error.
#[cfg(feature = "sqlite-backend")]
pub struct SqliteExecutor {
    conn: Connection,
}

#[cfg(feature = "sqlite-backend")]
impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SqlBenchError> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| SqlBenchError::connection(e.to_string()))?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self, SqlBenchError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SqlBenchError::connection(e.to_string()))?;
        Ok(Self::new(conn))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

#[cfg(feature = "sqlite-backend")]
impl QueryExecutor for SqliteExecutor {
    fn execute(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64, ExecError> {
        if let Some(limit) = timeout {
            let deadline = Instant::now() + limit;
            self.conn
                .progress_handler(100, Some(move || Instant::now() >= deadline));
        }
        let result = drain_rows(&self.conn, sql);
        if timeout.is_some() {
            self.conn.progress_handler(0, None::<fn() -> bool>);
        }
        result
    }
}

/// Step the statement to exhaustion so the caller's clock covers the whole
/// result set, not just the first row.
#[cfg(feature = "sqlite-backend")]
fn drain_rows(conn: &Connection, sql: &str) -> Result<u64, ExecError> {
    let mut stmt = conn.prepare(sql).map_err(classify)?;
    let mut rows = stmt.query([]).map_err(classify)?;
    let mut count = 0u64;
    loop {
        match rows.next() {
            Ok(Some(_)) => count += 1,
            Ok(None) => break,
            Err(e) => return Err(classify(e)),
        }
    }
    Ok(count)
}

#[cfg(feature = "sqlite-backend")]
fn classify(err: rusqlite::Error) -> ExecError {
    let fatal = match &err {
        rusqlite::Error::SqliteFailure(code, _) => matches!(
            code.code,
            ErrorCode::CannotOpen | ErrorCode::NotADatabase | ErrorCode::DatabaseCorrupt
        ),
        _ => false,
    };
    if fatal {
        ExecError::Connection {
            message: err.to_string(),
        }
    } else {
        ExecError::Query {
            message: err.to_string(),
        }
    }
}

#[cfg(all(test, feature = "sqlite-backend"))]
mod tests {
    use super::*;

    #[test]
    fn test_counts_rows_after_full_materialization() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor
            .connection()
            .execute_batch("CREATE TABLE t(x INTEGER); INSERT INTO t VALUES (1), (2), (3);")
            .unwrap();
        let rows = executor.execute("SELECT x FROM t", None).unwrap();
        assert_eq!(rows, 3);
    }

    #[test]
    fn test_bad_sql_is_a_query_error() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        let err = executor.execute("SELEC nonsense", None).unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, ExecError::Query { .. }));
    }

    #[test]
    fn test_timeout_clears_handler_for_later_runs() {
        let mut executor = SqliteExecutor::open_in_memory().unwrap();
        executor
            .connection()
            .execute_batch("CREATE TABLE t(x INTEGER); INSERT INTO t VALUES (1);")
            .unwrap();
        // Generous deadline: the statement should finish long before it.
        let rows = executor
            .execute("SELECT x FROM t", Some(Duration::from_secs(30)))
            .unwrap();
        assert_eq!(rows, 1);
        let rows = executor.execute("SELECT x FROM t", None).unwrap();
        assert_eq!(rows, 1);
    }
}
