//! Repeated-measurement benchmarking for competing SQL query variants.
//!
//! sqlbench times two or more semantically equivalent queries against a live
//! SQLite connection and reports how the rewrites compare to the original.
//! Every variant runs the same number of iterations on the same connection,
//! so the numbers answer one question: did the rewrite help?
//!
//! # Features
//!
//! - **Repeated measurement**: N timed runs per variant with optional warmup
//!   runs and an inter-run delay
//! - **Full materialization**: every run drains the result set, so fetch cost
//!   is part of the measurement
//! - **Comparison reports**: per-variant summaries plus a fixed-order metric
//!   table with improvement percentages, as text or JSON
//! - **Failure isolation**: a failed run is recorded and skipped by the
//!   statistics; a lost connection aborts the session with partial results
//! - **Demo workload**: a deterministic bookstore fixture with a slow query
//!   and its optimized rewrite
//! - **Baseline gating**: record summaries to a JSON file and fail when a
//!   later run regresses past a tolerance
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sqlbench::{BenchConfig, BenchmarkRunner, SqliteExecutor, bookstore};
//!
//! fn main() -> Result<(), sqlbench::SqlBenchError> {
//!     let executor = SqliteExecutor::open_in_memory()?;
//!     bookstore::schema::ensure_schema(executor.connection())?;
//!     bookstore::seed::seed_fixture(executor.connection(), &Default::default())?;
//!
//!     let runner = BenchmarkRunner::new(BenchConfig::with_iterations(10));
//!     let report = runner.run(executor, &bookstore::queries::demo_pair())?;
//!     print!("{}", report.render_text());
//!     Ok(())
//! }
//! ```
//!
//! Criterion benchmarks for the demo pair live under `benches/`; run them
//! with `cargo bench` and inspect the HTML reports under `target/criterion`.
//!
//! The SQLite executor and the bookstore fixture compile in through the
//! `sqlite-backend` feature (on by default); without it the crate keeps
//! only the engine-agnostic measuring core.

// Core public modules
pub mod baseline;
pub mod cli;
pub mod errors;
pub mod executor;
pub mod report;
pub mod runner;
pub mod stats;
pub mod variant;
pub mod workload;

// The SQLite backend and its demo fixture
#[cfg(feature = "sqlite-backend")]
pub mod bookstore;

// Re-export error types
pub use errors::SqlBenchError;

// Re-export the execution seam
pub use executor::{ExecError, QueryExecutor};
#[cfg(feature = "sqlite-backend")]
pub use executor::SqliteExecutor;

// Re-export report and summary types
pub use report::{
    Comparison, ComparisonReport, Improvement, MetricRow, RunOutcome, RunRecord, SessionStatus,
    VariantReport,
};
pub use stats::VariantSummary;

// Re-export the runner and its configuration
pub use runner::{BenchmarkRunner, CancelToken};
pub use variant::{BenchConfig, QueryVariant};

// Re-export the sustained-load helper
pub use workload::{WorkloadConfig, WorkloadProgress, WorkloadStats, run_workload};

// Re-export command-line parsing for the binary
pub use cli::CommandLineConfig;
