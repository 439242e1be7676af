use std::{fs, path::Path, time::Duration};

use ahash::AHashSet;

use crate::errors::SqlBenchError;

/// One named SQL query text under comparison. Immutable once defined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryVariant {
    pub name: String,
    pub sql: String,
}

impl QueryVariant {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, sql: S) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// Load a variant from a `.sql` file. Blank lines and `--` comment lines
    /// are dropped; the remaining lines are joined with single spaces.
    pub fn from_sql_file<N: Into<String>, P: AsRef<Path>>(
        name: N,
        path: P,
    ) -> Result<Self, SqlBenchError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            SqlBenchError::invalid_input(format!("cannot read query file {}: {e}", path.display()))
        })?;
        let sql = strip_sql_comments(&raw);
        if sql.is_empty() {
            return Err(SqlBenchError::invalid_input(format!(
                "query file {} contains no statement",
                path.display()
            )));
        }
        Ok(Self {
            name: name.into(),
            sql,
        })
    }
}

/// Drop blank lines and `--` comment lines, joining the rest with spaces.
pub fn strip_sql_comments(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("--"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Knobs for one benchmark session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchConfig {
    /// Timed runs per variant. Must be positive.
    pub iterations: u32,
    /// Untimed runs before measurement begins.
    pub warmup: u32,
    /// Sleep between consecutive timed runs of a variant.
    pub inter_run_delay: Duration,
    /// Per-query deadline; an interrupted run counts as a failed run.
    pub query_timeout: Option<Duration>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            warmup: 0,
            inter_run_delay: Duration::ZERO,
            query_timeout: None,
        }
    }
}

impl BenchConfig {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// Reject bad sessions before any query is issued.
    pub fn validate(&self, variants: &[QueryVariant]) -> Result<(), SqlBenchError> {
        if self.iterations == 0 {
            return Err(SqlBenchError::invalid_input("iterations must be positive"));
        }
        if variants.is_empty() {
            return Err(SqlBenchError::invalid_input("variant list is empty"));
        }
        let mut seen = AHashSet::with_capacity(variants.len());
        for variant in variants {
            if variant.name.trim().is_empty() {
                return Err(SqlBenchError::invalid_input("variant name is empty"));
            }
            if variant.sql.trim().is_empty() {
                return Err(SqlBenchError::invalid_input(format!(
                    "variant {} has no query text",
                    variant.name
                )));
            }
            if !seen.insert(variant.name.as_str()) {
                return Err(SqlBenchError::invalid_input(format!(
                    "duplicate variant name {}",
                    variant.name
                )));
            }
        }
        Ok(())
    }
}
