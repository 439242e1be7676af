//! The sequential benchmark loop.
//!
//! One logical thread drives one exclusively owned executor: variants run
//! one at a time, never interleaved, and each variant's iterations execute
//! in strictly increasing order so cache warm-up effects stay comparable
//! within a variant.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Instant,
};

use crate::{
    errors::SqlBenchError,
    executor::QueryExecutor,
    report::{ComparisonReport, RunOutcome, RunRecord, SessionStatus, VariantReport},
    stats::duration_ms,
    variant::{BenchConfig, QueryVariant},
};

/// Cooperative cancellation shared between the runner and its caller.
///
/// Checked before every run; a cancelled session releases the connection and
/// returns a partial report rather than an error.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Drives a benchmark session over an exclusively owned executor.
pub struct BenchmarkRunner {
    config: BenchConfig,
}

/// Why a variant's loop stopped before finishing its iterations.
enum Interrupt {
    Cancelled,
    ConnectionLost(String),
}

impl BenchmarkRunner {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Benchmark every variant in order and build the comparison report.
    ///
    /// Consumes the executor so the connection is released on every exit
    /// path. Configuration problems are rejected before any query is
    /// issued; runtime outcomes (including a fatal connection failure) land
    /// in the report's [`SessionStatus`] so completed measurements are
    /// never lost.
    pub fn run<E: QueryExecutor>(
        &self,
        executor: E,
        variants: &[QueryVariant],
    ) -> Result<ComparisonReport, SqlBenchError> {
        self.run_with_cancel(executor, variants, &CancelToken::new())
    }

    pub fn run_with_cancel<E: QueryExecutor>(
        &self,
        mut executor: E,
        variants: &[QueryVariant],
        cancel: &CancelToken,
    ) -> Result<ComparisonReport, SqlBenchError> {
        self.config.validate(variants)?;

        let mut sections = Vec::with_capacity(variants.len());
        let mut status = SessionStatus::Completed;
        for variant in variants {
            let (records, interrupt) = self.bench_variant(&mut executor, variant, cancel);
            sections.push(VariantReport::from_records(variant.name.clone(), records));
            match interrupt {
                None => {}
                Some(Interrupt::Cancelled) => {
                    status = SessionStatus::Cancelled;
                    break;
                }
                Some(Interrupt::ConnectionLost(error)) => {
                    status = SessionStatus::Aborted { error };
                    break;
                }
            }
        }

        // Exclusive ownership ends here; the connection is released before
        // the report is assembled.
        drop(executor);
        Ok(ComparisonReport::build(status, sections))
    }

    fn bench_variant<E: QueryExecutor>(
        &self,
        executor: &mut E,
        variant: &QueryVariant,
        cancel: &CancelToken,
    ) -> (Vec<RunRecord>, Option<Interrupt>) {
        let mut records = Vec::with_capacity(self.config.iterations as usize);

        // Warmup runs are untimed and unrecorded; their errors only matter
        // when the connection itself is gone.
        for _ in 0..self.config.warmup {
            if cancel.is_cancelled() {
                return (records, Some(Interrupt::Cancelled));
            }
            if let Err(err) = executor.execute(&variant.sql, self.config.query_timeout) {
                if err.is_fatal() {
                    return (
                        records,
                        Some(Interrupt::ConnectionLost(err.message().to_string())),
                    );
                }
            }
        }

        for run in 1..=self.config.iterations {
            if cancel.is_cancelled() {
                return (records, Some(Interrupt::Cancelled));
            }
            if run > 1 && !self.config.inter_run_delay.is_zero() {
                thread::sleep(self.config.inter_run_delay);
            }
            let started = Instant::now();
            match executor.execute(&variant.sql, self.config.query_timeout) {
                Ok(rows) => {
                    records.push(RunRecord {
                        run,
                        outcome: RunOutcome::Completed {
                            duration_ms: duration_ms(started.elapsed()),
                            rows,
                        },
                    });
                }
                Err(err) => {
                    let message = err.message().to_string();
                    let fatal = err.is_fatal();
                    records.push(RunRecord {
                        run,
                        outcome: RunOutcome::Failed {
                            error: message.clone(),
                        },
                    });
                    if fatal {
                        return (records, Some(Interrupt::ConnectionLost(message)));
                    }
                }
            }
        }
        (records, None)
    }
}
