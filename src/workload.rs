//! Sustained single-query workload, the load half of the demo: drive the
//! slow query long enough for server-side analysis to notice it.

use std::{
    thread,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::{
    errors::SqlBenchError, executor::QueryExecutor, stats::duration_ms, variant::QueryVariant,
};

/// Knobs for one workload run.
pub struct WorkloadConfig {
    pub iterations: u32,
    /// Sleep after each query.
    pub delay: Duration,
    /// Emit a progress event every this many attempts; 0 disables progress.
    pub progress_every: u32,
    pub progress_callback: Option<Box<dyn Fn(WorkloadProgress) + Send + Sync>>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            delay: Duration::from_millis(100),
            progress_every: 100,
            progress_callback: None,
        }
    }
}

/// Running state at a progress checkpoint. The average is over all attempts
/// so far, failed ones included.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkloadProgress {
    pub completed: u32,
    pub total: u32,
    pub avg_time_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkloadStats {
    pub successful: u32,
    pub failed: u32,
    pub total_time_ms: f64,
    /// Average over successful runs only; 0 when none succeeded.
    pub avg_time_ms: f64,
}

impl WorkloadStats {
    pub fn success_rate(&self) -> f64 {
        let attempts = self.successful + self.failed;
        if attempts == 0 {
            0.0
        } else {
            self.successful as f64 / attempts as f64 * 100.0
        }
    }
}

/// Run `variant` for `config.iterations` attempts in sequence.
///
/// Per-run query errors count as failed attempts and the loop continues; a
/// connection-level error aborts the workload with an error.
pub fn run_workload<E: QueryExecutor>(
    executor: &mut E,
    variant: &QueryVariant,
    config: &WorkloadConfig,
) -> Result<WorkloadStats, SqlBenchError> {
    if config.iterations == 0 {
        return Err(SqlBenchError::invalid_input("iterations must be positive"));
    }
    if variant.sql.trim().is_empty() {
        return Err(SqlBenchError::invalid_input(format!(
            "variant {} has no query text",
            variant.name
        )));
    }

    let mut successful = 0u32;
    let mut failed = 0u32;
    let mut total_time_ms = 0.0f64;
    for attempt in 1..=config.iterations {
        let started = Instant::now();
        match executor.execute(&variant.sql, None) {
            Ok(_rows) => {
                total_time_ms += duration_ms(started.elapsed());
                successful += 1;
            }
            Err(err) if err.is_fatal() => {
                return Err(SqlBenchError::connection(err.message().to_string()));
            }
            Err(_) => failed += 1,
        }
        if config.progress_every > 0 && attempt % config.progress_every == 0 {
            if let Some(callback) = &config.progress_callback {
                callback(WorkloadProgress {
                    completed: attempt,
                    total: config.iterations,
                    avg_time_ms: total_time_ms / attempt as f64,
                });
            }
        }
        if attempt < config.iterations && !config.delay.is_zero() {
            thread::sleep(config.delay);
        }
    }

    let avg_time_ms = if successful > 0 {
        total_time_ms / successful as f64
    } else {
        0.0
    };
    Ok(WorkloadStats {
        successful,
        failed,
        total_time_ms,
        avg_time_ms,
    })
}
