use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Convert an elapsed [`Duration`] to fractional milliseconds.
pub fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

/// Aggregate statistics over one variant's completed runs.
///
/// All duration fields are in milliseconds. The standard deviation uses the
/// sample (n-1) estimator; a single completed run reports a deviation of
/// zero rather than not-applicable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantSummary {
    pub name: String,
    pub completed_runs: u32,
    pub failed_runs: u32,
    pub avg_time_ms: f64,
    pub median_time_ms: f64,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
    pub std_dev_ms: f64,
    pub avg_rows: f64,
}

impl VariantSummary {
    /// Build a summary from the completed measurements of one variant.
    ///
    /// `durations_ms` and `rows` are parallel slices, one entry per
    /// completed run. Returns `None` when no run completed; failed runs are
    /// then only visible in the raw run log.
    pub fn from_measurements(
        name: &str,
        durations_ms: &[f64],
        rows: &[f64],
        failed_runs: u32,
    ) -> Option<Self> {
        if durations_ms.is_empty() {
            return None;
        }
        let min = fold_min(durations_ms);
        let max = fold_max(durations_ms);
        Some(Self {
            name: name.to_string(),
            completed_runs: durations_ms.len() as u32,
            failed_runs,
            avg_time_ms: mean(durations_ms),
            median_time_ms: median(durations_ms),
            min_time_ms: min,
            max_time_ms: max,
            std_dev_ms: sample_std_dev(durations_ms),
            avg_rows: mean(rows),
        })
    }

    pub fn total_runs(&self) -> u32 {
        self.completed_runs + self.failed_runs
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median with the two middle values averaged for an even count.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Sample (n-1) standard deviation; 0.0 for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values
        .iter()
        .map(|value| {
            let delta = value - avg;
            delta * delta
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

fn fold_min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn fold_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
