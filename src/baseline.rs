//! Opt-in persistence of benchmark summaries and regression gates over
//! them, so a tuned query can be held to its recorded numbers.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{errors::SqlBenchError, stats::VariantSummary};

static BASELINE_FILE_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Point baseline persistence at an explicit file for the rest of the
/// process. Takes precedence over `SQLBENCH_BASELINE_FILE`.
pub fn set_baseline_file_path(path: PathBuf) {
    *BASELINE_FILE_OVERRIDE.lock() = Some(path);
}

pub fn clear_baseline_file_path() {
    *BASELINE_FILE_OVERRIDE.lock() = None;
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BaselineEntry {
    pub name: String,
    pub avg_time_ms: f64,
    pub median_time_ms: f64,
    pub runs: u32,
    pub recorded_unix: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BaselineComparison {
    pub name: String,
    pub baseline_avg_ms: f64,
    pub current_avg_ms: f64,
    pub delta_ms: f64,
    pub improved: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum GateResult {
    Pass,
    Fail { reason: String },
}

/// Store `summary` under its variant name, replacing any previous entry.
pub fn record_baseline(summary: &VariantSummary) -> Result<(), SqlBenchError> {
    let path = baseline_file();
    let mut entries = load_entries_from(&path)?;
    entries.retain(|entry| entry.name != summary.name);
    entries.push(BaselineEntry {
        name: summary.name.clone(),
        avg_time_ms: summary.avg_time_ms,
        median_time_ms: summary.median_time_ms,
        runs: summary.completed_runs,
        recorded_unix: unix_now(),
    });
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    let data = serde_json::to_vec_pretty(&entries)
        .map_err(|e| SqlBenchError::invalid_input(e.to_string()))?;
    fs::write(&path, data).map_err(|e| {
        SqlBenchError::invalid_input(format!("cannot write baseline file {}: {e}", path.display()))
    })
}

pub fn load_baselines() -> Result<Vec<BaselineEntry>, SqlBenchError> {
    load_entries_from(&baseline_file())
}

pub fn compare_to_baseline(summary: &VariantSummary) -> Result<BaselineComparison, SqlBenchError> {
    let baseline = find_entry(&summary.name)?;
    let delta = summary.avg_time_ms - baseline.avg_time_ms;
    Ok(BaselineComparison {
        name: summary.name.clone(),
        baseline_avg_ms: baseline.avg_time_ms,
        current_avg_ms: summary.avg_time_ms,
        delta_ms: delta,
        improved: delta <= 0.0,
    })
}

/// Gate: fail when the current mean exceeds the stored baseline mean by
/// more than `tolerance` (a fraction; 0.2 allows +20%).
pub fn check_regression(
    summary: &VariantSummary,
    tolerance: f64,
) -> Result<GateResult, SqlBenchError> {
    if tolerance < 0.0 || tolerance.is_nan() {
        return Err(SqlBenchError::invalid_input(
            "tolerance must be non-negative",
        ));
    }
    let baseline = find_entry(&summary.name)?;
    let allowed = baseline.avg_time_ms * (1.0 + tolerance);
    if summary.avg_time_ms > allowed {
        return Ok(GateResult::Fail {
            reason: format!(
                "avg {:.2}ms exceeds baseline {:.2}ms by more than {:.0}%",
                summary.avg_time_ms,
                baseline.avg_time_ms,
                tolerance * 100.0
            ),
        });
    }
    Ok(GateResult::Pass)
}

fn find_entry(name: &str) -> Result<BaselineEntry, SqlBenchError> {
    load_baselines()?
        .into_iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| SqlBenchError::not_found(format!("baseline entry {name}")))
}

fn baseline_file() -> PathBuf {
    if let Some(path) = BASELINE_FILE_OVERRIDE.lock().clone() {
        return path;
    }
    if let Ok(path) = env::var("SQLBENCH_BASELINE_FILE") {
        return PathBuf::from(path);
    }
    Path::new("sqlbench_baseline.json").to_path_buf()
}

fn load_entries_from(path: &Path) -> Result<Vec<BaselineEntry>, SqlBenchError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read(path).map_err(|e| {
        SqlBenchError::invalid_input(format!("cannot read baseline file {}: {e}", path.display()))
    })?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&data).map_err(|e| SqlBenchError::invalid_input(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
