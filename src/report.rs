//! Session output: run logs, per-variant summaries, and the baseline vs
//! candidate comparison table.

use serde::{Deserialize, Serialize};

use crate::{errors::SqlBenchError, stats::VariantSummary};

pub const METRIC_AVG_TIME: &str = "Avg Time (ms)";
pub const METRIC_MEDIAN_TIME: &str = "Median Time (ms)";
pub const METRIC_MIN_TIME: &str = "Min Time (ms)";
pub const METRIC_MAX_TIME: &str = "Max Time (ms)";
pub const METRIC_STD_DEV: &str = "Std Dev (ms)";
pub const METRIC_AVG_ROWS: &str = "Avg Rows";

/// Comparison rows always appear in this order.
pub const METRIC_ORDER: [&str; 6] = [
    METRIC_AVG_TIME,
    METRIC_MEDIAN_TIME,
    METRIC_MIN_TIME,
    METRIC_MAX_TIME,
    METRIC_STD_DEV,
    METRIC_AVG_ROWS,
];

/// Outcome of one timed run, tagged so failures stay inspectable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed { duration_ms: f64, rows: u64 },
    Failed { error: String },
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// One execution attempt. `run` is the 1-based iteration index within the
/// variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run: u32,
    pub outcome: RunOutcome,
}

/// How a benchmark session ended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SessionStatus {
    Completed,
    Cancelled,
    Aborted { error: String },
}

impl SessionStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }
}

/// Per-variant section of the report: the raw run log plus the derived
/// summary. The summary is absent when no run completed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantReport {
    pub name: String,
    pub runs: Vec<RunRecord>,
    pub summary: Option<VariantSummary>,
}

impl VariantReport {
    pub fn from_records(name: String, runs: Vec<RunRecord>) -> Self {
        let summary = summarize(&name, &runs);
        Self {
            name,
            runs,
            summary,
        }
    }

    pub fn completed_runs(&self) -> u32 {
        self.runs
            .iter()
            .filter(|record| record.outcome.is_completed())
            .count() as u32
    }
}

fn summarize(name: &str, runs: &[RunRecord]) -> Option<VariantSummary> {
    let mut durations = Vec::with_capacity(runs.len());
    let mut rows = Vec::with_capacity(runs.len());
    let mut failed = 0u32;
    for record in runs {
        match &record.outcome {
            RunOutcome::Completed {
                duration_ms,
                rows: count,
            } => {
                durations.push(*duration_ms);
                rows.push(*count as f64);
            }
            RunOutcome::Failed { .. } => failed += 1,
        }
    }
    VariantSummary::from_measurements(name, &durations, &rows, failed)
}

/// Relative improvement of a candidate over the baseline for one metric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Improvement {
    Percent(f64),
    NotApplicable,
}

/// `(baseline - candidate) / baseline * 100`; not applicable on a zero
/// baseline, never a division fault.
pub fn improvement_percent(baseline: f64, candidate: f64) -> Improvement {
    if baseline == 0.0 {
        Improvement::NotApplicable
    } else {
        Improvement::Percent((baseline - candidate) / baseline * 100.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: String,
    pub baseline: f64,
    pub candidate: f64,
    pub improvement: Improvement,
}

/// The six fixed metric rows pairing one candidate against the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub baseline: String,
    pub candidate: String,
    pub rows: Vec<MetricRow>,
}

impl Comparison {
    pub fn between(baseline: &VariantSummary, candidate: &VariantSummary) -> Self {
        let pairs = [
            (METRIC_AVG_TIME, baseline.avg_time_ms, candidate.avg_time_ms),
            (
                METRIC_MEDIAN_TIME,
                baseline.median_time_ms,
                candidate.median_time_ms,
            ),
            (METRIC_MIN_TIME, baseline.min_time_ms, candidate.min_time_ms),
            (METRIC_MAX_TIME, baseline.max_time_ms, candidate.max_time_ms),
            (METRIC_STD_DEV, baseline.std_dev_ms, candidate.std_dev_ms),
            (METRIC_AVG_ROWS, baseline.avg_rows, candidate.avg_rows),
        ];
        let rows = pairs
            .into_iter()
            .map(|(metric, base, cand)| MetricRow {
                metric: metric.to_string(),
                baseline: base,
                candidate: cand,
                improvement: improvement_percent(base, cand),
            })
            .collect();
        Self {
            baseline: baseline.name.clone(),
            candidate: candidate.name.clone(),
            rows,
        }
    }
}

/// Full session output: status, per-variant sections in benchmark order
/// (the first variant is the baseline), and one comparison per candidate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub status: SessionStatus,
    pub variants: Vec<VariantReport>,
    pub comparisons: Vec<Comparison>,
}

impl ComparisonReport {
    pub fn build(status: SessionStatus, variants: Vec<VariantReport>) -> Self {
        let comparisons = match variants.split_first() {
            Some((baseline, candidates)) => candidates
                .iter()
                .filter_map(|candidate| {
                    match (baseline.summary.as_ref(), candidate.summary.as_ref()) {
                        (Some(base), Some(cand)) => Some(Comparison::between(base, cand)),
                        _ => None,
                    }
                })
                .collect(),
            None => Vec::new(),
        };
        Self {
            status,
            variants,
            comparisons,
        }
    }

    pub fn baseline(&self) -> Option<&VariantReport> {
        self.variants.first()
    }

    /// Summaries of every variant that completed at least one run.
    pub fn summaries(&self) -> Vec<&VariantSummary> {
        self.variants
            .iter()
            .filter_map(|variant| variant.summary.as_ref())
            .collect()
    }

    pub fn to_json(&self) -> Result<String, SqlBenchError> {
        serde_json::to_string_pretty(self).map_err(|e| SqlBenchError::invalid_input(e.to_string()))
    }

    /// Render the report the way the demo prints it: run log per variant,
    /// then one fixed-width comparison table per candidate, then a summary
    /// block.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        push_banner(&mut out, "QUERY BENCHMARK RESULTS");
        match &self.status {
            SessionStatus::Completed => {}
            SessionStatus::Cancelled => {
                out.push_str("status: cancelled before completion; partial results below\n");
            }
            SessionStatus::Aborted { error } => {
                out.push_str(&format!("status: aborted by connection failure: {error}\n"));
            }
        }

        for section in &self.variants {
            out.push('\n');
            out.push_str(&format!("{} ({} runs)\n", section.name, section.runs.len()));
            for record in &section.runs {
                match &record.outcome {
                    RunOutcome::Completed { duration_ms, rows } => {
                        out.push_str(&format!(
                            "  Run {}: {:.2}ms, {} rows\n",
                            record.run, duration_ms, rows
                        ));
                    }
                    RunOutcome::Failed { error } => {
                        out.push_str(&format!("  Run {}: failed: {error}\n", record.run));
                    }
                }
            }
            match &section.summary {
                Some(summary) => {
                    out.push_str(&format!(
                        "  avg={:.2}ms median={:.2}ms min={:.2}ms max={:.2}ms std_dev={:.2}ms avg_rows={:.1}\n",
                        summary.avg_time_ms,
                        summary.median_time_ms,
                        summary.min_time_ms,
                        summary.max_time_ms,
                        summary.std_dev_ms,
                        summary.avg_rows
                    ));
                }
                None => out.push_str("  no completed runs\n"),
            }
        }

        for comparison in &self.comparisons {
            out.push('\n');
            out.push_str(&format!(
                "{:<20} {:<15} {:<15} {:<15}\n",
                "Metric", comparison.baseline, comparison.candidate, "Improvement"
            ));
            out.push_str(&"-".repeat(65));
            out.push('\n');
            for row in &comparison.rows {
                let (base, cand) = if row.metric == METRIC_AVG_ROWS {
                    (
                        format!("{:<15.1}", row.baseline),
                        format!("{:<15.1}", row.candidate),
                    )
                } else {
                    (
                        format!("{:<15.2}", row.baseline),
                        format!("{:<15.2}", row.candidate),
                    )
                };
                let improvement = match &row.improvement {
                    Improvement::Percent(percent) => format!("{:>+14.1}%", percent),
                    Improvement::NotApplicable => format!("{:>15}", "N/A"),
                };
                out.push_str(&format!(
                    "{:<20} {} {} {}\n",
                    row.metric, base, cand, improvement
                ));
            }
        }

        out.push('\n');
        push_banner(&mut out, "SUMMARY");
        if self.comparisons.is_empty() {
            out.push_str("no comparison available\n");
        }
        for comparison in &self.comparisons {
            if let Some(avg_row) = comparison.rows.first() {
                match &avg_row.improvement {
                    Improvement::Percent(percent) if *percent > 0.0 => {
                        out.push_str(&format!(
                            "{} improved on {} by {:.1}% (avg {:.2}ms -> {:.2}ms)\n",
                            comparison.candidate,
                            comparison.baseline,
                            percent,
                            avg_row.baseline,
                            avg_row.candidate
                        ));
                    }
                    Improvement::Percent(_) => {
                        out.push_str(&format!(
                            "{} did not improve on {} (avg {:.2}ms -> {:.2}ms)\n",
                            comparison.candidate,
                            comparison.baseline,
                            avg_row.baseline,
                            avg_row.candidate
                        ));
                    }
                    Improvement::NotApplicable => {
                        out.push_str(&format!(
                            "{} vs {}: improvement not applicable (zero baseline)\n",
                            comparison.candidate, comparison.baseline
                        ));
                    }
                }
            }
        }
        if self.status.is_completed() {
            if let Some(baseline) = self.variants.first() {
                out.push_str(&format!(
                    "Results are based on {} timed runs per variant\n",
                    baseline.runs.len()
                ));
            }
        }
        out
    }
}

fn push_banner(out: &mut String, title: &str) {
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(60));
    out.push('\n');
}
