use sqlbench::{
    VariantSummary,
    stats::{duration_ms, mean, median, sample_std_dev},
};
use std::time::Duration;

const EPSILON: f64 = 1e-9;

#[test]
fn test_mean_of_known_values() {
    assert!((mean(&[10.0, 20.0, 30.0, 40.0]) - 25.0).abs() < EPSILON);
}

#[test]
fn test_median_odd_count_picks_middle() {
    // Input order must not matter.
    assert!((median(&[5.0, 1.0, 3.0]) - 3.0).abs() < EPSILON);
}

#[test]
fn test_median_even_count_averages_middle_pair() {
    assert!((median(&[4.0, 1.0, 3.0, 2.0]) - 2.5).abs() < EPSILON);
}

#[test]
fn test_sample_std_dev_uses_n_minus_one() {
    // Variance of {10,20,30,40} with the sample estimator is 500/3.
    let expected = (500.0f64 / 3.0).sqrt();
    assert!((sample_std_dev(&[10.0, 20.0, 30.0, 40.0]) - expected).abs() < 1e-9);
}

#[test]
fn test_sample_std_dev_is_zero_below_two_values() {
    assert_eq!(sample_std_dev(&[]), 0.0);
    assert_eq!(sample_std_dev(&[42.0]), 0.0);
}

#[test]
fn test_duration_ms_keeps_sub_millisecond_precision() {
    assert!((duration_ms(Duration::from_micros(1500)) - 1.5).abs() < EPSILON);
    assert!((duration_ms(Duration::from_nanos(250_000)) - 0.25).abs() < EPSILON);
}

#[test]
fn test_summary_orders_min_median_max() {
    let durations = [12.5, 3.25, 7.0, 9.75, 3.5];
    let rows = [10.0; 5];
    let summary = VariantSummary::from_measurements("v", &durations, &rows, 0).unwrap();

    assert!(summary.min_time_ms <= summary.median_time_ms);
    assert!(summary.median_time_ms <= summary.max_time_ms);
    assert!(summary.min_time_ms <= summary.avg_time_ms);
    assert!(summary.avg_time_ms <= summary.max_time_ms);
    assert_eq!(summary.min_time_ms, 3.25);
    assert_eq!(summary.max_time_ms, 12.5);
}

#[test]
fn test_summary_of_no_completed_runs_is_none() {
    assert!(VariantSummary::from_measurements("v", &[], &[], 3).is_none());
}

#[test]
fn test_summary_counts_completed_and_failed_runs() {
    let summary = VariantSummary::from_measurements("v", &[1.0, 2.0], &[4.0, 6.0], 3).unwrap();
    assert_eq!(summary.completed_runs, 2);
    assert_eq!(summary.failed_runs, 3);
    assert_eq!(summary.total_runs(), 5);
    assert!((summary.avg_rows - 5.0).abs() < EPSILON);
}

#[test]
fn test_single_measurement_summary_is_degenerate() {
    let summary = VariantSummary::from_measurements("v", &[8.0], &[2.0], 0).unwrap();
    assert_eq!(summary.avg_time_ms, 8.0);
    assert_eq!(summary.median_time_ms, 8.0);
    assert_eq!(summary.min_time_ms, 8.0);
    assert_eq!(summary.max_time_ms, 8.0);
    assert_eq!(summary.std_dev_ms, 0.0);
}
