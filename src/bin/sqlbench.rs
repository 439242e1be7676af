use std::{env, path::PathBuf, process, time::Duration};

use serde_json::json;
use sqlbench::{
    BenchConfig, BenchmarkRunner, ComparisonReport, QueryVariant, SessionStatus, SqlBenchError,
    SqliteExecutor, WorkloadConfig, WorkloadProgress,
    baseline::{self, GateResult},
    bookstore::{
        queries, schema,
        seed::{self, SeedConfig},
    },
    cli::CommandLineConfig,
    run_workload,
};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    let auto_init = config.command != "teardown";
    let executor = match open_executor(&config, auto_init) {
        Ok(e) => e,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };

    if let Err(err) = run_command(executor, &config) {
        eprintln!("command failed: {err}");
        process::exit(1);
    }
}

fn open_executor(config: &CommandLineConfig, auto_init: bool) -> Result<SqliteExecutor, String> {
    let executor = if config.database == "memory" {
        SqliteExecutor::open_in_memory().map_err(|e| e.to_string())?
    } else {
        let path = PathBuf::from(&config.database);
        SqliteExecutor::open(&path).map_err(|e| e.to_string())?
    };
    if auto_init {
        schema::ensure_schema(executor.connection()).map_err(|e| e.to_string())?;
    }
    Ok(executor)
}

fn run_command(executor: SqliteExecutor, config: &CommandLineConfig) -> Result<(), SqlBenchError> {
    let args = config.command_args.as_slice();
    match config.command.as_str() {
        "status" => {
            let stats = queries::fixture_stats(executor.connection())?;
            let avg = match stats.avg_rating {
                Some(avg) => format!("{avg:.2}"),
                None => String::from("n/a"),
            };
            println!(
                "database={} books={} ratings={} avg_rating={avg}",
                config.database, stats.books, stats.ratings
            );
            Ok(())
        }
        "init" => {
            let payload = json!({
                "command": "init",
                "database": config.database,
                "tables": ["books", "ratings"],
            });
            println!("{payload}");
            Ok(())
        }
        "seed" => {
            let seed_config = seed_config_from_args(args);
            let report = seed::seed_fixture(executor.connection(), &seed_config)?;
            let payload = json!({
                "command": "seed",
                "seed": seed_config.seed,
                "books": report.books,
                "ratings": report.ratings,
            });
            println!("{payload}");
            Ok(())
        }
        "index" => {
            schema::ensure_rating_index(executor.connection())?;
            let payload = json!({
                "command": "index",
                "index": schema::RATING_INDEX,
            });
            println!("{payload}");
            Ok(())
        }
        "teardown" => {
            schema::teardown(executor.connection())?;
            let payload = json!({
                "command": "teardown",
                "dropped": ["books", "ratings", schema::RATING_INDEX],
            });
            println!("{payload}");
            Ok(())
        }
        "benchmark" => run_benchmark(executor, args),
        "workload" => run_workload_command(executor, args),
        "demo" => run_demo(executor, args),
        "baseline" => {
            let entries = baseline::load_baselines()?;
            if entries.is_empty() {
                println!("no baseline entries");
            }
            for entry in entries {
                println!(
                    "{}: avg={:.2}ms median={:.2}ms runs={} recorded_unix={}",
                    entry.name,
                    entry.avg_time_ms,
                    entry.median_time_ms,
                    entry.runs,
                    entry.recorded_unix
                );
            }
            Ok(())
        }
        other => Err(SqlBenchError::invalid_input(format!(
            "unknown command {other}"
        ))),
    }
}

fn run_benchmark(executor: SqliteExecutor, args: &[String]) -> Result<(), SqlBenchError> {
    let bench = bench_config_from_args(args);
    let variants = variants_from_args(args)?;
    let report = BenchmarkRunner::new(bench).run(executor, &variants)?;
    print_report(&report, args)?;
    finish_benchmark(&report, args)
}

fn run_demo(executor: SqliteExecutor, args: &[String]) -> Result<(), SqlBenchError> {
    let seed_config = seed_config_from_args(args);
    seed::seed_fixture(executor.connection(), &seed_config)?;
    schema::ensure_rating_index(executor.connection())?;
    let stats = queries::fixture_stats(executor.connection())?;
    let avg = match stats.avg_rating {
        Some(avg) => format!("{avg:.2}"),
        None => String::from("n/a"),
    };
    println!(
        "fixture: {} books, {} ratings, avg rating {avg}",
        stats.books, stats.ratings
    );

    let bench = bench_config_from_args(args);
    let variants = variants_from_args(args)?;
    let report = BenchmarkRunner::new(bench).run(executor, &variants)?;
    print_report(&report, args)?;
    finish_benchmark(&report, args)
}

fn run_workload_command(
    mut executor: SqliteExecutor,
    args: &[String],
) -> Result<(), SqlBenchError> {
    let sql = optional_flag_value(args, "--sql")
        .unwrap_or_else(|| queries::OPTIMIZED_TOP_BOOKS_SQL.to_string());
    let variant = QueryVariant::new("workload", sql);
    let config = workload_config_from_args(args);
    let stats = run_workload(&mut executor, &variant, &config)?;
    let payload = json!({
        "command": "workload",
        "iterations": config.iterations,
        "successful": stats.successful,
        "failed": stats.failed,
        "success_rate": stats.success_rate(),
        "avg_time_ms": stats.avg_time_ms,
        "total_time_ms": stats.total_time_ms,
    });
    println!("{payload}");
    Ok(())
}

fn print_report(report: &ComparisonReport, args: &[String]) -> Result<(), SqlBenchError> {
    if has_flag(args, "--json") {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn finish_benchmark(report: &ComparisonReport, args: &[String]) -> Result<(), SqlBenchError> {
    if let SessionStatus::Aborted { error } = &report.status {
        return Err(SqlBenchError::connection(error.clone()));
    }
    if has_flag(args, "--record-baseline") {
        let summaries = report.summaries();
        for summary in &summaries {
            baseline::record_baseline(summary)?;
        }
        println!("baseline_recorded={}", summaries.len());
    }
    if let Some(name) = optional_flag_value(args, "--check-baseline") {
        let tolerance = parse_optional_f64(args, "--tolerance").unwrap_or(0.2);
        let summaries = report.summaries();
        let summary = summaries
            .iter()
            .find(|summary| summary.name == name)
            .copied()
            .ok_or_else(|| SqlBenchError::not_found(format!("variant {name}")))?;
        match baseline::check_regression(summary, tolerance)? {
            GateResult::Pass => println!("baseline_gate=pass variant={name}"),
            GateResult::Fail { reason } => {
                println!("baseline_gate=fail variant={name}");
                return Err(SqlBenchError::validation(reason));
            }
        }
    }
    Ok(())
}

fn variants_from_args(args: &[String]) -> Result<Vec<QueryVariant>, SqlBenchError> {
    let slow = match optional_flag_value(args, "--slow-file") {
        Some(path) => QueryVariant::from_sql_file("Original", path)?,
        None => QueryVariant::new("Original", queries::SLOW_TOP_BOOKS_SQL),
    };
    let optimized = match optional_flag_value(args, "--optimized-file") {
        Some(path) => QueryVariant::from_sql_file("Optimized", path)?,
        None => QueryVariant::new("Optimized", queries::OPTIMIZED_TOP_BOOKS_SQL),
    };
    Ok(vec![slow, optimized])
}

fn bench_config_from_args(args: &[String]) -> BenchConfig {
    let mut bench = BenchConfig::default();
    if let Some(iterations) = parse_optional_u32(args, "--iterations") {
        bench.iterations = iterations;
    }
    if let Some(warmup) = parse_optional_u32(args, "--warmup") {
        bench.warmup = warmup;
    }
    if let Some(delay) = parse_optional_u64(args, "--delay-ms") {
        bench.inter_run_delay = Duration::from_millis(delay);
    }
    if let Some(timeout) = parse_optional_u64(args, "--timeout-ms") {
        bench.query_timeout = Some(Duration::from_millis(timeout));
    }
    bench
}

fn seed_config_from_args(args: &[String]) -> SeedConfig {
    let mut config = SeedConfig::default();
    if let Some(books) = parse_optional_u32(args, "--books") {
        config.books = books;
    }
    if let Some(users) = parse_optional_u32(args, "--users") {
        config.users = users;
    }
    if let Some(ratings) = parse_optional_u32(args, "--ratings") {
        config.ratings = ratings;
    }
    if let Some(dim) = parse_optional_u32(args, "--dim") {
        config.embedding_dim = dim as usize;
    }
    if let Some(seed_value) = parse_optional_u64(args, "--seed") {
        config.seed = seed_value;
    }
    config
}

fn workload_config_from_args(args: &[String]) -> WorkloadConfig {
    let mut config = WorkloadConfig::default();
    if let Some(iterations) = parse_optional_u32(args, "--iterations") {
        config.iterations = iterations;
    }
    if let Some(delay) = parse_optional_u64(args, "--delay-ms") {
        config.delay = Duration::from_millis(delay);
    }
    config.progress_callback = Some(Box::new(|progress: WorkloadProgress| {
        eprintln!(
            "[workload] {}/{} avg={:.2}ms",
            progress.completed, progress.total, progress.avg_time_ms
        );
    }) as Box<dyn Fn(WorkloadProgress) + Send + Sync>);
    config
}

fn optional_flag_value(args: &[String], flag: &str) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == flag {
            return iter.next().cloned();
        }
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn parse_optional_u32(args: &[String], flag: &str) -> Option<u32> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == flag {
            if let Some(value) = iter.next() {
                return value.parse::<u32>().ok();
            }
        }
    }
    None
}

fn parse_optional_u64(args: &[String], flag: &str) -> Option<u64> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == flag {
            if let Some(value) = iter.next() {
                return value.parse::<u64>().ok();
            }
        }
    }
    None
}

fn parse_optional_f64(args: &[String], flag: &str) -> Option<f64> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == flag {
            if let Some(value) = iter.next() {
                return value.parse::<f64>().ok();
            }
        }
    }
    None
}
