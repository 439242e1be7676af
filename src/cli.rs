#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub database: String,
    pub command: String,
    pub command_args: Vec<String>,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut database = String::from("memory");
        let mut command = String::from("status");
        let mut command_args = Vec::new();
        let mut command_set = false;
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            if command_set {
                command_args.push(arg.to_string());
                continue;
            }
            match *arg {
                "--db" | "--database" => {
                    database = iter
                        .next()
                        .ok_or_else(|| "--db requires a value".to_string())?
                        .to_string();
                }
                "--command" => {
                    command = iter
                        .next()
                        .ok_or_else(|| "--command requires a value".to_string())?
                        .to_string();
                    command_set = true;
                }
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                _ => {
                    command = arg.to_string();
                    command_set = true;
                }
            }
        }
        Ok(Self {
            database,
            command,
            command_args,
        })
    }

    pub fn help() -> &'static str {
        r#"Usage: sqlbench [--db memory|PATH] [--command status]

Commands:
  status                    Show fixture row counts and the mean rating
  init                      Create the books and ratings tables
  seed [options]            Fill the fixture with deterministic demo data
  index                     Create the ratings covering index
  teardown                  Drop the fixture tables and index
  benchmark [options]       Time the query variants and print a comparison
  workload [options]        Replay one query under sustained load
  demo [options]            init + seed + index + benchmark in one step
  baseline                  Print recorded baseline entries

Seed Options:
  --books N                 Number of books to insert (default: 100)
  --users N                 Number of rating users (default: 50)
  --ratings N               Number of ratings to insert (default: 1000)
  --dim N                   Embedding vector length (default: 1536)
  --seed N                  RNG seed (default: 42)

Benchmark Options:
  --iterations N            Timed runs per variant (default: 5)
  --warmup N                Untimed runs before timing starts (default: 0)
  --delay-ms MS             Pause between timed runs (default: 0)
  --timeout-ms MS           Per-run time limit (default: none)
  --slow-file PATH          Read the first variant from a .sql file
  --optimized-file PATH     Read the second variant from a .sql file
  --json                    Print the report as JSON instead of text
  --record-baseline         Save each variant summary to the baseline file
  --check-baseline NAME     Gate the named variant against its baseline
  --tolerance F             Allowed regression fraction (default: 0.2)

Workload Options:
  --iterations N            Query attempts (default: 1000)
  --delay-ms MS             Pause between attempts (default: 100)
  --sql TEXT                Query to replay (default: the optimized demo query)

Examples:
  sqlbench demo
  sqlbench --db bench.db seed --books 500 --ratings 5000
  sqlbench --db bench.db benchmark --iterations 20 --warmup 2
  sqlbench --db bench.db benchmark --record-baseline
  sqlbench --db bench.db workload --iterations 200 --delay-ms 10
"#
    }
}
