//! Shared scripted executor for driving the benchmark loop without a
//! database. Each call consumes the next step; observers stay valid after
//! the runner consumes the executor because they are shared handles.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use sqlbench::{CancelToken, ExecError, QueryExecutor};

#[derive(Clone, Copy, Debug)]
pub enum Step {
    Rows(u64),
    QueryError,
    ConnectionError,
}

pub struct ScriptedExecutor {
    steps: Vec<Step>,
    repeat_last: bool,
    cursor: usize,
    calls: Arc<Mutex<Vec<String>>>,
    timeouts: Arc<Mutex<Vec<Option<Duration>>>>,
    released: Arc<AtomicBool>,
    cancel_after: Option<(usize, CancelToken)>,
}

impl ScriptedExecutor {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            repeat_last: false,
            cursor: 0,
            calls: Arc::new(Mutex::new(Vec::new())),
            timeouts: Arc::new(Mutex::new(Vec::new())),
            released: Arc::new(AtomicBool::new(false)),
            cancel_after: None,
        }
    }

    /// Every call succeeds with the same row count, no matter how many
    /// calls arrive.
    pub fn always(rows: u64) -> Self {
        let mut executor = Self::new(vec![Step::Rows(rows)]);
        executor.repeat_last = true;
        executor
    }

    /// Fire `token.cancel()` once the given number of calls has been made.
    pub fn cancel_after(mut self, calls: usize, token: CancelToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    /// Log of every SQL string passed to `execute`, in call order.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }

    /// Log of the timeout passed with each call.
    pub fn timeout_log(&self) -> Arc<Mutex<Vec<Option<Duration>>>> {
        self.timeouts.clone()
    }

    /// Set to true when the executor is dropped.
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        self.released.clone()
    }

    fn next_step(&mut self) -> Step {
        if let Some(step) = self.steps.get(self.cursor).copied() {
            self.cursor += 1;
            return step;
        }
        if self.repeat_last {
            self.steps.last().copied().unwrap_or(Step::Rows(0))
        } else {
            Step::Rows(0)
        }
    }
}

impl QueryExecutor for ScriptedExecutor {
    fn execute(&mut self, sql: &str, timeout: Option<Duration>) -> Result<u64, ExecError> {
        let call_count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(sql.to_string());
            calls.len()
        };
        self.timeouts.lock().unwrap().push(timeout);
        if let Some((after, token)) = &self.cancel_after {
            if call_count >= *after {
                token.cancel();
            }
        }
        match self.next_step() {
            Step::Rows(rows) => Ok(rows),
            Step::QueryError => Err(ExecError::Query {
                message: format!("scripted query failure at call {call_count}"),
            }),
            Step::ConnectionError => Err(ExecError::Connection {
                message: format!("scripted connection loss at call {call_count}"),
            }),
        }
    }
}

impl Drop for ScriptedExecutor {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}
