//! Mock remote executor for testing.
//!
//! Provides an in-memory implementation of the RemoteExecutor trait with
//! scriptable per-statement errors, early stop on failure, and a hold/release
//! gate so tests can keep a response in flight while issuing another
//! submission.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use super::{ColumnInfo, RawOutcome, RemoteExecutor, RowSet, StatementOutcome, Value};
use crate::error::{Result, SqldeskError};
use crate::splitter::Statement;

/// A mock executor that returns canned outcomes.
///
/// By default every statement succeeds with a single-row result set. Specific
/// statement texts can be scripted to fail via [`with_error`](Self::with_error)
/// or to block until released via [`hold`](Self::hold).
pub struct MockExecutor {
    errors: HashMap<String, String>,
    raw_row_sets: usize,
    held: Mutex<HashSet<String>>,
    released: Notify,
    calls: AtomicUsize,
    batches: Mutex<Vec<Vec<String>>>,
}

impl MockExecutor {
    /// Creates a new mock executor where every statement succeeds.
    pub fn new() -> Self {
        Self {
            errors: HashMap::new(),
            raw_row_sets: 1,
            held: Mutex::new(HashSet::new()),
            released: Notify::new(),
            calls: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
        }
    }

    /// Scripts a SQL error for the given statement text.
    pub fn with_error(mut self, statement: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.insert(statement.into(), message.into());
        self
    }

    /// Sets how many row sets a raw submission returns.
    pub fn with_raw_row_sets(mut self, count: usize) -> Self {
        self.raw_row_sets = count;
        self
    }

    /// Holds any submission containing the given statement text until
    /// [`release`](Self::release) is called.
    pub fn hold(&self, statement: impl Into<String>) {
        self.held.lock().unwrap().insert(statement.into());
    }

    /// Releases a previously held statement, letting its submission complete.
    pub fn release(&self, statement: &str) {
        self.held.lock().unwrap().remove(statement);
        self.released.notify_waiters();
    }

    /// Number of execute calls (batch and raw) made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The statement texts of every batch submitted so far.
    pub fn submitted_batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    fn is_held(&self, texts: &[&str]) -> bool {
        let held = self.held.lock().unwrap();
        texts.iter().any(|t| held.contains(*t))
    }

    async fn wait_until_released(&self, texts: &[&str]) {
        loop {
            let released = self.released.notified();
            if !self.is_held(texts) {
                return;
            }
            released.await;
        }
    }

    fn success_outcome(sql: &str) -> StatementOutcome {
        StatementOutcome::Success {
            rows: Self::row_set_for(sql),
            elapsed_ms: 1,
        }
    }

    fn row_set_for(sql: &str) -> RowSet {
        RowSet::with_data(
            vec![ColumnInfo::new("result", "text")],
            vec![vec![Value::Text(format!("ok: {sql}"))]],
        )
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteExecutor for MockExecutor {
    async fn execute_batch(
        &self,
        statements: &[Statement],
        proceed_after_error: bool,
    ) -> Result<Vec<StatementOutcome>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let texts: Vec<&str> = statements.iter().map(Statement::text).collect();
        self.batches
            .lock()
            .unwrap()
            .push(texts.iter().map(|t| t.to_string()).collect());

        self.wait_until_released(&texts).await;

        let mut outcomes = Vec::new();
        for text in &texts {
            if let Some(message) = self.errors.get(*text) {
                outcomes.push(StatementOutcome::Error {
                    message: message.clone(),
                    elapsed_ms: 1,
                });
                if !proceed_after_error {
                    // Stop early without padding; the coordinator synthesizes
                    // Skipped records for the rest.
                    break;
                }
            } else {
                outcomes.push(Self::success_outcome(text));
            }
        }

        Ok(outcomes)
    }

    async fn execute_raw(&self, sql: &str) -> Result<RawOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.wait_until_released(&[sql]).await;

        if let Some(message) = self.errors.get(sql) {
            return Ok(RawOutcome::Error {
                message: message.clone(),
                elapsed_ms: 1,
            });
        }

        Ok(RawOutcome::Success {
            row_sets: (0..self.raw_row_sets).map(|_| Self::row_set_for(sql)).collect(),
            elapsed_ms: 1,
        })
    }
}

/// A mock executor whose requests always fail at the transport level.
pub struct FailingExecutor;

#[async_trait]
impl RemoteExecutor for FailingExecutor {
    async fn execute_batch(
        &self,
        _statements: &[Statement],
        _proceed_after_error: bool,
    ) -> Result<Vec<StatementOutcome>> {
        Err(SqldeskError::transport("connection refused"))
    }

    async fn execute_raw(&self, _sql: &str) -> Result<RawOutcome> {
        Err(SqldeskError::transport("connection refused"))
    }
}
