//! Query execution coordination.
//!
//! Owns the lifecycle of a submission: splitting the input (Multi mode),
//! dispatching to the remote executor, assembling per-statement results, and
//! enforcing the serialization invariant: at most one live submission per
//! coordinator, with stale responses identified by a generation token and
//! discarded rather than allowed to overwrite newer state.
//!
//! Coordinator state is an explicit enum published over a watch channel;
//! callers observe transitions instead of polling internal fields.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::Result;
use crate::remote::{RawOutcome, RemoteExecutor, RowSet, StatementOutcome};
use crate::splitter::{self, Statement};

/// How the submitted text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Split the text into statements; each is executed and reported
    /// separately.
    Multi,
    /// Submit the text verbatim as one opaque unit. The remote side may
    /// return several result sets, but they are not aligned with source
    /// statements.
    Raw,
}

/// One submission of SQL text.
///
/// Carries a fresh, single-use cancellation handle; a new request is created
/// (with a new handle) for every submission.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// The raw SQL text as typed.
    pub text: String,
    /// Execution mode.
    pub mode: ExecutionMode,
    /// Whether remaining statements run after one fails (Multi mode only).
    pub proceed_after_error: bool,
    /// Cancellation handle for the in-flight network call.
    pub cancel: CancellationToken,
}

impl ExecutionRequest {
    /// Creates a Multi-mode request with a fresh cancellation handle.
    pub fn multi(text: impl Into<String>, proceed_after_error: bool) -> Self {
        Self {
            text: text.into(),
            mode: ExecutionMode::Multi,
            proceed_after_error,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a Raw-mode request with a fresh cancellation handle.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: ExecutionMode::Raw,
            proceed_after_error: false,
            cancel: CancellationToken::new(),
        }
    }
}

/// One outcome in a published result batch.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRecord {
    /// The statement executed and produced a result set.
    Success { rows: RowSet, elapsed: Duration },
    /// The statement was rejected by the SQL engine.
    Error { message: String, elapsed: Duration },
    /// The statement was not executed because an earlier statement in the
    /// batch failed with proceed-after-error disabled.
    Skipped,
}

impl ResultRecord {
    /// Returns true if this record is a per-statement error.
    pub fn is_error(&self) -> bool {
        matches!(self, ResultRecord::Error { .. })
    }

    /// Returns true if this record was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, ResultRecord::Skipped)
    }
}

/// Session-wide execution totals, accumulated across submissions.
///
/// Mutated only by the coordinator's completion path; reporting only, never
/// read back to influence execution.
#[derive(Debug, Default)]
pub struct RunCounters {
    executed: AtomicU64,
    errored: AtomicU64,
}

/// A point-in-time copy of the run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCountersSnapshot {
    /// Total statements executed (non-skipped records).
    pub executed: u64,
    /// Total statements that errored.
    pub errored: u64,
}

impl RunCounters {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a point-in-time copy of the totals.
    pub fn snapshot(&self) -> RunCountersSnapshot {
        RunCountersSnapshot {
            executed: self.executed.load(Ordering::Relaxed),
            errored: self.errored.load(Ordering::Relaxed),
        }
    }

    fn record_batch(&self, records: &[ResultRecord]) {
        let executed = records.iter().filter(|r| !r.is_skipped()).count() as u64;
        let errored = records.iter().filter(|r| r.is_error()).count() as u64;
        self.executed.fetch_add(executed, Ordering::Relaxed);
        self.errored.fetch_add(errored, Ordering::Relaxed);
    }
}

/// Externally visible coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No submission has been made yet.
    Idle,
    /// A submission is in flight.
    Submitted { generation: u64 },
    /// The last submission completed and its batch was published.
    Completed,
    /// The last submission failed at the transport level.
    Failed,
    /// The last submission was cancelled.
    Cancelled,
}

/// Outcome of a `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The submission ran to completion; the batch holds one record per
    /// statement (Multi mode) or per result set (Raw mode).
    Completed(Vec<ResultRecord>),
    /// The submission was cancelled or superseded by a newer one; no batch
    /// was published and the counters were not touched.
    Cancelled,
}

/// Coordinates submissions from one query editor context.
///
/// Owned by exactly one logical editor; not shared across concurrent editors.
pub struct QueryCoordinator {
    executor: Arc<dyn RemoteExecutor>,
    counters: Arc<RunCounters>,
    generation: AtomicU64,
    current_cancel: Mutex<CancellationToken>,
    latest: Mutex<Option<Vec<ResultRecord>>>,
    state_tx: watch::Sender<CoordinatorState>,
    state_rx: watch::Receiver<CoordinatorState>,
}

impl QueryCoordinator {
    /// Creates a coordinator with its own run counters.
    pub fn new(executor: Arc<dyn RemoteExecutor>) -> Self {
        Self::with_counters(executor, Arc::new(RunCounters::new()))
    }

    /// Creates a coordinator that accumulates into session-owned counters.
    pub fn with_counters(executor: Arc<dyn RemoteExecutor>, counters: Arc<RunCounters>) -> Self {
        let (state_tx, state_rx) = watch::channel(CoordinatorState::Idle);
        Self {
            executor,
            counters,
            generation: AtomicU64::new(0),
            current_cancel: Mutex::new(CancellationToken::new()),
            latest: Mutex::new(None),
            state_tx,
            state_rx,
        }
    }

    /// The current coordinator state.
    pub fn state(&self) -> CoordinatorState {
        *self.state_rx.borrow()
    }

    /// Returns a receiver that observes state transitions.
    pub fn watch_state(&self) -> watch::Receiver<CoordinatorState> {
        self.state_rx.clone()
    }

    /// The last published result batch, if any.
    ///
    /// Batches are published whole; there is no partial update while a
    /// submission is completing, and a newer submission's batch fully
    /// replaces the previous one.
    pub fn latest_batch(&self) -> Option<Vec<ResultRecord>> {
        self.latest.lock().unwrap().clone()
    }

    /// A point-in-time copy of the run counters.
    pub fn counters(&self) -> RunCountersSnapshot {
        self.counters.snapshot()
    }

    /// Submits SQL text for execution.
    ///
    /// Any previously in-flight submission is cancelled first: at most one
    /// submission per coordinator is live at a time, so out-of-order network
    /// responses can never interleave result batches.
    ///
    /// Returns `Err` only for whole-submission failures (transport or
    /// malformed response); per-statement SQL errors are `Error` records
    /// inside a `Completed` batch.
    pub async fn submit(&self, request: ExecutionRequest) -> Result<SubmitOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        // Supersede any in-flight submission before this one starts.
        {
            let mut current = self.current_cancel.lock().unwrap();
            current.cancel();
            *current = request.cancel.clone();
        }

        self.state_tx
            .send_replace(CoordinatorState::Submitted { generation });
        debug!(generation, mode = ?request.mode, "submission started");

        let outcome = match request.mode {
            ExecutionMode::Multi => self.run_multi(&request).await,
            ExecutionMode::Raw => self.run_raw(&request).await,
        };

        // Staleness is decided purely by generation comparison: a cancel or a
        // newer submit has bumped the counter, so this response must not
        // touch state, counters, or the published batch.
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding stale response");
            return Ok(SubmitOutcome::Cancelled);
        }

        match outcome {
            Ok(Some(records)) => {
                self.counters.record_batch(&records);
                *self.latest.lock().unwrap() = Some(records.clone());
                self.state_tx.send_replace(CoordinatorState::Completed);
                Ok(SubmitOutcome::Completed(records))
            }
            Ok(None) => {
                self.state_tx.send_replace(CoordinatorState::Cancelled);
                Ok(SubmitOutcome::Cancelled)
            }
            Err(e) => {
                warn!(generation, error = %e, "submission failed");
                self.state_tx.send_replace(CoordinatorState::Failed);
                Err(e)
            }
        }
    }

    /// Cancels the in-flight submission, if any.
    ///
    /// Always bumps the generation as well, so even a transport that cannot
    /// truly abort produces a response that is recognized as stale; the
    /// coordinator's visible state moves on immediately.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.current_cancel.lock().unwrap().cancel();
        self.state_tx.send_replace(CoordinatorState::Cancelled);
    }

    /// Runs a Multi-mode submission. `Ok(None)` means cancelled.
    async fn run_multi(&self, request: &ExecutionRequest) -> Result<Option<Vec<ResultRecord>>> {
        let statements = splitter::split(&request.text);
        if statements.is_empty() {
            // Nothing to execute; completes locally as an empty batch with no
            // network round trip.
            return Ok(Some(Vec::new()));
        }

        tokio::select! {
            biased;

            _ = request.cancel.cancelled() => Ok(None),
            result = self
                .executor
                .execute_batch(&statements, request.proceed_after_error) =>
            {
                result.map(|outcomes| Some(assemble_multi(&statements, outcomes)))
            }
        }
    }

    /// Runs a Raw-mode submission. `Ok(None)` means cancelled.
    async fn run_raw(&self, request: &ExecutionRequest) -> Result<Option<Vec<ResultRecord>>> {
        tokio::select! {
            biased;

            _ = request.cancel.cancelled() => Ok(None),
            result = self.executor.execute_raw(&request.text) => {
                result.map(|outcome| Some(assemble_raw(outcome)))
            }
        }
    }
}

/// Assembles the Multi-mode batch: outcomes are copied 1:1 in order, and any
/// statement the remote side never reached is synthesized as `Skipped` so the
/// batch always has one record per input statement.
fn assemble_multi(
    statements: &[Statement],
    outcomes: Vec<StatementOutcome>,
) -> Vec<ResultRecord> {
    if outcomes.len() > statements.len() {
        warn!(
            statements = statements.len(),
            outcomes = outcomes.len(),
            "remote returned more outcomes than statements; extras ignored"
        );
    }

    let mut outcomes = outcomes.into_iter();
    statements
        .iter()
        .map(|_| match outcomes.next() {
            Some(StatementOutcome::Success { rows, elapsed_ms }) => ResultRecord::Success {
                rows,
                elapsed: Duration::from_millis(elapsed_ms),
            },
            Some(StatementOutcome::Error {
                message,
                elapsed_ms,
            }) => ResultRecord::Error {
                message,
                elapsed: Duration::from_millis(elapsed_ms),
            },
            Some(StatementOutcome::Skipped) | None => ResultRecord::Skipped,
        })
        .collect()
}

/// Assembles the Raw-mode batch: one record per returned row set, all sharing
/// the submission's elapsed time, or a single error record.
fn assemble_raw(outcome: RawOutcome) -> Vec<ResultRecord> {
    match outcome {
        RawOutcome::Success {
            row_sets,
            elapsed_ms,
        } => {
            let elapsed = Duration::from_millis(elapsed_ms);
            row_sets
                .into_iter()
                .map(|rows| ResultRecord::Success { rows, elapsed })
                .collect()
        }
        RawOutcome::Error {
            message,
            elapsed_ms,
        } => vec![ResultRecord::Error {
            message,
            elapsed: Duration::from_millis(elapsed_ms),
        }],
    }
}
