//! Remote execution layer for sqldesk.
//!
//! The actual SQL engine is a remote HTTP service; this module defines the
//! trait-based interface the coordinator talks to, the outcome types the
//! service reports, and the HTTP and mock implementations.

mod http;
mod mock;
mod types;

pub use http::{HttpExecutor, HttpExecutorConfig};
pub use mock::{FailingExecutor, MockExecutor};
pub use types::{ColumnInfo, Row, RowSet, Value};

use crate::error::Result;
use crate::splitter::Statement;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Outcome reported by the remote service for one statement in a batch.
///
/// Outcomes arrive in submission order, one per executed statement. When the
/// service stops early (proceed-after-error disabled), the response may be
/// shorter than the batch; the coordinator pads the difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StatementOutcome {
    /// The statement executed and produced a result set.
    Success {
        rows: RowSet,
        elapsed_ms: u64,
    },
    /// The statement was rejected by the SQL engine.
    Error {
        message: String,
        elapsed_ms: u64,
    },
    /// The statement was not executed because an earlier one failed.
    Skipped,
}

/// Outcome reported by the remote service for a raw-mode submission.
///
/// A single raw query may yield several result sets; they share one elapsed
/// time because the service does not attribute timing per source statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RawOutcome {
    Success {
        row_sets: Vec<RowSet>,
        elapsed_ms: u64,
    },
    Error {
        message: String,
        elapsed_ms: u64,
    },
}

/// Trait defining the interface to the remote execution service.
///
/// Both operations are async and return Results with SqldeskError; a
/// per-statement SQL error is data inside the Ok value, never an Err.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Executes an ordered batch of statements.
    ///
    /// When `proceed_after_error` is false the service stops at the first
    /// failing statement and the returned list may be shorter than the batch.
    async fn execute_batch(
        &self,
        statements: &[Statement],
        proceed_after_error: bool,
    ) -> Result<Vec<StatementOutcome>>;

    /// Executes raw text as one opaque unit, without splitting.
    async fn execute_raw(&self, sql: &str) -> Result<RawOutcome>;
}
