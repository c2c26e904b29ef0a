//! sqldesk - SQL console core.
//!
//! Splits free-form SQL text into statements and orchestrates their execution
//! against a remote execution service, with partial-failure and cancellation
//! semantics.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod remote;
pub mod splitter;
