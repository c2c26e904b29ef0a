//! Integration tests for sqldesk.
//!
//! All tests run against the in-memory mock executor; no network or database
//! is required.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
