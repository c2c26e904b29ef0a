//! Integration test modules.

mod config_test;
mod coordinator_test;
mod splitter_test;
