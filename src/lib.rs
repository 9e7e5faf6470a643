//! edu-smoke - smoke tests for the school management REST API
//!
//! This library provides the HTTP client, typed wire schemas and the
//! sequential scenario runner used by the `edu-smoke` binary.

pub mod api;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Config, Error, Failure, Result};
pub use testing::{RunReport, Runner, SessionContext, TestOutcome};
