//! Smoke-test runner for the school management API
//!
//! Scenarios run strictly in sequence. Each one reads the session context
//! left by the previous scenarios (tokens, created records), records its
//! outcomes, and hands an updated context on.

pub mod context;
pub mod fixtures;
pub mod outcome;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod summary;

pub use context::{EntityKey, SessionContext};
pub use outcome::TestOutcome;
pub use runner::{RunReport, Runner};
pub use scenario::{Scenario, ScenarioOutput};
pub use summary::RunSummary;
