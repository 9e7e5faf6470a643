//! Common utilities shared across the harness

pub mod config;
pub mod error;
pub mod logging;

pub use config::{Config, UserFixture};
pub use error::{Error, Failure, Result, TransportError};
