//! Error types for the smoke-test harness
//!
//! Two layers live here. [`Error`] covers startup problems that stop the
//! program before any scenario runs (bad config, HTTP client construction).
//! [`Failure`] is the per-step taxonomy: every variant becomes exactly one
//! failed test outcome and never aborts the run.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Startup error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file '{path}': {reason}")]
    ConfigParse { path: String, reason: String },

    // === HTTP Client Errors ===
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create a config parse error for a file
    pub fn config_parse(path: &str, reason: impl ToString) -> Self {
        Self::ConfigParse {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Transport-level failure: the request never produced a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub timed_out: bool,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            timed_out: e.is_timeout(),
            message: e.to_string(),
        }
    }
}

/// Why a single test step failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Connection refused, DNS failure, timeout, ...
    #[error("Request failed")]
    Transport(TransportError),

    /// The server answered with a status the step did not expect
    #[error("Failed with status {status} (expected {expected})")]
    UnexpectedStatus {
        expected: u16,
        status: u16,
        body: String,
    },

    /// Success status but the body did not match the expected shape
    #[error("{reason}")]
    Malformed { reason: String, body: String },

    /// Session state the step depends on is not there
    #[error("{0} not available")]
    MissingPrerequisite(String),
}

impl Failure {
    /// Create an unexpected status failure
    pub fn unexpected_status(expected: u16, status: u16, body: &str) -> Self {
        Self::UnexpectedStatus {
            expected,
            status,
            body: body.to_string(),
        }
    }

    /// Create a malformed body failure
    pub fn malformed(reason: impl Into<String>, body: &str) -> Self {
        Self::Malformed {
            reason: reason.into(),
            body: body.to_string(),
        }
    }

    /// Create a missing prerequisite failure
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingPrerequisite(what.into())
    }

    /// Supporting detail recorded alongside the message
    pub fn detail(&self) -> Option<String> {
        match self {
            Failure::Transport(e) if e.timed_out => Some(format!("timed out: {}", e.message)),
            Failure::Transport(e) => Some(e.message.clone()),
            Failure::UnexpectedStatus { body, .. } | Failure::Malformed { body, .. } => {
                if body.is_empty() {
                    None
                } else {
                    Some(body.clone())
                }
            }
            Failure::MissingPrerequisite(_) => None,
        }
    }
}

impl From<TransportError> for Failure {
    fn from(e: TransportError) -> Self {
        Failure::Transport(e)
    }
}
