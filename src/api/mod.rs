//! School management API access
//!
//! Typed request/response schemas and the HTTP client the scenarios use.

pub mod client;
pub mod types;

pub use client::{expect_json, expect_list, expect_status, ApiClient, ApiResponse, CallResult, Rejection};
pub use types::{Resource, ResourceKind, Role};
