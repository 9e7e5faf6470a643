//! HTTP client for the school management API
//!
//! Every call goes through [`ApiClient::request`]: one network round trip
//! under the configured timeout, with transport failures returned as a
//! [`TransportError`] value instead of being propagated.

use std::time::{Duration, Instant};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::common::{Config, Error, Failure, Result, TransportError};

/// Outcome of a single HTTP call
pub type CallResult = std::result::Result<ApiResponse, TransportError>;

/// Status code and raw body of a completed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

/// How the server refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// 401: missing or unacceptable credentials
    Unauthorized,
    /// 403: valid credentials, insufficient role
    Forbidden,
}

impl Rejection {
    pub fn describe(&self) -> &'static str {
        match self {
            Rejection::Unauthorized => "401 Unauthorized",
            Rejection::Forbidden => "403 Forbidden",
        }
    }
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self.status {
            401 => Some(Rejection::Unauthorized),
            403 => Some(Rejection::Forbidden),
            _ => None,
        }
    }

    /// Decode the body into a typed schema
    ///
    /// `reason` becomes the failure message when the body does not fit.
    pub fn decode<T: DeserializeOwned>(&self, reason: &str) -> std::result::Result<T, Failure> {
        serde_json::from_str(&self.body)
            .map_err(|e| Failure::malformed(format!("{} ({})", reason, e), &self.body))
    }
}

/// Require a specific status code
pub fn expect_status(result: CallResult, expected: u16) -> std::result::Result<ApiResponse, Failure> {
    let response = result?;
    if response.status != expected {
        return Err(Failure::unexpected_status(
            expected,
            response.status,
            &response.body,
        ));
    }
    Ok(response)
}

/// Require 200 and a body matching `T`
pub fn expect_json<T: DeserializeOwned>(
    result: CallResult,
    reason: &str,
) -> std::result::Result<T, Failure> {
    expect_status(result, 200)?.decode(reason)
}

/// Require 200 and a JSON array
///
/// Entries stay untyped so one record with an unexpected field type does
/// not turn the whole listing into a failure.
pub fn expect_list(result: CallResult) -> std::result::Result<Vec<Value>, Failure> {
    expect_json(result, "Response is not a list")
}

/// Client bound to one API root
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client with a fixed per-call timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("edu-smoke/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::HttpClient)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint relative to the base path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Perform one call
    ///
    /// The body is sent as JSON, the token as `Authorization: Bearer`, and
    /// query pairs are appended to the URL.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
        query: &[(&str, &str)],
    ) -> CallResult {
        let url = self.url(endpoint);
        let mut builder = self.http.request(method.clone(), &url);

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(%method, %url, error = %e, "request failed");
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(
            %method,
            %url,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        Ok(ApiResponse { status, body })
    }

    pub async fn get(&self, endpoint: &str, token: Option<&str>) -> CallResult {
        self.request(Method::GET, endpoint, None::<&()>, token, &[])
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        token: Option<&str>,
    ) -> CallResult {
        self.request(Method::POST, endpoint, Some(body), token, &[])
            .await
    }

    /// Update the record `id` in a collection
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        id: &str,
        body: &B,
        token: &str,
    ) -> CallResult {
        self.request(Method::PUT, endpoint, Some(body), Some(token), &[("id", id)])
            .await
    }

    /// Delete the record `id` from a collection
    pub async fn delete(&self, endpoint: &str, id: &str, token: &str) -> CallResult {
        self.request(
            Method::DELETE,
            endpoint,
            None::<&()>,
            Some(token),
            &[("id", id)],
        )
        .await
    }
}
