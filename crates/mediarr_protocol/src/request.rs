//! Request/response shapes and the per-backend descriptor consumed by the
//! resilient client.

use crate::defaults;
use crate::types::ServiceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

// ============================================================================
// HTTP Method
// ============================================================================

/// The subset of HTTP methods the backends use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Client Request / Response
// ============================================================================

/// One backend call, relative to the target descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRequest {
    pub method: Method,
    /// Endpoint path relative to the backend's API prefix, e.g. "series/lookup".
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ClientRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The decoded outcome of a successful backend call.
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    /// Decoded JSON body; `Value::Null` when the backend returned nothing.
    pub body: Value,
    pub elapsed: Duration,
}

// ============================================================================
// Retry Policy
// ============================================================================

/// How many times to try a call and how long to wait between tries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff_multiplier: f64,
    /// Upper bound of the uniform jitter added to every computed delay.
    pub jitter: Duration,
    /// Hard cap applied to computed delays and Retry-After hints alike.
    pub max_delay: Duration,
    pub retryable_status: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(defaults::DEFAULT_RETRY_BASE_DELAY_MS),
            backoff_multiplier: defaults::DEFAULT_RETRY_MULTIPLIER,
            jitter: Duration::from_millis(defaults::DEFAULT_RETRY_JITTER_MS),
            max_delay: Duration::from_secs(defaults::DEFAULT_RETRY_MAX_DELAY_SECS),
            retryable_status: defaults::DEFAULT_RETRYABLE_STATUS.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status.contains(&status)
    }

    /// Deterministic backoff before `attempt` (1-based), without jitter.
    ///
    /// The wait before attempt 2 is `base_delay`; each further attempt
    /// multiplies by `backoff_multiplier`, capped at `max_delay`.
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        debug_assert!(attempt >= 2, "no backoff before the first attempt");
        let exponent = attempt.saturating_sub(2);
        let factor = self.backoff_multiplier.powi(exponent as i32);
        let millis = self.base_delay.as_millis() as f64 * factor;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

// ============================================================================
// Auth Scheme + Backend Descriptor
// ============================================================================

/// How a backend expects its credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `X-Api-Key` header (Sonarr, Radarr, Prowlarr, Bazarr, Overseerr)
    ApiKey,
    /// `X-Plex-Token` header and query parameter (Plex)
    PlexToken,
}

impl AuthScheme {
    pub fn for_service(service: ServiceKind) -> Self {
        match service {
            ServiceKind::Plex => AuthScheme::PlexToken,
            _ => AuthScheme::ApiKey,
        }
    }

    pub fn header_name(&self) -> &'static str {
        match self {
            AuthScheme::ApiKey => "X-Api-Key",
            AuthScheme::PlexToken => "X-Plex-Token",
        }
    }
}

/// Everything the resilient client needs to know about one backend.
///
/// All per-backend clients are this one shape; there is no type per
/// backend, only descriptor values.
#[derive(Debug, Clone)]
pub struct BackendDescriptor {
    pub service: ServiceKind,
    /// `http[s]://host:port[/base_path]`, no trailing slash.
    pub base_url: String,
    /// Path segment between base URL and endpoint, e.g. "api/v3".
    pub api_prefix: String,
    pub auth: AuthScheme,
    pub credential: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl BackendDescriptor {
    /// Full URL for an endpoint path.
    pub fn endpoint_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if self.api_prefix.is_empty() {
            format!("{}/{}", base, path)
        } else {
            format!("{}/{}/{}", base, self.api_prefix, path)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
