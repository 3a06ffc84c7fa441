//! Resilient request execution for backend calls.
//!
//! One [`BackendClient`] wraps one backend: it injects the credential,
//! enforces the per-attempt timeout, retries transient failures with
//! exponential backoff and jitter, classifies whatever goes wrong, and
//! returns either a decoded response or exactly one [`ClientError`]
//! describing the last failure with the attempt count attached.
//!
//! Retries for one logical call are strictly sequential. Dropping the
//! call future cancels the in-flight attempt at its next await point and
//! the pooled connection is returned in a clean state, so unrelated calls
//! keep working.

use mediarr_protocol::{
    defaults, AuthScheme, BackendDescriptor, ClientError, ClientRequest, ClientResponse,
    ErrorKind, Method, ServiceKind,
};
use rand::Rng;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Idle connections kept per backend.
const MAX_IDLE_CONNECTIONS: usize = 8;

/// Longest failure-body excerpt carried into an error message.
const MAX_ERROR_BODY_LEN: usize = 200;

// ============================================================================
// Backend Client
// ============================================================================

/// Generic per-backend client. All backends share this one type; only the
/// descriptor value differs.
#[derive(Debug, Clone)]
pub struct BackendClient {
    descriptor: BackendDescriptor,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(descriptor: BackendDescriptor) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(descriptor.timeout)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .build()
            .map_err(|e| {
                ClientError::new(
                    ErrorKind::Unknown,
                    format!("failed to build HTTP client: {e}"),
                )
            })?;
        Ok(Self { descriptor, http })
    }

    pub fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    pub fn service(&self) -> ServiceKind {
        self.descriptor.service
    }

    /// Execute a request under the descriptor's retry policy.
    pub async fn execute(&self, request: ClientRequest) -> Result<ClientResponse, ClientError> {
        let policy = self.descriptor.retry.clone();
        let url = self.descriptor.endpoint_url(&request.path);
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(
                service = %self.service(),
                method = %request.method,
                %url,
                attempt,
                "dispatching request"
            );

            let failure = match self.attempt(&request, &url).await {
                Ok((status, body)) => {
                    return Ok(ClientResponse {
                        status,
                        body,
                        elapsed: started.elapsed(),
                    });
                }
                Err(failure) => failure,
            };

            let retryable = match failure.status {
                Some(status) => policy.is_retryable_status(status),
                None => failure.kind == ErrorKind::Network,
            };

            if !retryable || attempt >= policy.max_attempts {
                return Err(ClientError {
                    kind: failure.kind,
                    message: failure.message,
                    status: failure.status,
                    attempts: attempt,
                });
            }

            // A Retry-After hint from the backend wins over computed
            // backoff; both respect the policy's cap.
            let delay = match failure.retry_after {
                Some(hint) => hint.min(policy.max_delay),
                None => {
                    let backoff = policy.backoff_before(attempt + 1);
                    (backoff + jitter_within(policy.jitter)).min(policy.max_delay)
                }
            };

            warn!(
                service = %self.service(),
                attempt,
                max_attempts = policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "attempt failed ({}), retrying",
                failure.message
            );

            tokio::time::sleep(delay).await;
        }
    }

    /// One attempt: send, decode, classify.
    async fn attempt(
        &self,
        request: &ClientRequest,
        url: &str,
    ) -> Result<(u16, Value), AttemptFailure> {
        let service = self.descriptor.service.display_name();

        let mut builder = self
            .http
            .request(convert_method(request.method), url)
            .header(
                self.descriptor.auth.header_name(),
                &self.descriptor.credential,
            )
            .header("Accept", "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        // Plex also wants the token as a query parameter.
        if self.descriptor.auth == AuthScheme::PlexToken {
            builder = builder.query(&[("X-Plex-Token", self.descriptor.credential.as_str())]);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AttemptFailure::network(format!(
                    "{service}: request timed out after {}s",
                    self.descriptor.timeout.as_secs()
                ))
            } else if e.is_connect() {
                AttemptFailure::network(format!(
                    "{service}: could not connect to {}",
                    self.descriptor.base_url
                ))
            } else {
                AttemptFailure {
                    kind: ErrorKind::Unknown,
                    message: format!("{service}: request failed: {e}"),
                    status: None,
                    retry_after: None,
                }
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let retry_after = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            let detail = truncate(body.trim(), MAX_ERROR_BODY_LEN);
            let message = if detail.is_empty() {
                format!("{service}: HTTP {status}")
            } else {
                format!("{service}: HTTP {status} - {detail}")
            };
            return Err(AttemptFailure {
                kind: ErrorKind::from_status(status),
                message,
                status: Some(status),
                retry_after,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            AttemptFailure::network(format!("{service}: failed to read response body: {e}"))
        })?;

        // Some endpoints legitimately return nothing.
        if bytes.is_empty() {
            return Ok((status, Value::Null));
        }

        let body = serde_json::from_slice(&bytes).map_err(|e| AttemptFailure {
            kind: ErrorKind::Unknown,
            message: format!("{service}: invalid JSON in response: {e}"),
            status: Some(status),
            retry_after: None,
        })?;

        Ok((status, body))
    }

    // ------------------------------------------------------------------
    // Convenience wrappers
    // ------------------------------------------------------------------

    pub async fn get(&self, path: &str) -> Result<ClientResponse, ClientError> {
        self.execute(ClientRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ClientResponse, ClientError> {
        self.execute(ClientRequest::post(path).body(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ClientResponse, ClientError> {
        self.execute(ClientRequest::put(path).body(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ClientResponse, ClientError> {
        self.execute(ClientRequest::delete(path)).await
    }

    /// Probe the backend's status endpoint.
    pub async fn system_status(&self) -> Result<ClientResponse, ClientError> {
        self.get(defaults::status_endpoint(self.service())).await
    }

    /// True when the backend answers its status probe.
    pub async fn ping(&self) -> bool {
        self.system_status().await.is_ok()
    }
}

// ============================================================================
// Attempt failure + helpers
// ============================================================================

/// What one attempt produced when it did not produce a response.
struct AttemptFailure {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    retry_after: Option<Duration>,
}

impl AttemptFailure {
    fn network(message: String) -> Self {
        Self {
            kind: ErrorKind::Network,
            message,
            status: None,
            retry_after: None,
        }
    }
}

fn convert_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Delta-seconds `Retry-After` only; the HTTP-date form is ignored.
fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn jitter_within(bound: Duration) -> Duration {
    let millis = bound.as_millis() as u64;
    if millis == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mediarr_protocol::RetryPolicy;

    fn descriptor() -> BackendDescriptor {
        BackendDescriptor {
            service: ServiceKind::Sonarr,
            base_url: "http://localhost:8989".to_string(),
            api_prefix: "api/v3".to_string(),
            auth: AuthScheme::ApiKey,
            credential: "key".to_string(),
            timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }

    #[test]
    fn test_client_is_cheap_to_clone_per_descriptor() {
        let client = BackendClient::new(descriptor()).unwrap();
        let clone = client.clone();
        assert_eq!(clone.service(), ServiceKind::Sonarr);
    }

    #[test]
    fn test_jitter_respects_bound() {
        let bound = Duration::from_millis(50);
        for _ in 0..100 {
            assert!(jitter_within(bound) <= bound);
        }
        assert_eq!(jitter_within(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("héllo", 2), "hé");
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(convert_method(Method::Get), reqwest::Method::GET);
        assert_eq!(convert_method(Method::Delete), reqwest::Method::DELETE);
    }
}
