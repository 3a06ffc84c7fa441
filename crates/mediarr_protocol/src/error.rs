//! Failure taxonomy for backend calls.
//!
//! Every failed call collapses to exactly one [`ClientError`] carrying the
//! kind of the last observed failure and the number of attempts made.
//! Intermediate failures are logged, never aggregated into the result.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Kind
// ============================================================================

/// Classification of a backend call failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection failure or per-attempt timeout
    Network,
    /// 401 / 403 - credential rejected
    Auth,
    /// 429 - backend asked us to slow down
    RateLimited,
    /// 404 - resource or endpoint does not exist
    NotFound,
    /// 400 / 422 - backend rejected the request shape
    Validation,
    /// Other 5xx - backend-side failure
    Server,
    /// Anything that fits no other bucket
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ErrorKind::Auth,
            404 => ErrorKind::NotFound,
            400 | 422 => ErrorKind::Validation,
            429 => ErrorKind::RateLimited,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }

    /// Whether this kind is even a candidate for retry.
    ///
    /// The retry policy's status set makes the final call; Auth,
    /// Validation and NotFound never retry regardless of policy.
    pub fn is_retry_candidate(&self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::RateLimited | ErrorKind::Server
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Client Error
// ============================================================================

/// The single failure record returned after a call is abandoned.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message} ({kind}, {attempts} attempt(s))")]
pub struct ClientError {
    pub kind: ErrorKind,
    pub message: String,
    /// Last HTTP status observed, if the failure came from a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Attempts actually made before giving up.
    pub attempts: u32,
}

impl ClientError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            attempts: 1,
        }
    }

    /// Build from an HTTP status, classifying it.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::from_status(status),
            message: message.into(),
            status: Some(status),
            attempts: 1,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ErrorKind::from_status(401), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(422), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(429), ErrorKind::RateLimited);
        assert_eq!(ErrorKind::from_status(500), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::Server);
        assert_eq!(ErrorKind::from_status(302), ErrorKind::Unknown);
    }

    #[test]
    fn test_retry_candidates() {
        assert!(ErrorKind::Network.is_retry_candidate());
        assert!(ErrorKind::RateLimited.is_retry_candidate());
        assert!(ErrorKind::Server.is_retry_candidate());
        assert!(!ErrorKind::Auth.is_retry_candidate());
        assert!(!ErrorKind::NotFound.is_retry_candidate());
        assert!(!ErrorKind::Validation.is_retry_candidate());
    }

    #[test]
    fn test_error_display_includes_attempts() {
        let err = ClientError::from_status(503, "Sonarr: HTTP 503").with_attempts(3);
        let text = err.to_string();
        assert!(text.contains("server"));
        assert!(text.contains("3 attempt"));
    }

    #[test]
    fn test_error_serde_roundtrip() {
        let err = ClientError::from_status(429, "slow down").with_attempts(2);
        let json = serde_json::to_string(&err).unwrap();
        let back: ClientError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, ErrorKind::RateLimited);
        assert_eq!(back.status, Some(429));
        assert_eq!(back.attempts, 2);
    }
}
