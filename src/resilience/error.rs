//! Failure taxonomy surfaced by the retry orchestrator.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Closed set of failure kinds a provider call can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiErrorKind {
    /// The attempt exceeded its per-attempt deadline.
    Timeout,
    /// The provider answered with an error status or an in-band failure.
    BadResponse,
    /// HTTP 429.
    RateLimited,
    /// DNS, connect, malformed body, or an open circuit.
    NetworkError,
    /// Anything the classifier does not recognise.
    Unknown,
}

impl ApiErrorKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorKind::Timeout => "timeout",
            ApiErrorKind::BadResponse => "badResponse",
            ApiErrorKind::RateLimited => "rateLimited",
            ApiErrorKind::NetworkError => "networkError",
            ApiErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classified failure. Created fresh per failed attempt; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind}: {message}")]
pub struct ApiError {
    /// Failure kind.
    pub kind: ApiErrorKind,
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    /// Whether the failure is transient and worth trying again later.
    pub retryable: bool,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, status: Option<u16>, retryable: bool, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            retryable,
            message: message.into(),
        }
    }

    /// Fast-fail error for a service whose breaker is open.
    pub fn circuit_open(service: &str) -> Self {
        Self::new(
            ApiErrorKind::NetworkError,
            None,
            false,
            format!("circuit breaker open for {}", service),
        )
    }

    /// Provider reported failure inside an otherwise successful response.
    pub fn in_band(provider: &str, status: &str, detail: Option<&str>) -> Self {
        let message = match detail {
            Some(detail) => format!("{} returned status {}: {}", provider, status, detail),
            None => format!("{} returned status {}", provider, status),
        };
        Self::new(ApiErrorKind::BadResponse, None, false, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::new(ApiErrorKind::RateLimited, Some(429), true, "HTTP 429 from weather");
        assert_eq!(err.to_string(), "rateLimited: HTTP 429 from weather");
    }

    #[test]
    fn test_circuit_open_is_not_retryable() {
        let err = ApiError::circuit_open("directions");
        assert_eq!(err.kind, ApiErrorKind::NetworkError);
        assert!(!err.retryable);
        assert_eq!(err.status, None);
        assert!(err.message.contains("directions"));
    }

    #[test]
    fn test_kind_serializes_camel_case() {
        let err = ApiError::in_band("google-directions", "ZERO_RESULTS", None);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "badResponse");
        assert_eq!(json["retryable"], false);
        assert_eq!(json["message"], "google-directions returned status ZERO_RESULTS");
    }
}
