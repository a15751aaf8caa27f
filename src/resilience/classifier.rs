//! Attempt outcome classification.
//!
//! # Rules (first match wins)
//! ```text
//! per-attempt timeout           → timeout        (transient)
//! HTTP 429                      → rateLimited    (transient)
//! HTTP >= 500                   → badResponse    (transient)
//! HTTP 4xx                      → badResponse    (never retried)
//! transport / malformed body    → networkError   (transient)
//! anything else                 → unknown        (never retried)
//! ```
//!
//! Classification is pure. It does not look at breaker state or at the
//! attempt index; the orchestrator combines `retryable` with its own attempt
//! budget.

use std::fmt;

use crate::resilience::error::{ApiError, ApiErrorKind};

/// Longest provider body excerpt copied into an error message.
const BODY_EXCERPT_LEN: usize = 200;

/// Why a single attempt did not produce a payload.
#[derive(Debug)]
pub enum AttemptFailure {
    /// The per-attempt deadline elapsed.
    TimedOut,
    /// The provider answered with a non-success status.
    Status { status: u16, body: String },
    /// The request never completed at the transport level.
    Transport(reqwest::Error),
    /// A success status carried a body that is not valid JSON.
    MalformedBody(serde_json::Error),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::TimedOut => write!(f, "timed out"),
            AttemptFailure::Status { status, .. } => write!(f, "HTTP {}", status),
            AttemptFailure::Transport(e) => write!(f, "transport error: {}", e),
            AttemptFailure::MalformedBody(e) => write!(f, "malformed body: {}", e),
        }
    }
}

/// Map one attempt failure to an [`ApiError`].
pub fn classify(service: &str, failure: &AttemptFailure) -> ApiError {
    match failure {
        AttemptFailure::TimedOut => ApiError::new(
            ApiErrorKind::Timeout,
            None,
            true,
            format!("{} did not answer in time", service),
        ),
        AttemptFailure::Status { status, body } => classify_status(service, *status, body),
        AttemptFailure::Transport(e) if e.is_timeout() => ApiError::new(
            ApiErrorKind::Timeout,
            None,
            true,
            format!("{} timed out: {}", service, e),
        ),
        AttemptFailure::Transport(e)
            if e.is_connect() || e.is_request() || e.is_body() || e.is_decode() || e.is_redirect() =>
        {
            ApiError::new(
                ApiErrorKind::NetworkError,
                e.status().map(|s| s.as_u16()),
                true,
                format!("{} unreachable: {}", service, e),
            )
        }
        AttemptFailure::Transport(e) => ApiError::new(
            ApiErrorKind::Unknown,
            e.status().map(|s| s.as_u16()),
            false,
            format!("{} request failed: {}", service, e),
        ),
        AttemptFailure::MalformedBody(e) => ApiError::new(
            ApiErrorKind::NetworkError,
            None,
            true,
            format!("{} sent a malformed response: {}", service, e),
        ),
    }
}

fn classify_status(service: &str, status: u16, body: &str) -> ApiError {
    let message = describe_status(service, status, body);
    match status {
        429 => ApiError::new(ApiErrorKind::RateLimited, Some(status), true, message),
        500..=599 => ApiError::new(ApiErrorKind::BadResponse, Some(status), true, message),
        400..=499 => ApiError::new(ApiErrorKind::BadResponse, Some(status), false, message),
        _ => ApiError::new(ApiErrorKind::Unknown, Some(status), false, message),
    }
}

fn describe_status(service: &str, status: u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {} from {}", status, service);
    }
    let excerpt: String = body.chars().take(BODY_EXCERPT_LEN).collect();
    format!("HTTP {} from {}: {}", status, service, excerpt)
}
