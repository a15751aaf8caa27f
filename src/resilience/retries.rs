//! Retry orchestration.
//!
//! # Responsibilities
//! - Fail fast when the service's circuit breaker is open
//! - Run up to `1 + max_retries` strictly sequential attempts
//! - Bound every attempt with the per-attempt timeout
//! - Sleep a jittered backoff between retryable failures
//! - Report the final outcome to the breaker registry
//!
//! # Design Decisions
//! - The surfaced error is always the last attempt's
//! - Non-retryable failures stop immediately, without a backoff sleep
//! - An open breaker does not consume an attempt and makes no request
//! - The payload is decoded but not validated; validation is the caller's job
//! - URLs are never logged (they carry API keys)

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ServiceConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::circuit_breaker::CircuitBreakerRegistry;
use crate::resilience::classifier::{classify, AttemptFailure};
use crate::resilience::error::ApiError;
use crate::resilience::timeouts::with_deadline;

/// Drives bounded, breaker-aware attempts against provider endpoints.
#[derive(Debug, Clone)]
pub struct RetryOrchestrator {
    http: reqwest::Client,
    breakers: Arc<CircuitBreakerRegistry>,
}

impl RetryOrchestrator {
    pub fn new(http: reqwest::Client, breakers: Arc<CircuitBreakerRegistry>) -> Self {
        Self { http, breakers }
    }

    /// Shared breaker registry.
    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    /// GET `url` under `config`'s policy and decode the JSON body into `T`.
    pub async fn call<T: DeserializeOwned>(&self, config: &ServiceConfig, url: &Url) -> Result<T, ApiError> {
        let service = config.name.as_str();
        let started = Instant::now();

        if self.breakers.is_open(service) {
            let error = ApiError::circuit_open(service);
            tracing::warn!(service = %service, kind = %error.kind, "Circuit open, failing fast");
            metrics::record_breaker_rejection(service);
            metrics::record_call(service, error.kind.as_str(), started);
            return Err(error);
        }

        let mut attempt: u32 = 0;
        loop {
            let attempt_started = Instant::now();

            match with_deadline(config.timeout(), self.attempt::<T>(url)).await {
                Ok(payload) => {
                    metrics::record_attempt(service, "success");
                    metrics::record_call(service, "success", started);
                    self.breakers.record_success(service);

                    tracing::info!(
                        service = %service,
                        attempts = attempt + 1,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        outcome = "success",
                        "Service call succeeded"
                    );
                    return Ok(payload);
                }
                Err(failure) => {
                    let error = classify(service, &failure);
                    metrics::record_attempt(service, error.kind.as_str());

                    tracing::warn!(
                        service = %service,
                        attempt,
                        elapsed_ms = attempt_started.elapsed().as_millis() as u64,
                        kind = %error.kind,
                        status = ?error.status,
                        error = %failure,
                        "Attempt failed"
                    );

                    if error.retryable && attempt < config.max_retries {
                        let delay = calculate_backoff(config, attempt);
                        tracing::info!(
                            service = %service,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying after backoff"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    self.breakers.record_failure(service);
                    metrics::record_call(service, error.kind.as_str(), started);

                    tracing::error!(
                        service = %service,
                        attempts = attempt + 1,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        kind = %error.kind,
                        status = ?error.status,
                        retryable = error.retryable,
                        "Service call failed"
                    );
                    return Err(error);
                }
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(&self, url: &Url) -> Result<T, AttemptFailure> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AttemptFailure::Transport(e.without_url()))?;
        serde_json::from_slice(&bytes).map_err(AttemptFailure::MalformedBody)
    }
}
