//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service
//! client. All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the service client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Primary driving-directions provider.
    pub directions: DirectionsConfig,

    /// Alternate routing provider.
    pub routing: RoutingConfig,

    /// Weather-forecast provider.
    pub weather: WeatherConfig,

    /// Circuit breaker thresholds shared by all services.
    pub breaker: BreakerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ClientConfig {
    /// Iterate over every provider's service settings.
    pub fn services(&self) -> [&ServiceConfig; 3] {
        [&self.directions.0, &self.routing.0, &self.weather.0]
    }
}

/// Per-provider call policy. Immutable once loaded.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Service name, used as the circuit breaker key and in logs.
    pub name: String,

    /// Provider base URL (scheme + host, optional path prefix).
    pub base_url: String,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Retries after the initial attempt.
    pub max_retries: u32,

    /// Base backoff delay before each retry, in milliseconds.
    pub retry_delays_ms: Vec<u64>,
}

impl ServiceConfig {
    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base backoff delay before the retry that follows `attempt`.
    ///
    /// Falls back to the last configured delay if the list is shorter than
    /// `max_retries` (rejected by validation, but tolerated here).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let ms = self
            .retry_delays_ms
            .get(attempt as usize)
            .or_else(|| self.retry_delays_ms.last())
            .copied()
            .unwrap_or(0);
        Duration::from_millis(ms)
    }
}

/// Driving-directions provider settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct DirectionsConfig(pub ServiceConfig);

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self(ServiceConfig {
            name: "google-directions".to_string(),
            base_url: "https://maps.googleapis.com".to_string(),
            timeout_ms: 10_000,
            max_retries: 3,
            retry_delays_ms: vec![1_000, 2_000, 4_000],
        })
    }
}

/// Alternate routing provider settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct RoutingConfig(pub ServiceConfig);

impl Default for RoutingConfig {
    fn default() -> Self {
        Self(ServiceConfig {
            name: "openrouteservice".to_string(),
            base_url: "https://api.openrouteservice.org".to_string(),
            timeout_ms: 10_000,
            max_retries: 3,
            retry_delays_ms: vec![1_000, 2_000, 4_000],
        })
    }
}

/// Weather-forecast provider settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeatherConfig(pub ServiceConfig);

impl Default for WeatherConfig {
    fn default() -> Self {
        Self(ServiceConfig {
            name: "openweathermap".to_string(),
            base_url: "https://api.openweathermap.org".to_string(),
            timeout_ms: 5_000,
            max_retries: 2,
            retry_delays_ms: vec![500, 1_000],
        })
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,

    /// Seconds after the last failure before an open breaker lets a call through.
    pub cooldown_secs: u64,
}

impl BreakerConfig {
    /// Cooldown as a duration.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format: "pretty" for development, "json" for production.
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
