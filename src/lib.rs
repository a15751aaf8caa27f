//! Resilient client for the planner's external services.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller (route calculation, weather refresh)
//!        │
//!        ▼
//!   ┌───────────────────────────── providers ─────────────────────────────┐
//!   │ ServiceClient::get_route / get_alternate_route / get_forecast       │
//!   │     build_url ──▶ RetryOrchestrator ──▶ map_response ──▶ result     │
//!   └──────────────────────────────┬──────────────────────────────────────┘
//!                                  │
//!   ┌──────────────────────────── resilience ─────────────────────────────┐
//!   │ circuit_breaker ─▶ timeouts ─▶ classifier ─▶ backoff ─▶ (repeat)    │
//!   └─────────────────────────────────────────────────────────────────────┘
//!        config (TOML, validated)          observability (tracing, metrics)
//! ```

pub mod config;
pub mod observability;
pub mod providers;
pub mod resilience;

pub use config::ClientConfig;
pub use providers::{ForecastResult, GeoPoint, RouteProvider, RouteResult, ServiceClient, ServiceError};
pub use resilience::{ApiError, ApiErrorKind, CircuitBreakerRegistry};
