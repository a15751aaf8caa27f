//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Capability call:
//!     → circuit_breaker.rs (fail fast while the service is open)
//!     → timeouts.rs (deadline around each attempt)
//!     → classifier.rs (attempt outcome → ApiError)
//!     → backoff.rs (jittered delay before the next attempt)
//!     → circuit_breaker.rs (record final success/failure)
//! retries.rs drives the loop.
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every provider call has a deadline
//! - Client errors (4xx) are never retried
//! - Circuit breaker prevents cascading failures
//! - Breaker state lives in an owned registry, never in globals

pub mod backoff;
pub mod circuit_breaker;
pub mod classifier;
pub mod error;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{BreakerState, CircuitBreakerRegistry, Clock, MockClock, SystemClock};
pub use error::{ApiError, ApiErrorKind};
pub use retries::RetryOrchestrator;
