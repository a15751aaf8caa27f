//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resilience + providers produce:
//!     → logging.rs (structured log events, one line per event)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - A call ID flows through every event of one capability call
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
