//! Circuit breaker registry for provider protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: provider assumed down, requests fail fast
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive_failures >= threshold
//! Open → Closed: any success, or cooldown elapsed since last failure
//!                (checked lazily by is_open)
//! ```
//!
//! # Design Decisions
//! - Per-service breaker (not global), created on first reference
//! - Fail fast in Open state (no waiting for timeout)
//! - Cooldown expiry resets the counter to zero: the next call is a probe,
//!   and re-opening takes another full run of `threshold` failures
//! - Entries live in a DashMap so each service is guarded by its own shard lock

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Source of monotonic time for cooldown checks.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic cooldown tests.
///
/// Public so integration tests and embedding crates can drive breaker
/// cooldowns without sleeping. Clones share the same elapsed time.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move time forward.
    pub fn advance(&self, duration: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += duration;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        self.start + elapsed
    }
}

/// Mutable breaker state for one service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BreakerState {
    pub consecutive_failures: u32,
    pub last_failure: Option<Instant>,
    pub open: bool,
}

/// Registry of per-service circuit breakers.
pub struct CircuitBreakerRegistry {
    states: DashMap<String, BreakerState>,
    threshold: u32,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
}

impl CircuitBreakerRegistry {
    /// Create a registry on the system clock.
    pub fn new(config: &BreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a registry reading time from `clock`.
    pub fn with_clock(config: &BreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            states: DashMap::new(),
            threshold: config.failure_threshold.max(1),
            cooldown: config.cooldown(),
            clock,
        }
    }

    /// Whether calls to `service` must fail fast.
    ///
    /// Resets an open breaker whose cooldown has elapsed before answering.
    pub fn is_open(&self, service: &str) -> bool {
        let mut entry = self.states.entry(service.to_string()).or_default();
        let state = entry.value_mut();
        if !state.open {
            return false;
        }

        let cooled_down = state
            .last_failure
            .map(|at| self.clock.now().saturating_duration_since(at) >= self.cooldown)
            .unwrap_or(true);

        if cooled_down {
            *state = BreakerState::default();
            drop(entry);
            tracing::info!(service = %service, "Circuit breaker cooldown elapsed, allowing probe");
            metrics::record_breaker_state(service, false);
            return false;
        }

        true
    }

    /// Record a successful call: clears the counter and closes the breaker.
    pub fn record_success(&self, service: &str) {
        let mut entry = self.states.entry(service.to_string()).or_default();
        let was_open = entry.open;
        *entry.value_mut() = BreakerState::default();
        drop(entry);

        if was_open {
            tracing::info!(service = %service, "Circuit breaker closed");
            metrics::record_breaker_state(service, false);
        }
    }

    /// Record a failed call, opening the breaker at the threshold.
    pub fn record_failure(&self, service: &str) {
        let now = self.clock.now();
        let mut entry = self.states.entry(service.to_string()).or_default();
        let state = entry.value_mut();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.last_failure = Some(now);

        let failures = state.consecutive_failures;
        let opened = !state.open && failures >= self.threshold;
        if opened {
            state.open = true;
        }
        drop(entry);

        if opened {
            tracing::warn!(
                service = %service,
                consecutive_failures = failures,
                cooldown_secs = self.cooldown.as_secs(),
                "Circuit breaker opened"
            );
            metrics::record_breaker_state(service, true);
        } else {
            tracing::debug!(service = %service, consecutive_failures = failures, "Failure recorded");
        }
    }

    /// Copy of the current state, if the service has been seen.
    pub fn snapshot(&self, service: &str) -> Option<BreakerState> {
        self.states.get(service).map(|s| *s.value())
    }

    /// Consecutive failures needed to open a breaker.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("services", &self.states.len())
            .field("threshold", &self.threshold)
            .field("cooldown", &self.cooldown)
            .finish()
    }
}
