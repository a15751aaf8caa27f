//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, thresholds > 0)
//! - Check every provider has a backoff delay for each retry
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationIssue>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{ClientConfig, ServiceConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationIssue {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a whole client configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    validate_service("directions", &config.directions.0, &mut issues);
    validate_service("routing", &config.routing.0, &mut issues);
    validate_service("weather", &config.weather.0, &mut issues);

    if config.breaker.failure_threshold == 0 {
        issues.push(ValidationIssue::new(
            "breaker.failure_threshold",
            "must be greater than zero",
        ));
    }
    if config.breaker.cooldown_secs == 0 {
        issues.push(ValidationIssue::new(
            "breaker.cooldown_secs",
            "must be greater than zero",
        ));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => issues.push(ValidationIssue::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", other),
        )),
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn validate_service(section: &str, service: &ServiceConfig, issues: &mut Vec<ValidationIssue>) {
    if service.name.trim().is_empty() {
        issues.push(ValidationIssue::new(
            format!("{}.name", section),
            "must not be empty",
        ));
    }

    if let Err(e) = Url::parse(&service.base_url) {
        issues.push(ValidationIssue::new(
            format!("{}.base_url", section),
            format!("invalid URL '{}': {}", service.base_url, e),
        ));
    }

    if service.timeout_ms == 0 {
        issues.push(ValidationIssue::new(
            format!("{}.timeout_ms", section),
            "must be greater than zero",
        ));
    }

    if service.retry_delays_ms.len() < service.max_retries as usize {
        issues.push(ValidationIssue::new(
            format!("{}.retry_delays_ms", section),
            format!(
                "has {} entries but max_retries is {}",
                service.retry_delays_ms.len(),
                service.max_retries
            ),
        ));
    }
}
