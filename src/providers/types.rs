//! Canonical results, inputs and error definitions shared by all providers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resilience::error::{ApiError, ApiErrorKind};

/// A `[longitude, latitude]` pair, longitude first.
pub type LngLat = [f64; 2];

/// A point on the map, as supplied by callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for GeoPoint {
    type Err = String;

    /// Parse `"lat,lng"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'lat,lng', got '{}'", s))?;
        let lat: f64 = lat.trim().parse().map_err(|e| format!("invalid latitude '{}': {}", lat, e))?;
        let lng: f64 = lng.trim().parse().map_err(|e| format!("invalid longitude '{}': {}", lng, e))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!("latitude {} out of range", lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!("longitude {} out of range", lng));
        }
        Ok(Self { lat, lng })
    }
}

/// Provider-agnostic route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Kilometers, rounded.
    pub distance: u32,
    /// Minutes, rounded.
    pub duration: u32,
    pub geometry: Vec<LngLat>,
}

impl RouteResult {
    /// Build from provider meters and seconds.
    pub fn from_meters_seconds(meters: f64, seconds: f64, geometry: Vec<LngLat>) -> Self {
        Self {
            distance: (meters / 1000.0).round() as u32,
            duration: (seconds / 60.0).round() as u32,
            geometry,
        }
    }
}

/// Provider-agnostic forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    /// Degrees Celsius, rounded.
    pub temperature: i32,
    /// Probability of precipitation, 0-100.
    pub rain_chance: u8,
    /// Kilometers per hour, rounded.
    pub wind_speed: u32,
    pub description: String,
}

/// Provider returned well-formed JSON outside its contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} response invalid: {reason}")]
pub struct ValidationError {
    pub provider: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(provider: &str, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by capability calls.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The call failed at the network or protocol level.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The provider answered, but not in the expected shape.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A request URL could not be built from the configured base URL.
    #[error("invalid provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ServiceError {
    /// Kind of the underlying API failure, if any.
    pub fn kind(&self) -> Option<ApiErrorKind> {
        match self {
            ServiceError::Api(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Whether trying again later could help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Api(e) if e.retryable)
    }
}

/// Result type for capability calls.
pub type ServiceResult<T> = Result<T, ServiceError>;
