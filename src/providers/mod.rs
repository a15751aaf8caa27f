//! Provider capabilities.
//!
//! # Data Flow
//! ```text
//! ServiceClient capability (client.rs)
//!     → <provider>::build_url
//!     → RetryOrchestrator::call (raw serde_json::Value)
//!     → <provider>::map_response (validate + convert units)
//!     → RouteResult / ForecastResult
//! ```
//!
//! # Design Decisions
//! - Payloads cross a typed validation boundary before anything reads them
//! - Shape violations are ValidationErrors and are never retried
//! - In-band failure statuses become non-retryable badResponse errors

pub mod client;
pub mod directions;
pub mod polyline;
pub mod routing;
pub mod types;
pub mod weather;

use url::Url;

pub use client::{RouteProvider, ServiceClient};
pub use types::{ForecastResult, GeoPoint, LngLat, RouteResult, ServiceError, ServiceResult, ValidationError};

/// Join `path` onto `base_url`, keeping any path prefix of the base.
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
}
