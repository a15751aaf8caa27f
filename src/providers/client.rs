//! Capability entry points used by the rest of the application.
//!
//! # Responsibilities
//! - Build provider URLs from the configured base URLs
//! - Delegate the network call to the retry orchestrator
//! - Validate and map the payload into canonical results
//! - Tag every event of one call with a call ID

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ClientConfig, ServiceConfig};
use crate::providers::types::{ForecastResult, GeoPoint, RouteResult, ServiceResult};
use crate::providers::{directions, routing, weather};
use crate::resilience::circuit_breaker::CircuitBreakerRegistry;
use crate::resilience::retries::RetryOrchestrator;

/// Which routing backend answers a route request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteProvider {
    #[default]
    Directions,
    Routing,
}

impl fmt::Display for RouteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteProvider::Directions => f.write_str("directions"),
            RouteProvider::Routing => f.write_str("routing"),
        }
    }
}

impl FromStr for RouteProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directions" => Ok(RouteProvider::Directions),
            "routing" => Ok(RouteProvider::Routing),
            other => Err(format!("unknown route provider '{}', expected 'directions' or 'routing'", other)),
        }
    }
}

/// Resilient client for all external providers.
///
/// Cheap to clone; clones share the HTTP pool and the breaker registry.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    orchestrator: RetryOrchestrator,
    config: Arc<ClientConfig>,
}

impl ServiceClient {
    /// Create a client with a default HTTP client.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    /// Create a client on a caller-supplied HTTP client.
    pub fn with_http(config: ClientConfig, http: reqwest::Client) -> Self {
        let breakers = Arc::new(CircuitBreakerRegistry::new(&config.breaker));
        Self::with_parts(config, http, breakers)
    }

    /// Create a client sharing an existing breaker registry.
    pub fn with_parts(config: ClientConfig, http: reqwest::Client, breakers: Arc<CircuitBreakerRegistry>) -> Self {
        Self {
            orchestrator: RetryOrchestrator::new(http, breakers),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        self.orchestrator.breakers()
    }

    /// Driving route from the primary directions provider.
    pub async fn get_route(&self, origin: GeoPoint, destination: GeoPoint, api_key: &str) -> ServiceResult<RouteResult> {
        let service = &self.config.directions.0;
        let url = directions::build_url(service, origin, destination, api_key)?;
        let payload = self.fetch(service, url).await?;
        Self::checked(service, directions::map_response(&service.name, payload))
    }

    /// Driving route from the alternate routing provider.
    pub async fn get_alternate_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        api_key: &str,
    ) -> ServiceResult<RouteResult> {
        let service = &self.config.routing.0;
        let url = routing::build_url(service, origin, destination, api_key)?;
        let payload = self.fetch(service, url).await?;
        Self::checked(service, routing::map_response(&service.name, payload))
    }

    /// Driving route from the chosen provider.
    pub async fn route_with(
        &self,
        provider: RouteProvider,
        origin: GeoPoint,
        destination: GeoPoint,
        api_key: &str,
    ) -> ServiceResult<RouteResult> {
        match provider {
            RouteProvider::Directions => self.get_route(origin, destination, api_key).await,
            RouteProvider::Routing => self.get_alternate_route(origin, destination, api_key).await,
        }
    }

    /// Current conditions (first forecast slot) at `location`.
    pub async fn get_forecast(&self, location: GeoPoint, api_key: &str) -> ServiceResult<ForecastResult> {
        let service = &self.config.weather.0;
        let url = weather::build_url(service, location, api_key)?;
        let payload = self.fetch(service, url).await?;
        Self::checked(service, weather::map_response(&service.name, payload))
    }

    async fn fetch(&self, service: &ServiceConfig, url: url::Url) -> ServiceResult<Value> {
        let span = tracing::info_span!(
            "service_call",
            service = %service.name,
            call_id = %Uuid::new_v4(),
        );
        let payload = self
            .orchestrator
            .call::<Value>(service, &url)
            .instrument(span)
            .await?;
        Ok(payload)
    }

    fn checked<T>(service: &ServiceConfig, result: ServiceResult<T>) -> ServiceResult<T> {
        if let Err(e) = &result {
            tracing::warn!(service = %service.name, error = %e, "Provider response rejected");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::ServiceError;
    use crate::resilience::error::ApiErrorKind;

    #[test]
    fn test_route_provider_parse() {
        assert_eq!("directions".parse::<RouteProvider>().unwrap(), RouteProvider::Directions);
        assert_eq!("routing".parse::<RouteProvider>().unwrap(), RouteProvider::Routing);
        assert!("bing".parse::<RouteProvider>().is_err());
        assert_eq!(RouteProvider::Routing.to_string(), "routing");
    }

    #[tokio::test]
    async fn test_open_breaker_blocks_capability() {
        let client = ServiceClient::new(ClientConfig::default());
        let name = client.config().weather.0.name.clone();
        for _ in 0..client.breakers().threshold() {
            client.breakers().record_failure(&name);
        }

        let err = client.get_forecast(GeoPoint::new(0.0, 0.0), "key").await.unwrap_err();
        assert_eq!(err.kind(), Some(ApiErrorKind::NetworkError));
        assert!(!err.is_retryable());

        // Other providers are unaffected.
        assert!(!client.breakers().is_open(&client.config().directions.0.name));
    }

    #[tokio::test]
    async fn test_bad_base_url_is_reported() {
        let mut config = ClientConfig::default();
        config.routing.0.base_url = "::nope".to_string();
        let client = ServiceClient::new(config);

        let err = client
            .get_alternate_route(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), "key")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidUrl(_)));
    }
}
