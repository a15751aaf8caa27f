//! Driving-directions provider (Google Directions JSON API).
//!
//! Distance and duration come from the first leg of the first route, in
//! meters and seconds. Geometry is the route's overview polyline.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::ServiceConfig;
use crate::providers::endpoint;
use crate::providers::polyline;
use crate::providers::types::{GeoPoint, RouteResult, ServiceResult, ValidationError};
use crate::resilience::error::ApiError;

const PATH: &str = "maps/api/directions/json";

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    #[serde(default)]
    legs: Vec<Leg>,
    #[serde(default)]
    overview_polyline: Option<EncodedPolyline>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    distance: Measure,
    duration: Measure,
}

#[derive(Debug, Deserialize)]
struct Measure {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

/// Build the request URL for a driving route.
pub fn build_url(
    config: &ServiceConfig,
    origin: GeoPoint,
    destination: GeoPoint,
    api_key: &str,
) -> Result<Url, url::ParseError> {
    let mut url = endpoint(&config.base_url, PATH)?;
    url.query_pairs_mut()
        .append_pair("origin", &origin.to_string())
        .append_pair("destination", &destination.to_string())
        .append_pair("mode", "driving")
        .append_pair("key", api_key);
    Ok(url)
}

/// Validate a decoded payload and map it into a [`RouteResult`].
pub fn map_response(provider: &str, payload: Value) -> ServiceResult<RouteResult> {
    let response: DirectionsResponse = serde_json::from_value(payload)
        .map_err(|e| ValidationError::new(provider, format!("unexpected shape: {}", e)))?;

    if response.status != "OK" {
        return Err(ApiError::in_band(provider, &response.status, response.error_message.as_deref()).into());
    }

    let route = response
        .routes
        .first()
        .ok_or_else(|| ValidationError::new(provider, "no routes returned"))?;
    let leg = route
        .legs
        .first()
        .ok_or_else(|| ValidationError::new(provider, "route has no legs"))?;
    let points = route
        .overview_polyline
        .as_ref()
        .map(|p| p.points.as_str())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ValidationError::new(provider, "route has no geometry"))?;

    let geometry = polyline::decode(points)
        .map_err(|e| ValidationError::new(provider, format!("undecodable geometry: {}", e)))?;

    Ok(RouteResult::from_meters_seconds(
        leg.distance.value,
        leg.duration.value,
        geometry,
    ))
}
