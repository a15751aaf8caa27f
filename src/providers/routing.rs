//! Alternate routing provider (OpenRouteService directions, GeoJSON).
//!
//! Distance and duration are summed over the first feature's segments
//! (meters, seconds). Geometry is already a coordinate list and is used as-is.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::ServiceConfig;
use crate::providers::endpoint;
use crate::providers::types::{GeoPoint, LngLat, RouteResult, ServiceResult, ValidationError};
use crate::resilience::error::ApiError;

const PATH: &str = "v2/directions/driving-car";

#[derive(Debug, Deserialize)]
struct RoutingResponse {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

/// Build the request URL for a driving route. The provider wants `lng,lat`.
pub fn build_url(
    config: &ServiceConfig,
    origin: GeoPoint,
    destination: GeoPoint,
    api_key: &str,
) -> Result<Url, url::ParseError> {
    let mut url = endpoint(&config.base_url, PATH)?;
    url.query_pairs_mut()
        .append_pair("api_key", api_key)
        .append_pair("start", &format!("{},{}", origin.lng, origin.lat))
        .append_pair("end", &format!("{},{}", destination.lng, destination.lat));
    Ok(url)
}

/// Validate a decoded payload and map it into a [`RouteResult`].
pub fn map_response(provider: &str, payload: Value) -> ServiceResult<RouteResult> {
    let response: RoutingResponse = serde_json::from_value(payload)
        .map_err(|e| ValidationError::new(provider, format!("unexpected shape: {}", e)))?;

    if let Some(error) = response.error {
        let detail = match &error {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
            other => other.to_string(),
        };
        return Err(ApiError::in_band(provider, "error", Some(&detail)).into());
    }

    let feature = response
        .features
        .first()
        .ok_or_else(|| ValidationError::new(provider, "no routes returned"))?;

    if feature.properties.segments.is_empty() {
        return Err(ValidationError::new(provider, "route has no segments").into());
    }
    let (meters, seconds) = feature
        .properties
        .segments
        .iter()
        .fold((0.0, 0.0), |(m, s), seg| (m + seg.distance, s + seg.duration));

    let coordinates = feature
        .geometry
        .as_ref()
        .map(|g| g.coordinates.as_slice())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ValidationError::new(provider, "route has no geometry"))?;

    let geometry = coordinates
        .iter()
        .enumerate()
        .map(|(i, pair)| match pair.as_slice() {
            [lng, lat, ..] => Ok([*lng, *lat]),
            _ => Err(ValidationError::new(provider, format!("coordinate {} is incomplete", i))),
        })
        .collect::<Result<Vec<LngLat>, _>>()?;

    Ok(RouteResult::from_meters_seconds(meters, seconds, geometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::ServiceError;
    use crate::resilience::error::ApiErrorKind;
    use serde_json::json;

    fn ok_payload() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "segments": [
                        { "distance": 10_250.4, "duration": 700.0 },
                        { "distance": 4_100.0, "duration": 320.5 }
                    ],
                    "summary": { "distance": 14_350.4, "duration": 1_020.5 }
                },
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[8.681495, 49.41461], [8.687872, 49.420318, 112.0]]
                }
            }]
        })
    }

    #[test]
    fn test_sums_segments_and_keeps_coordinates() {
        let route = map_response("routing", ok_payload()).unwrap();
        assert_eq!(route.distance, 14);
        assert_eq!(route.duration, 17);
        assert_eq!(route.geometry, vec![[8.681495, 49.41461], [8.687872, 49.420318]]);
    }

    #[test]
    fn test_in_band_error_is_bad_response() {
        let payload = json!({ "error": { "code": 2010, "message": "Could not find routable point" } });
        match map_response("routing", payload).unwrap_err() {
            ServiceError::Api(e) => {
                assert_eq!(e.kind, ApiErrorKind::BadResponse);
                assert!(!e.retryable);
                assert!(e.message.contains("Could not find routable point"));
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_features_is_validation_error() {
        let err = map_response("routing", json!({ "features": [] })).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.reason == "no routes returned"));
    }

    #[test]
    fn test_missing_geometry_is_validation_error() {
        let mut payload = ok_payload();
        payload["features"][0]["geometry"]["coordinates"] = json!([]);
        let err = map_response("routing", payload).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.reason == "route has no geometry"));
    }

    #[test]
    fn test_incomplete_coordinate_is_validation_error() {
        let mut payload = ok_payload();
        payload["features"][0]["geometry"]["coordinates"] = json!([[8.68, 49.41], [8.69]]);
        let err = map_response("routing", payload).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.reason == "coordinate 1 is incomplete"));
    }

    #[test]
    fn test_build_url_uses_lng_lat_order() {
        let config = crate::config::schema::RoutingConfig::default().0;
        let url = build_url(&config, GeoPoint::new(49.41, 8.68), GeoPoint::new(49.42, 8.69), "k").unwrap();
        assert_eq!(url.path(), "/v2/directions/driving-car");
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("start".to_string(), "8.68,49.41".to_string())));
        assert!(query.contains(&("end".to_string(), "8.69,49.42".to_string())));
    }
}
