//! Weather-forecast provider (OpenWeatherMap 5 day / 3 hour forecast).
//!
//! Only the first slot of the forecast list is read; it is treated as "now".

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::ServiceConfig;
use crate::providers::endpoint;
use crate::providers::types::{ForecastResult, GeoPoint, ServiceResult, ValidationError};
use crate::resilience::error::ApiError;

const PATH: &str = "data/2.5/forecast";
const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    cod: Value,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    list: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    main: SlotMain,
    wind: SlotWind,
    #[serde(default)]
    pop: f64,
    #[serde(default)]
    weather: Vec<SlotCondition>,
}

#[derive(Debug, Deserialize)]
struct SlotMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct SlotWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct SlotCondition {
    #[serde(default)]
    main: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Build the request URL for a forecast in metric units.
pub fn build_url(config: &ServiceConfig, location: GeoPoint, api_key: &str) -> Result<Url, url::ParseError> {
    let mut url = endpoint(&config.base_url, PATH)?;
    url.query_pairs_mut()
        .append_pair("lat", &location.lat.to_string())
        .append_pair("lon", &location.lng.to_string())
        .append_pair("units", "metric")
        .append_pair("appid", api_key);
    Ok(url)
}

/// Validate a decoded payload and map its first slot into a [`ForecastResult`].
pub fn map_response(provider: &str, payload: Value) -> ServiceResult<ForecastResult> {
    let response: ForecastResponse = serde_json::from_value(payload)
        .map_err(|e| ValidationError::new(provider, format!("unexpected shape: {}", e)))?;

    let cod = match &response.cod {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if cod != "200" {
        let detail = response.message.as_ref().map(|m| match m {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        return Err(ApiError::in_band(provider, &cod, detail.as_deref()).into());
    }

    let slot = response
        .list
        .first()
        .ok_or_else(|| ValidationError::new(provider, "forecast list is empty"))?;

    Ok(map_slot(slot))
}

fn map_slot(slot: &ForecastSlot) -> ForecastResult {
    let description = slot
        .weather
        .first()
        .and_then(|c| c.description.clone().or_else(|| c.main.clone()))
        .unwrap_or_default();

    ForecastResult {
        temperature: slot.main.temp.round() as i32,
        rain_chance: (slot.pop * 100.0).round().clamp(0.0, 100.0) as u8,
        wind_speed: (slot.wind.speed * MPS_TO_KMH).round().max(0.0) as u32,
        description,
    }
}
