//! OpenWeather client used by the weather widget routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! The storefront weather widget never talks to OpenWeather directly; the
//! proxy holds the API key and forwards three lookups: city geocoding,
//! current conditions by coordinates, and a five-day forecast by city.
//!
//! ERROR HANDLING
//! ==============
//! Upstream error payloads (`{"cod": "404", "message": ...}`) are returned as
//! ordinary JSON and inspected by [`upstream_failure`]. Only transport and
//! decode failures surface as [`WeatherError`].

use std::time::Duration;

use serde_json::Value;

use crate::config::{HttpTimeouts, WeatherConfig};

/// Country code appended to geocoding queries.
const GEOCODE_COUNTRY: &str = "VN";
const UNITS: &str = "metric";
const LANG: &str = "vi";

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The request to OpenWeather could not be completed.
    #[error("weather request failed: {0}")]
    Request(String),

    /// OpenWeather answered with something that is not JSON.
    #[error("weather response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Upstream weather lookups. Each call returns the decoded upstream JSON.
#[async_trait::async_trait]
pub trait WeatherApi: Send + Sync {
    /// Geocoding search for `city`, limited to one hit.
    async fn geocode(&self, city: &str) -> Result<Value, WeatherError>;

    /// Current conditions at `lat`/`lon`.
    async fn current(&self, lat: &str, lon: &str) -> Result<Value, WeatherError>;

    /// Five-day forecast for `city`.
    async fn forecast(&self, city: &str) -> Result<Value, WeatherError>;
}

pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    /// Build a client. A missing key is sent as an empty `appid`, which
    /// OpenWeather rejects with its own error payload.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::HttpClientBuild`] if reqwest cannot build.
    pub fn new(config: &WeatherConfig, timeouts: HttpTimeouts) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| WeatherError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key: config.api_key.clone().unwrap_or_default(), base_url: config.base_url.clone() })
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| WeatherError::Request(e.to_string()))?;
        tracing::debug!(%path, status, "openweather response");
        serde_json::from_str(&text).map_err(|e| WeatherError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl WeatherApi for OpenWeatherClient {
    async fn geocode(&self, city: &str) -> Result<Value, WeatherError> {
        let q = geocode_query(city);
        self.get_json("/geo/1.0/direct", &[("q", q.as_str()), ("limit", "1")])
            .await
    }

    async fn current(&self, lat: &str, lon: &str) -> Result<Value, WeatherError> {
        self.get_json("/data/2.5/weather", &[("lat", lat), ("lon", lon), ("units", UNITS), ("lang", LANG)])
            .await
    }

    async fn forecast(&self, city: &str) -> Result<Value, WeatherError> {
        self.get_json("/data/2.5/forecast", &[("q", city), ("units", UNITS), ("lang", LANG)])
            .await
    }
}

// =============================================================================
// RESPONSE INSPECTION
// =============================================================================

/// `q` parameter for a geocoding lookup.
pub(crate) fn geocode_query(city: &str) -> String {
    format!("{city},{GEOCODE_COUNTRY}")
}

/// First geocoding hit, or `None` when the payload is not a non-empty array.
pub(crate) fn first_location(data: Value) -> Option<Value> {
    match data {
        Value::Array(items) => items.into_iter().next(),
        _ => None,
    }
}

/// How an endpoint spells a successful `cod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CodStyle {
    /// `/weather` reports `cod` as the number 200.
    Numeric,
    /// `/forecast` has been seen with both `200` and `"200"`.
    NumericOrString,
}

/// Upstream `message` when the payload's `cod` is not a success for
/// `style`. A failure without a message yields `Value::Null`.
pub(crate) fn upstream_failure(data: &Value, style: CodStyle) -> Option<Value> {
    let ok = match (data.get("cod"), style) {
        (Some(Value::Number(n)), _) => n.as_u64() == Some(200),
        (Some(Value::String(s)), CodStyle::NumericOrString) => s == "200",
        _ => false,
    };
    if ok {
        return None;
    }
    Some(data.get("message").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
#[path = "weather_test.rs"]
mod tests;
