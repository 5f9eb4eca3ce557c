//! Weather widget routes.
//!
//! All three answer with the upstream JSON on success and `{"error": ...}`
//! otherwise.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;
use crate::weather::{CodStyle, WeatherError, first_location, upstream_failure};

const CITY_REQUIRED: &str = "City is required";
const COORDS_REQUIRED: &str = "Latitude and Longitude are required";
const CITY_NOT_FOUND: &str = "City not found";
const INTERNAL_ERROR: &str = "Internal Server Error";

#[derive(Debug, Default, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CoordsQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// `GET /api/weather/direct?city=`: first geocoding hit for a Vietnamese city.
pub async fn direct(State(state): State<AppState>, Query(query): Query<CityQuery>) -> Response {
    let Some(city) = non_empty(query.city) else {
        return error_response(StatusCode::BAD_REQUEST, CITY_REQUIRED);
    };
    match state.weather.geocode(&city).await {
        Ok(data) => match first_location(data) {
            Some(hit) => Json(hit).into_response(),
            None => error_response(StatusCode::NOT_FOUND, CITY_NOT_FOUND),
        },
        Err(e) => upstream_error(&e),
    }
}

/// `GET /api/weather/location?lat=&lon=`: current conditions.
pub async fn location(State(state): State<AppState>, Query(query): Query<CoordsQuery>) -> Response {
    let (Some(lat), Some(lon)) = (non_empty(query.lat), non_empty(query.lon)) else {
        return error_response(StatusCode::BAD_REQUEST, COORDS_REQUIRED);
    };
    match state.weather.current(&lat, &lon).await {
        Ok(data) => pass_through(data, CodStyle::Numeric),
        Err(e) => upstream_error(&e),
    }
}

/// `GET /api/weather/forecast?city=`: five-day forecast.
pub async fn forecast(State(state): State<AppState>, Query(query): Query<CityQuery>) -> Response {
    let Some(city) = non_empty(query.city) else {
        return error_response(StatusCode::BAD_REQUEST, CITY_REQUIRED);
    };
    match state.weather.forecast(&city).await {
        Ok(data) => pass_through(data, CodStyle::NumericOrString),
        Err(e) => upstream_error(&e),
    }
}

pub(crate) fn weather_error_to_status(err: &WeatherError) -> StatusCode {
    match err {
        WeatherError::Request(_) | WeatherError::Parse(_) | WeatherError::HttpClientBuild(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|v| !v.is_empty())
}

fn pass_through(data: Value, style: CodStyle) -> Response {
    match upstream_failure(&data, style) {
        None => Json(data).into_response(),
        Some(message) => (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response(),
    }
}

fn upstream_error(err: &WeatherError) -> Response {
    tracing::error!(error = %err, "weather lookup failed");
    error_response(weather_error_to_status(err), INTERNAL_ERROR)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
#[path = "weather_test.rs"]
mod tests;
