//! Weather and chatbot calls against the widget proxy.
//!
//! The proxy answers with plain JSON (no backend envelope), so these calls
//! use [`ApiClient::raw`] and skip the bearer header.

#[cfg(test)]
#[path = "widgets_test.rs"]
mod widgets_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http::{ApiClient, ApiError};
use super::transport::{HttpRequest, Method, Transport};
use super::types::{ChatMessage, ChatReply, ChatRequest};

const CHAT_FALLBACK_MESSAGE: &str =
    "I'm having trouble connecting to my knowledge base right now. Please try again later.";

/// Geocoding hit from `GET /api/weather/direct`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Text shown in the chat widget for a failed call: the proxy's `error`
/// field when present, otherwise a generic apology.
pub fn chat_error_text(err: &ApiError) -> String {
    if let ApiError::Server { body, .. } = err {
        if let Some(text) = body.get("error").and_then(Value::as_str).filter(|t| !t.is_empty()) {
            return text.to_owned();
        }
    }
    CHAT_FALLBACK_MESSAGE.to_owned()
}

impl<T: Transport> ApiClient<T> {
    fn widget_request(&self, method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, self.config().widget_url(path))
    }

    /// `GET /api/weather/direct?city=`: resolve a city to coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure (404 when the city is unknown).
    pub async fn geocode_city(&self, city: &str) -> Result<GeoLocation, ApiError> {
        let request = self.widget_request(Method::Get, "/weather/direct").query("city", city.trim());
        self.raw(request).await
    }

    /// `GET /api/weather/location?lat=&lon=`: current conditions, passed
    /// through from the weather provider.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<Value, ApiError> {
        let request = self
            .widget_request(Method::Get, "/weather/location")
            .query("lat", lat)
            .query("lon", lon);
        self.raw(request).await
    }

    /// `GET /api/weather/forecast?city=`: five-day forecast.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    pub async fn forecast(&self, city: &str) -> Result<Value, ApiError> {
        let request = self.widget_request(Method::Get, "/weather/forecast").query("city", city.trim());
        self.raw(request).await
    }

    /// `POST /api/chatbot`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure; see [`chat_error_text`] for display.
    pub async fn chat(&self, current_message: &str, history: &[ChatMessage]) -> Result<String, ApiError> {
        let body = ChatRequest { current_message: current_message.to_owned(), history: history.to_vec() };
        let raw = serde_json::to_string(&body).map_err(|e| ApiError::Client { message: e.to_string() })?;
        let mut request = self.widget_request(Method::Post, "/chatbot");
        request.body = Some(raw);
        let reply: ChatReply = self.raw(request).await?;
        Ok(reply.response)
    }
}
