//! Proxy configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Provider keys are optional. A missing key never stops the server from
//! starting; the affected handler answers with its configured error instead.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `PORT` is set but is not a valid port number.
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub port: u16,
    pub weather: WeatherConfig,
    pub gemini: GeminiConfig,
    pub timeouts: HttpTimeouts,
}

impl ProxyConfig {
    /// Build typed proxy config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `OPENWEATHER_API_KEY`, `OPENWEATHER_BASE_URL`
    /// - `GEMINI_API_KEY`, `GEMINI_MODEL` (default `gemini-2.5-flash`), `GEMINI_BASE_URL`
    /// - `PROXY_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PROXY_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] when `PORT` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let weather = WeatherConfig {
            api_key: env_non_empty("OPENWEATHER_API_KEY"),
            base_url: env_base_url("OPENWEATHER_BASE_URL", DEFAULT_OPENWEATHER_BASE_URL),
        };
        let gemini = GeminiConfig {
            api_key: env_non_empty("GEMINI_API_KEY"),
            model: env_non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: env_base_url("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
        };
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("PROXY_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("PROXY_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { port, weather, gemini, timeouts })
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_base_url(key: &str, default: &str) -> String {
    env_non_empty(key)
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
