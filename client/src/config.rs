//! Client configuration resolved at compile time.
//!
//! DESIGN
//! ======
//! The WASM bundle has no process environment at runtime, so values are
//! baked in with `option_env!` and fall back to local-development defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Backend location and session timing knobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without trailing slash, e.g. `http://localhost:8080`.
    pub server_url: String,
    /// Origin of the widget proxy. Empty means same-origin relative URLs.
    pub widget_url: String,
    /// Access-token lifetime advertised by the backend, in seconds.
    pub refresh_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            widget_url: String::new(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl ClientConfig {
    /// Build config from build-time variables.
    ///
    /// - `SERVER_URL`: backend origin, default `http://localhost:8080`
    /// - `WIDGET_URL`: proxy origin, default same-origin
    /// - `INTERVAL_REFRESHTOKEN`: token lifetime in seconds, default 3600
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_parts(
            option_env!("SERVER_URL"),
            option_env!("WIDGET_URL"),
            option_env!("INTERVAL_REFRESHTOKEN"),
        )
    }

    fn from_parts(server_url: Option<&str>, widget_url: Option<&str>, refresh: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            server_url: server_url
                .filter(|s| !s.trim().is_empty())
                .map_or(defaults.server_url, |s| s.trim().trim_end_matches('/').to_owned()),
            widget_url: widget_url
                .map(|s| s.trim().trim_end_matches('/').to_owned())
                .unwrap_or_default(),
            refresh_interval_secs: refresh
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.refresh_interval_secs),
        }
    }

    /// `{server}/api{path}`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{path}", self.server_url)
    }

    /// `{server}/auth{path}`.
    #[must_use]
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth{path}", self.server_url)
    }

    /// `{widget}/api{path}` against the weather/chatbot proxy.
    #[must_use]
    pub fn widget_url(&self, path: &str) -> String {
        format!("{}/api{path}", self.widget_url)
    }

    /// Delay between proactive token refreshes: 90% of the token lifetime.
    #[must_use]
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_secs.saturating_mul(900))
    }
}
