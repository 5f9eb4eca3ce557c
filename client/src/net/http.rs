//! Bearer-token HTTP wrapper with uniform result normalization.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every REST call in `api`, `shop`, and `widgets` funnels through
//! [`ApiClient::execute`]. It attaches the current access token, decodes the
//! backend envelope, and maps failures onto [`ApiError`].
//!
//! ERROR HANDLING
//! ==============
//! A 401 or 403 from any call broadcasts one
//! [`SessionEvent::Invalidated`]. The context listener clears the session in
//! response; this layer never touches the stores itself.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use super::types::Envelope;
use crate::config::ClientConfig;
use crate::state::events::{SessionEvent, SessionEvents};
use crate::state::session::SessionStore;

const SERVER_ERROR_MESSAGE: &str = "Server error";
const NETWORK_ERROR_MESSAGE: &str = "Network error - please check your connection";

// =============================================================================
// ERROR
// =============================================================================

/// Failure surfaced to UI callers.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message} (status {status})")]
    Server {
        status: u16,
        code: Option<String>,
        message: String,
        /// Parsed response body, `Null` when it was not JSON.
        body: Value,
    },
    /// The request went out but nothing came back.
    #[error("{message}")]
    Network { message: String },
    /// The request never left the client, or its response could not be read.
    #[error("{message}")]
    Client { message: String },
}

impl ApiError {
    /// HTTP-like status: the server's for [`ApiError::Server`], `0` for
    /// network failures, `500` for client-side failures.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Server { status, .. } => *status,
            Self::Network { .. } => 0,
            Self::Client { .. } => 500,
        }
    }

    /// Backend message code (e.g. `auth-e-04`), when the server sent one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Server { message, .. } | Self::Network { message } | Self::Client { message } => message,
        }
    }

    /// True for the statuses that invalidate the session.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        is_auth_failure_status(self.status())
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotSent(message) => Self::Client { message },
            TransportError::NoResponse(detail) => {
                log::warn!("network failure: {detail}");
                Self::Network { message: NETWORK_ERROR_MESSAGE.to_owned() }
            }
        }
    }
}

fn is_auth_failure_status(status: u16) -> bool {
    status == 401 || status == 403
}

// =============================================================================
// NORMALIZATION
// =============================================================================

fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or(Value::Null)
}

/// Turn a non-2xx response into [`ApiError::Server`].
fn server_error(response: &HttpResponse) -> ApiError {
    let body = parse_body(&response.body);
    let code = body.get("code").and_then(Value::as_str).map(str::to_owned);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(SERVER_ERROR_MESSAGE)
        .to_owned();
    ApiError::Server { status: response.status, code, message, body }
}

/// Decode the success body as an [`Envelope`], stamping the HTTP status.
fn decode_envelope<R: DeserializeOwned>(response: &HttpResponse) -> Result<Envelope<R>, ApiError> {
    let body = match parse_body(&response.body) {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    let mut envelope: Envelope<R> = serde_json::from_value(body).map_err(|e| ApiError::Client {
        message: format!("unreadable response: {e}"),
    })?;
    envelope.status = response.status;
    Ok(envelope)
}

/// Decode only the envelope's `data` field. Absent data decodes from `null`.
fn decode_data<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ApiError> {
    let data = parse_body(&response.body).get("data").cloned().unwrap_or(Value::Null);
    serde_json::from_value(data).map_err(|e| ApiError::Client { message: format!("unreadable response: {e}") })
}

// =============================================================================
// CLIENT
// =============================================================================

/// REST client bound to one transport and the shared session.
pub struct ApiClient<T> {
    transport: T,
    config: Arc<ClientConfig>,
    session: Arc<SessionStore>,
    events: SessionEvents,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, config: Arc<ClientConfig>, session: Arc<SessionStore>, events: SessionEvents) -> Self {
        Self { transport, config, session, events }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a request, attaching `Authorization: Bearer` when logged in.
    #[must_use]
    pub fn request(&self, method: Method, url: impl Into<String>) -> HttpRequest {
        let request = HttpRequest::new(method, url);
        match self.session.access_token() {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    /// Start a request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Client`] when the body cannot be serialized.
    pub fn request_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: impl Into<String>,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let raw = serde_json::to_string(body).map_err(|e| ApiError::Client { message: e.to_string() })?;
        let mut request = self.request(method, url);
        request.body = Some(raw);
        Ok(request)
    }

    /// Send and return the raw successful response.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] for transport failures and non-2xx statuses.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        let response = self.transport.send(request).await?;
        if (200..300).contains(&response.status) {
            return Ok(response);
        }

        log::debug!("{method:?} {url} -> {}", response.status);
        if is_auth_failure_status(response.status) {
            self.events.emit(SessionEvent::Invalidated { status: response.status });
        }
        Err(server_error(&response))
    }

    /// Send and return the whole envelope (`code`, `message`, `data`, `status`).
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); undecodable bodies yield [`ApiError::Client`].
    pub async fn envelope<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<Envelope<R>, ApiError> {
        let response = self.execute(request).await?;
        decode_envelope(&response)
    }

    /// Send and return only the envelope's `data` payload.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); undecodable bodies yield [`ApiError::Client`].
    pub async fn data<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        decode_data(&response)
    }

    /// Send and decode the body as-is (for endpoints without an envelope).
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute); undecodable bodies yield [`ApiError::Client`].
    pub async fn raw<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        serde_json::from_value(parse_body(&response.body))
            .map_err(|e| ApiError::Client { message: format!("unreadable response: {e}") })
    }
}
