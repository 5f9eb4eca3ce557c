//! Wire transport underneath [`ApiClient`](super::http::ApiClient).
//!
//! Client-side (hydrate): [`BrowserTransport`] sends through `gloo-net`.
//! Elsewhere it reports every request as unsendable, and tests plug in
//! their own [`Transport`].

use async_trait::async_trait;

/// HTTP verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

/// A fully resolved outgoing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// JSON body, already serialized.
    pub body: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), query: Vec::new(), body: None }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_owned(), value.to_string()));
        self
    }

    /// Value of the first header matching `name`, case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response: status plus body text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport-level failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built or dispatched.
    #[error("request not sent: {0}")]
    NotSent(String),
    /// The request went out but no response came back.
    #[error("no response: {0}")]
    NoResponse(String),
}

/// Sends one request and returns the raw response.
///
/// Futures are `?Send`: the browser runtime is single-threaded.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `gloo-net` fetch transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

#[async_trait(?Send)]
impl Transport for BrowserTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        #[cfg(feature = "hydrate")]
        {
            use gloo_net::http::RequestBuilder;

            let method = match request.method {
                Method::Get => gloo_net::http::Method::GET,
                Method::Post => gloo_net::http::Method::POST,
                Method::Put => gloo_net::http::Method::PUT,
                Method::Patch => gloo_net::http::Method::PATCH,
                Method::Delete => gloo_net::http::Method::DELETE,
            };
            let mut builder = RequestBuilder::new(&request.url)
                .method(method)
                .query(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }
            let built = match request.body {
                Some(body) => builder
                    .header("Content-Type", "application/json")
                    .body(body),
                None => builder.build(),
            }
            .map_err(|e| TransportError::NotSent(e.to_string()))?;

            let resp = built
                .send()
                .await
                .map_err(|e| TransportError::NoResponse(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .text()
                .await
                .map_err(|e| TransportError::NoResponse(e.to_string()))?;
            Ok(HttpResponse { status, body })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = request;
            Err(TransportError::NotSent("not available on server".to_owned()))
        }
    }
}
