//! Scripted [`Transport`] for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};

/// Replays queued responses in order and records every request it sees.
/// An empty queue answers `200 {}`.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(HttpResponse { status, body: body.to_owned() }))
    }

    pub fn fail(&self, err: TransportError) -> &Self {
        self.push(Err(err))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request sent")
    }

    fn push(&self, response: Result<HttpResponse, TransportError>) -> &Self {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).push_back(response);
        self
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse { status: 200, body: "{}".to_owned() }))
    }
}
