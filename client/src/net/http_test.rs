use std::sync::Mutex;

use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::net::mock::MockTransport;
use crate::util::storage::MemoryStorage;

struct Harness {
    transport: MockTransport,
    session: Arc<SessionStore>,
    events: SessionEvents,
    api: ApiClient<MockTransport>,
}

fn harness() -> Harness {
    let events = SessionEvents::new();
    let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()), events.clone()));
    let transport = MockTransport::new();
    let api = ApiClient::new(
        transport.clone(),
        Arc::new(ClientConfig::default()),
        Arc::clone(&session),
        events.clone(),
    );
    Harness { transport, session, events, api }
}

#[test]
fn request_omits_bearer_when_logged_out() {
    let h = harness();
    let request = h.api.request(Method::Get, "http://x/api/products");
    assert!(request.header_value("authorization").is_none());
}

#[test]
fn request_attaches_bearer_when_logged_in() {
    let h = harness();
    h.session.set_tokens("tok", "ref");
    let request = h.api.request(Method::Get, "http://x/api/products");
    assert_eq!(request.header_value("Authorization"), Some("Bearer tok"));
}

#[test]
fn request_json_serializes_body() {
    let h = harness();
    let request = h.api.request_json(Method::Post, "http://x", &json!({ "a": 1 })).unwrap();
    assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
}

#[test]
fn data_mode_returns_payload_only() {
    let h = harness();
    h.transport.respond(200, r#"{"code":"ok","message":"fine","data":{"n":7}}"#);
    let value: Value = block_on(h.api.data(h.api.request(Method::Get, "http://x"))).unwrap();
    assert_eq!(value, json!({ "n": 7 }));
}

#[test]
fn envelope_mode_keeps_code_message_and_status() {
    let h = harness();
    h.transport.respond(201, r#"{"code":"auth-s-01","message":"created","data":[1,2]}"#);
    let envelope: Envelope<Vec<u32>> = block_on(h.api.envelope(h.api.request(Method::Post, "http://x"))).unwrap();
    assert_eq!(envelope.code.as_deref(), Some("auth-s-01"));
    assert_eq!(envelope.message.as_deref(), Some("created"));
    assert_eq!(envelope.data, Some(vec![1, 2]));
    assert_eq!(envelope.status, 201);
}

#[test]
fn server_error_uses_body_code_and_message() {
    let h = harness();
    h.transport.respond(400, r#"{"code":"auth-e-04","message":"Email exists"}"#);
    let err = block_on(h.api.data::<Value>(h.api.request(Method::Post, "http://x"))).unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.code(), Some("auth-e-04"));
    assert_eq!(err.message(), "Email exists");
}

#[test]
fn server_error_without_message_defaults() {
    let h = harness();
    h.transport.respond(500, "<html>oops</html>");
    let err = block_on(h.api.data::<Value>(h.api.request(Method::Get, "http://x"))).unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "Server error");
    assert!(err.code().is_none());
}

#[test]
fn no_response_maps_to_network_status_zero() {
    let h = harness();
    h.transport.fail(TransportError::NoResponse("offline".to_owned()));
    let err = block_on(h.api.data::<Value>(h.api.request(Method::Get, "http://x"))).unwrap_err();
    assert_eq!(err.status(), 0);
    assert_eq!(err.message(), "Network error - please check your connection");
}

#[test]
fn unsent_request_maps_to_client_status_500() {
    let h = harness();
    h.transport.fail(TransportError::NotSent("bad url".to_owned()));
    let err = block_on(h.api.data::<Value>(h.api.request(Method::Get, "http://x"))).unwrap_err();
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "bad url");
}

#[test]
fn auth_failures_emit_one_invalidation_each() {
    for status in [401_u16, 403] {
        let h = harness();
        let mut rx = h.events.subscribe();
        h.transport.respond(status, r#"{"message":"denied"}"#);
        let err = block_on(h.api.data::<Value>(h.api.request(Method::Get, "http://x"))).unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(rx.try_next().unwrap(), Some(SessionEvent::Invalidated { status }));
        assert!(rx.try_next().is_err());
    }
}

#[test]
fn other_failures_do_not_invalidate() {
    let h = harness();
    let seen = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&seen);
    h.events.on(move |event| {
        if matches!(event, SessionEvent::Invalidated { .. }) {
            *counter.lock().unwrap() += 1;
        }
    });
    h.transport.respond(404, "{}").respond(500, "{}");
    let _ = block_on(h.api.data::<Value>(h.api.request(Method::Get, "http://x")));
    let _ = block_on(h.api.data::<Value>(h.api.request(Method::Get, "http://x")));
    assert_eq!(*seen.lock().unwrap(), 0);
}

#[test]
fn undecodable_success_is_client_error() {
    let h = harness();
    h.transport.respond(200, r#"{"data":"not a number"}"#);
    let err = block_on(h.api.data::<u32>(h.api.request(Method::Get, "http://x"))).unwrap_err();
    assert!(matches!(err, ApiError::Client { .. }));
}

#[test]
fn raw_mode_decodes_whole_body() {
    let h = harness();
    h.transport.respond(200, r#"{"temp":21.5}"#);
    let value: Value = block_on(h.api.raw(h.api.request(Method::Get, "http://x"))).unwrap();
    assert_eq!(value, json!({ "temp": 21.5 }));
    assert_eq!(h.transport.requests().len(), 1);
}
