use std::sync::Arc;

use futures::executor::block_on;

use super::*;
use crate::config::ClientConfig;
use crate::net::mock::MockTransport;
use crate::net::types::Role;
use crate::state::events::SessionEvents;
use crate::state::session::SessionStore;
use crate::util::storage::MemoryStorage;

fn client() -> (MockTransport, ApiClient<MockTransport>) {
    let events = SessionEvents::new();
    let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()), events.clone()));
    let transport = MockTransport::new();
    let config = ClientConfig { server_url: "http://api.test".to_owned(), ..ClientConfig::default() };
    let api = ApiClient::new(transport.clone(), Arc::new(config), session, events);
    (transport, api)
}

#[test]
fn accounts_endpoint_appends_suffix() {
    assert_eq!(accounts_endpoint("/all"), "/accounts/all");
    assert_eq!(accounts_endpoint(""), "/accounts");
}

#[test]
fn login_posts_credentials_and_returns_tokens() {
    let (transport, api) = client();
    transport.respond(200, r#"{"code":"auth-s-03","data":{"accessToken":"a","refreshToken":"r"}}"#);
    let body = LoginRequest { email: "x@y.z".to_owned(), password: "secret123".to_owned(), role: Role::Consumer };
    let tokens = block_on(api.login(&body)).unwrap();

    assert_eq!(tokens.access_token, "a");
    assert_eq!(tokens.refresh_token.as_deref(), Some("r"));
    let sent = transport.last_request();
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.url, "http://api.test/auth/login");
    assert!(sent.body.unwrap().contains(r#""role":"CONSUMER""#));
}

#[test]
fn refresh_token_sends_camel_case_body() {
    let (transport, api) = client();
    transport.respond(200, r#"{"data":{"accessToken":"a2"}}"#);
    let tokens = block_on(api.refresh_token("r1")).unwrap();
    assert_eq!(tokens.access_token, "a2");
    let sent = transport.last_request();
    assert_eq!(sent.url, "http://api.test/auth/refresh-token");
    assert_eq!(sent.body.as_deref(), Some(r#"{"refreshToken":"r1"}"#));
}

#[test]
fn register_returns_envelope_with_code() {
    let (transport, api) = client();
    transport.respond(201, r#"{"code":"auth-s-01","message":"check email"}"#);
    let body = RegisterRequest { email: "x@y.z".to_owned(), password: "secret123".to_owned() };
    let envelope = block_on(api.register(&body)).unwrap();
    assert_eq!(envelope.code.as_deref(), Some("auth-s-01"));
    assert_eq!(envelope.status, 201);
}

#[test]
fn account_info_hits_auth_info() {
    let (transport, api) = client();
    transport.respond(200, r#"{"data":{"id":"u1","roles":["FARMER"]}}"#);
    let info = block_on(api.account_info()).unwrap();
    assert_eq!(info.id.as_deref(), Some("u1"));
    assert_eq!(info.roles, Some(vec![Role::Farmer]));
    let sent = transport.last_request();
    assert_eq!(sent.method, Method::Get);
    assert_eq!(sent.url, "http://api.test/auth/info");
}

#[test]
fn delete_account_sends_id_in_body() {
    let (transport, api) = client();
    let _ = block_on(api.delete_account("acc-9")).unwrap();
    let sent = transport.last_request();
    assert_eq!(sent.method, Method::Delete);
    assert_eq!(sent.url, "http://api.test/api/accounts");
    assert_eq!(sent.body.as_deref(), Some(r#"{"id":"acc-9"}"#));
}

#[test]
fn all_accounts_treats_missing_data_as_empty() {
    let (transport, api) = client();
    transport.respond(200, r#"{"code":"ok"}"#);
    let accounts = block_on(api.all_accounts()).unwrap();
    assert!(accounts.is_empty());
    assert_eq!(transport.last_request().url, "http://api.test/api/accounts/all");
}
