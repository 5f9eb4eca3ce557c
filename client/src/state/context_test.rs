use std::sync::Mutex;

use futures::executor::block_on;

use super::*;
use crate::net::mock::MockTransport;
use crate::net::transport::Method;
use crate::net::types::Role;
use crate::util::storage::MemoryStorage;

fn context_with(storage: MemoryStorage) -> (ClientContext, Arc<MemoryStorage>) {
    let storage = Arc::new(storage);
    let ctx = ClientContext::new(ClientConfig::default(), storage.clone());
    (ctx, storage)
}

fn logged_in_storage() -> MemoryStorage {
    MemoryStorage::with_items([
        ("accessToken", "\"a\""),
        ("refreshToken", "\"b\""),
        ("user-storage", r#"{"id":"u1","roles":["CONSUMER"]}"#),
    ])
}

#[test]
fn rehydrate_restores_stores_and_fires_ready() {
    let (ctx, _) = context_with(logged_in_storage());
    assert!(!ctx.ready.is_ready());
    assert!(!ctx.session.is_logged_in());

    ctx.rehydrate();
    assert!(ctx.ready.is_ready());
    assert!(ctx.session.is_logged_in());
    assert!(ctx.user.has_role(Role::Consumer));
}

#[test]
fn unauthorized_response_clears_session_and_user_once() {
    let (ctx, storage) = context_with(logged_in_storage());
    ctx.rehydrate();
    let cleared = Arc::new(Mutex::new(0_u32));
    let counter = Arc::clone(&cleared);
    ctx.events.on(move |event| {
        if *event == SessionEvent::TokensCleared {
            *counter.lock().unwrap() += 1;
        }
    });

    let transport = MockTransport::new();
    transport.respond(401, r#"{"message":"expired"}"#);
    let api = ctx.api(transport);
    let err = block_on(api.get_account()).unwrap_err();

    assert_eq!(err.status(), 401);
    assert_eq!(*cleared.lock().unwrap(), 1);
    assert!(!ctx.session.is_logged_in());
    assert!(!ctx.user.user().is_loaded());
    assert!(storage.get_item("accessToken").is_none());
}

#[test]
fn forbidden_response_also_invalidates() {
    let (ctx, _) = context_with(logged_in_storage());
    ctx.rehydrate();
    let transport = MockTransport::new();
    transport.respond(403, "{}");
    let _ = block_on(ctx.api(transport).my_orders());
    assert!(!ctx.session.is_logged_in());
}

#[test]
fn listener_does_not_keep_stores_alive() {
    let (ctx, _) = context_with(MemoryStorage::new());
    let session = Arc::downgrade(&ctx.session);
    let events = ctx.events.clone();
    drop(ctx);
    assert!(session.upgrade().is_none());
    events.emit(SessionEvent::Invalidated { status: 401 });
}

#[test]
fn bootstrap_refreshes_then_fetches_user() {
    let (ctx, _) = context_with(logged_in_storage());
    ctx.rehydrate();
    let transport = MockTransport::new();
    transport
        .respond(200, r#"{"data":{"accessToken":"a2","refreshToken":"b2"}}"#)
        .respond(200, r#"{"data":{"id":"u1","roles":["FARMER"]}}"#);
    let api = ctx.api(transport.clone());

    block_on(ctx.bootstrap(&api));

    assert_eq!(ctx.session.access_token().as_deref(), Some("a2"));
    assert_eq!(ctx.session.refresh_token().as_deref(), Some("b2"));
    assert!(ctx.user.has_role(Role::Farmer));
    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(urls, ["http://localhost:8080/auth/refresh-token", "http://localhost:8080/auth/info"]);
}

#[test]
fn failed_refresh_keeps_session() {
    let (ctx, _) = context_with(logged_in_storage());
    ctx.rehydrate();
    let transport = MockTransport::new();
    transport.respond(500, "{}");
    let api = ctx.api(transport);
    block_on(ctx.refresh_session(&api));
    assert_eq!(ctx.session.access_token().as_deref(), Some("a"));
}

#[test]
fn bootstrap_without_tokens_sends_nothing() {
    let (ctx, _) = context_with(MemoryStorage::new());
    ctx.rehydrate();
    let transport = MockTransport::new();
    block_on(ctx.bootstrap(&ctx.api(transport.clone())));
    assert!(transport.requests().is_empty());
}

#[test]
fn login_stores_tokens_and_profile() {
    let (ctx, _) = context_with(MemoryStorage::new());
    ctx.rehydrate();
    let transport = MockTransport::new();
    transport
        .respond(200, r#"{"data":{"accessToken":"a","refreshToken":"r"}}"#)
        .respond(200, r#"{"data":{"id":"u3","roles":["ADMIN"]}}"#);
    let api = ctx.api(transport.clone());
    let body = LoginRequest { email: "a@b.c".to_owned(), password: "password".to_owned(), role: Role::Admin };

    let user = block_on(ctx.login(&api, &body)).unwrap();
    assert_eq!(user.id.as_deref(), Some("u3"));
    assert!(ctx.session.is_logged_in());
    assert_eq!(
        transport.requests()[1].header_value("Authorization"),
        Some("Bearer a")
    );
}

#[test]
fn logout_clears_local_state_even_if_request_fails() {
    let (ctx, _) = context_with(logged_in_storage());
    ctx.rehydrate();
    let transport = MockTransport::new();
    transport.respond(500, "{}");
    let api = ctx.api(transport.clone());

    block_on(ctx.logout(&api));

    let sent = transport.last_request();
    assert_eq!(sent.method, Method::Post);
    assert_eq!(sent.body.as_deref(), Some(r#"{"refreshToken":"b"}"#));
    assert!(!ctx.session.is_logged_in());
    assert!(!ctx.user.user().is_loaded());
}

#[test]
fn upgrade_to_farmer_switches_tokens() {
    let (ctx, _) = context_with(logged_in_storage());
    ctx.rehydrate();
    let transport = MockTransport::new();
    transport
        .respond(
            200,
            r#"{"data":{"farmerResponse":{"id":"f1","name":"Green"},"accessToken":"fa","refreshToken":"fr"}}"#,
        )
        .respond(200, r#"{"data":{"id":"u1","roles":["CONSUMER","FARMER"]}}"#);
    let api = ctx.api(transport);
    let body = UpgradeToFarmerRequest { name: "Green".to_owned(), description: None };

    let farmer = block_on(ctx.upgrade_to_farmer(&api, &body)).unwrap();
    assert_eq!(farmer.id, "f1");
    assert_eq!(ctx.session.access_token().as_deref(), Some("fa"));
    assert!(ctx.user.has_role(Role::Farmer));
}
