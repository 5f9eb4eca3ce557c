use futures::executor::block_on;

use super::*;
use crate::config::ClientConfig;
use crate::net::mock::MockTransport;
use crate::state::session::SessionStore;
use crate::util::storage::MemoryStorage;

fn farmer() -> AccountInfo {
    AccountInfo {
        id: Some("u1".to_owned()),
        display_name: Some("Lan".to_owned()),
        email: Some("lan@farm.vn".to_owned()),
        avatar: None,
        roles: Some(vec![Role::Farmer]),
    }
}

fn api_with(storage: Arc<MemoryStorage>, events: &SessionEvents) -> (MockTransport, ApiClient<MockTransport>) {
    let session = Arc::new(SessionStore::new(storage, events.clone()));
    let transport = MockTransport::new();
    let api = ApiClient::new(transport.clone(), Arc::new(ClientConfig::default()), session, events.clone());
    (transport, api)
}

#[test]
fn empty_user_has_no_roles() {
    let user = User::default();
    assert!(!user.is_loaded());
    assert!(!user.has_role(Role::Admin));
}

#[test]
fn roles_are_ignored_until_id_is_known() {
    let user = User { roles: Some(vec![Role::Admin]), ..User::default() };
    assert!(!user.has_role(Role::Admin));
}

#[test]
fn set_user_merges_present_fields() {
    let storage = Arc::new(MemoryStorage::new());
    let store = UserStore::new(storage.clone(), SessionEvents::new());
    store.set_user(farmer());
    store.set_user(AccountInfo { display_name: Some("Lan N.".to_owned()), ..AccountInfo::default() });

    let user = store.user();
    assert_eq!(user.id.as_deref(), Some("u1"));
    assert_eq!(user.display_name.as_deref(), Some("Lan N."));
    assert!(store.has_role(Role::Farmer));
    assert!(storage.get_item("user-storage").unwrap().contains("Lan N."));
}

#[test]
fn clear_user_resets_and_persists() {
    let storage = Arc::new(MemoryStorage::new());
    let store = UserStore::new(storage.clone(), SessionEvents::new());
    store.set_user(farmer());
    store.clear_user();
    assert_eq!(store.user(), User::default());

    let reloaded = UserStore::new(storage, SessionEvents::new());
    assert_eq!(reloaded.rehydrate(), User::default());
}

#[test]
fn rehydrate_restores_saved_profile() {
    let storage = Arc::new(MemoryStorage::with_items([(
        "user-storage",
        r#"{"id":"u7","displayName":"Minh","roles":["ADMIN","CONSUMER"]}"#,
    )]));
    let store = UserStore::new(storage, SessionEvents::new());
    let user = store.rehydrate();
    assert_eq!(user.id.as_deref(), Some("u7"));
    assert!(user.has_role(Role::Admin));
}

#[test]
fn fetch_user_replaces_profile() {
    let storage = Arc::new(MemoryStorage::new());
    let events = SessionEvents::new();
    let (transport, api) = api_with(storage.clone(), &events);
    let store = UserStore::new(storage, events);
    transport.respond(200, r#"{"data":{"id":"u2","email":"a@b.c","roles":["CONSUMER"]}}"#);

    let user = block_on(store.fetch_user(&api)).unwrap();
    assert_eq!(user.id.as_deref(), Some("u2"));
    assert_eq!(store.user(), user);
    assert!(store.has_role(Role::Consumer));
}

#[test]
fn failed_fetch_leaves_store_empty() {
    let storage = Arc::new(MemoryStorage::new());
    let events = SessionEvents::new();
    let (transport, api) = api_with(storage.clone(), &events);
    let store = UserStore::new(storage, events);
    store.set_user(farmer());
    transport.respond(500, "{}");

    assert!(block_on(store.fetch_user(&api)).is_err());
    assert!(!store.user().is_loaded());
    assert_eq!(store.load(), ProfileLoad::Failed);
}

#[test]
fn load_state_follows_profile() {
    let storage = Arc::new(MemoryStorage::new());
    let events = SessionEvents::new();
    let (transport, api) = api_with(storage.clone(), &events);
    let store = UserStore::new(storage, events);
    assert_eq!(store.load(), ProfileLoad::Pending);

    transport.respond(500, "{}");
    assert!(block_on(store.fetch_user(&api)).is_err());
    assert_eq!(store.load(), ProfileLoad::Failed);

    transport.respond(200, r#"{"data":{"id":"u1","roles":["FARMER"]}}"#);
    assert!(block_on(store.fetch_user(&api)).is_ok());
    assert_eq!(store.load(), ProfileLoad::Loaded);

    store.clear_user();
    assert_eq!(store.load(), ProfileLoad::Pending);
}

#[test]
fn rehydrated_profile_counts_as_loaded() {
    let storage = Arc::new(MemoryStorage::with_items([("user-storage", r#"{"id":"u1","roles":["ADMIN"]}"#)]));
    let store = UserStore::new(storage, SessionEvents::new());
    store.rehydrate();
    assert_eq!(store.load(), ProfileLoad::Loaded);
}

#[test]
fn mutations_emit_user_changed() {
    let events = SessionEvents::new();
    let mut rx = events.subscribe();
    let store = UserStore::new(Arc::new(MemoryStorage::new()), events);
    store.set_user(farmer());
    assert_eq!(rx.try_next().unwrap(), Some(SessionEvent::UserChanged));
}
