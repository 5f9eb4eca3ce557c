use futures::executor::block_on;

use super::*;
use crate::config::ClientConfig;
use crate::net::mock::MockTransport;
use crate::net::types::OrderItemRequest;
use crate::state::events::SessionEvents;
use crate::state::session::SessionStore;
use crate::util::storage::MemoryStorage;

fn order(id: &str, created_at: &str) -> Order {
    Order {
        id: id.to_owned(),
        total_price: 0.0,
        total_quantity: 0,
        note: None,
        status: OrderStatus::Pending,
        address: None,
        account: None,
        order_items: Vec::new(),
        created_at: created_at.to_owned(),
    }
}

fn request(farmer_id: &str) -> OrderRequest {
    OrderRequest {
        note: String::new(),
        address_id: "addr".to_owned(),
        farmer_id: farmer_id.to_owned(),
        items: vec![OrderItemRequest { cart_item_id: "c1".to_owned() }],
    }
}

fn pending(farmer_id: &str, created_at: &str) -> PendingOrder {
    PendingOrder { created_at: created_at.to_owned(), ..PendingOrder::from_request(request(farmer_id), "Farm", Vec::new()) }
}

fn api() -> (MockTransport, ApiClient<MockTransport>) {
    let events = SessionEvents::new();
    let session = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new()), events.clone()));
    let transport = MockTransport::new();
    (transport.clone(), ApiClient::new(transport, Arc::new(ClientConfig::default()), session, events))
}

#[test]
fn pending_order_ids_are_unique_and_prefixed() {
    let a = PendingOrder::from_request(request("f1"), "Farm", Vec::new());
    let b = PendingOrder::from_request(request("f1"), "Farm", Vec::new());
    assert!(a.temp_id.starts_with("pending_"));
    assert_ne!(a.temp_id, b.temp_id);
    assert_eq!(a.farmer_id, "f1");
    assert!(!a.created_at.is_empty());
}

#[test]
fn current_orders_sorts_newest_first() {
    let store = OrderStore::new(Arc::new(MemoryStorage::new()));
    store.set_orders(vec![order("o1", "2024-05-01T08:00:00Z"), order("o2", "2024-05-03T08:00:00Z")]);
    store.add_pending_order(pending("f1", "2024-05-02T08:00:00Z"));

    let dates: Vec<String> = store.current_orders().iter().map(|o| o.created_at().to_owned()).collect();
    assert_eq!(dates, ["2024-05-03T08:00:00Z", "2024-05-02T08:00:00Z", "2024-05-01T08:00:00Z"]);
    assert_eq!(store.total_orders(), 3);
}

#[test]
fn pending_orders_group_by_farmer() {
    let store = OrderStore::new(Arc::new(MemoryStorage::new()));
    store.add_pending_order(pending("f1", "1"));
    store.add_pending_order(pending("f2", "2"));
    store.add_pending_order(pending("f1", "3"));

    let groups = store.pending_by_farmer();
    assert_eq!(groups["f1"].len(), 2);
    assert_eq!(groups["f2"].len(), 1);
}

#[test]
fn update_status_touches_both_lists() {
    let store = OrderStore::new(Arc::new(MemoryStorage::new()));
    store.set_orders(vec![order("o1", "")]);
    store.set_farmer_orders(vec![order("o1", ""), order("o2", "")]);
    store.update_order_status("o1", OrderStatus::Delivered);

    let state = store.snapshot();
    assert_eq!(state.orders[0].status, OrderStatus::Delivered);
    assert_eq!(state.farmer_orders[0].status, OrderStatus::Delivered);
    assert_eq!(state.farmer_orders[1].status, OrderStatus::Pending);
}

#[test]
fn only_pending_and_last_created_persist() {
    let storage = Arc::new(MemoryStorage::new());
    let store = OrderStore::new(storage.clone());
    store.set_orders(vec![order("o1", "")]);
    store.add_pending_order(pending("f1", "1"));
    store.set_last_created_orders(vec![order("o9", "")]);

    let reloaded = OrderStore::new(storage);
    reloaded.rehydrate();
    let state = reloaded.snapshot();
    assert!(state.orders.is_empty());
    assert_eq!(state.pending_orders.len(), 1);
    assert_eq!(state.last_created_orders[0].id, "o9");
}

#[test]
fn remove_pending_order_by_temp_id() {
    let store = OrderStore::new(Arc::new(MemoryStorage::new()));
    let p = pending("f1", "1");
    let id = p.temp_id.clone();
    store.add_pending_order(p);
    store.remove_pending_order(&id);
    assert!(store.snapshot().pending_orders.is_empty());
}

#[test]
fn fetch_all_records_failure_message() {
    let (transport, api) = api();
    let store = OrderStore::new(Arc::new(MemoryStorage::new()));
    transport.fail(crate::net::transport::TransportError::NoResponse("down".to_owned()));
    block_on(store.fetch_all(&api));

    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.error.as_deref(), Some(LOAD_FAILED_MESSAGE));
}

#[test]
fn change_status_updates_locally_on_success() {
    let (transport, api) = api();
    let store = OrderStore::new(Arc::new(MemoryStorage::new()));
    store.set_orders(vec![order("o1", "")]);

    assert!(block_on(store.change_status(&api, "o1", OrderStatus::Canceled, OrderActor::Consumer)));
    assert_eq!(store.order("o1").map(|o| o.status), Some(OrderStatus::Canceled));
    assert_eq!(transport.last_request().url, "http://localhost:8080/api/orders/consumer/change-status");

    transport.respond(400, r#"{"message":"not allowed"}"#);
    assert!(!block_on(store.change_status(&api, "o1", OrderStatus::Received, OrderActor::Consumer)));
    assert_eq!(store.snapshot().error.as_deref(), Some("not allowed"));
}
