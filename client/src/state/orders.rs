//! Order history plus locally tracked pending orders.
//!
//! SYSTEM CONTEXT
//! ==============
//! Checkout records a [`PendingOrder`] before the backend confirms it, then
//! swaps in the server's orders. Consumer and farmer order pages load
//! through [`OrderStore::fetch_all`] / [`OrderStore::fetch_farmer`].
//!
//! DESIGN
//! ======
//! Only pending and last-created orders persist (`order-storage`); server
//! lists are refetched on every visit.

#[cfg(test)]
#[path = "orders_test.rs"]
mod orders_test;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::net::http::{ApiClient, ApiError};
use crate::net::shop::OrderActor;
use crate::net::transport::Transport;
use crate::net::types::{ChangeOrderStatusRequest, Order, OrderRequest, OrderStatus};
use crate::util::storage::{ORDER_STORAGE_KEY, Storage, load_json, persist_json};

const LOAD_FAILED_MESSAGE: &str = "Không thể tải danh sách đơn hàng";

/// One line of a pending order, captured from the cart at checkout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrderItem {
    pub cart_item_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Order submitted but not yet confirmed by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrder {
    pub temp_id: String,
    pub request: OrderRequest,
    pub farmer_name: String,
    pub farmer_id: String,
    pub items: Vec<PendingOrderItem>,
    pub created_at: String,
}

impl PendingOrder {
    /// Wrap a checkout request with a fresh `pending_` id and timestamp.
    pub fn from_request(request: OrderRequest, farmer_name: impl Into<String>, items: Vec<PendingOrderItem>) -> Self {
        Self {
            temp_id: pending_order_id(),
            farmer_id: request.farmer_id.clone(),
            request,
            farmer_name: farmer_name.into(),
            items,
            created_at: now_iso(),
        }
    }
}

fn pending_order_id() -> String {
    format!("pending_{}", uuid::Uuid::new_v4().simple())
}

/// Current time as an ISO-8601 UTC string.
fn now_iso() -> String {
    #[cfg(feature = "hydrate")]
    {
        String::from(js_sys::Date::new_0().to_iso_string())
    }
    #[cfg(not(feature = "hydrate"))]
    {
        time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default()
    }
}

/// Either a confirmed order or one still pending, for merged listings.
#[derive(Clone, Debug, PartialEq)]
pub enum CurrentOrder {
    Placed(Order),
    Pending(PendingOrder),
}

impl CurrentOrder {
    pub fn created_at(&self) -> &str {
        match self {
            Self::Placed(order) => &order.created_at,
            Self::Pending(order) => &order.created_at,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedOrders {
    #[serde(default)]
    pending_orders: Vec<PendingOrder>,
    #[serde(default)]
    last_created_orders: Vec<Order>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderState {
    pub orders: Vec<Order>,
    pub farmer_orders: Vec<Order>,
    pub pending_orders: Vec<PendingOrder>,
    pub last_created_orders: Vec<Order>,
    pub loading: bool,
    pub loading_farmer_orders: bool,
    pub error: Option<String>,
}

pub struct OrderStore {
    state: RwLock<OrderState>,
    storage: Arc<dyn Storage>,
}

impl OrderStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { state: RwLock::new(OrderState::default()), storage }
    }

    pub fn rehydrate(&self) {
        let persisted: PersistedOrders = load_json(self.storage.as_ref(), ORDER_STORAGE_KEY).unwrap_or_default();
        let mut state = self.write();
        state.pending_orders = persisted.pending_orders;
        state.last_created_orders = persisted.last_created_orders;
    }

    #[must_use]
    pub fn snapshot(&self) -> OrderState {
        self.read().clone()
    }

    // =========================================================================
    // SERVER ORDERS
    // =========================================================================

    pub fn set_orders(&self, orders: Vec<Order>) {
        self.write().orders = orders;
    }

    pub fn set_farmer_orders(&self, orders: Vec<Order>) {
        self.write().farmer_orders = orders;
    }

    /// Prepend a newly created order.
    pub fn add_order(&self, order: Order) {
        self.write().orders.insert(0, order);
    }

    /// Update status in both consumer and farmer lists.
    pub fn update_order_status(&self, order_id: &str, status: OrderStatus) {
        let mut state = self.write();
        let OrderState { orders, farmer_orders, .. } = &mut *state;
        for order in orders.iter_mut().chain(farmer_orders.iter_mut()) {
            if order.id == order_id {
                order.status = status;
            }
        }
    }

    pub fn set_last_created_orders(&self, orders: Vec<Order>) {
        self.persisting(|state| state.last_created_orders = orders);
    }

    pub fn clear_last_created_orders(&self) {
        self.persisting(|state| state.last_created_orders.clear());
    }

    // =========================================================================
    // PENDING ORDERS
    // =========================================================================

    pub fn add_pending_order(&self, order: PendingOrder) {
        self.persisting(|state| state.pending_orders.insert(0, order));
    }

    pub fn remove_pending_order(&self, temp_id: &str) {
        self.persisting(|state| state.pending_orders.retain(|o| o.temp_id != temp_id));
    }

    pub fn clear_pending_orders(&self) {
        self.persisting(|state| state.pending_orders.clear());
    }

    pub fn set_error(&self, error: Option<String>) {
        self.write().error = error;
    }

    // =========================================================================
    // API
    // =========================================================================

    /// Load the consumer's orders. Failures land in `error`.
    pub async fn fetch_all<T: Transport>(&self, api: &ApiClient<T>) {
        {
            let mut state = self.write();
            state.loading = true;
            state.error = None;
        }
        let result = api.my_orders().await;
        let mut state = self.write();
        match result {
            Ok(orders) => state.orders = orders,
            Err(e) => state.error = Some(load_error_text(&e)),
        }
        state.loading = false;
    }

    /// Load orders addressed to the signed-in farmer. Failures land in `error`.
    pub async fn fetch_farmer<T: Transport>(&self, api: &ApiClient<T>) {
        {
            let mut state = self.write();
            state.loading_farmer_orders = true;
            state.error = None;
        }
        let result = api.farmer_orders().await;
        let mut state = self.write();
        match result {
            Ok(orders) => state.farmer_orders = orders,
            Err(e) => state.error = Some(load_error_text(&e)),
        }
        state.loading_farmer_orders = false;
    }

    /// Change an order's status on the backend, then locally.
    /// Returns whether the change went through.
    pub async fn change_status<T: Transport>(
        &self,
        api: &ApiClient<T>,
        order_id: &str,
        status: OrderStatus,
        actor: OrderActor,
    ) -> bool {
        let body = ChangeOrderStatusRequest { order_id: order_id.to_owned(), status };
        match api.change_order_status(actor, &body).await {
            Ok(()) => {
                self.update_order_status(order_id, status);
                true
            }
            Err(e) => {
                log::warn!("order status change failed for {order_id}: {e}");
                self.write().error = Some(e.message().to_owned());
                false
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn total_orders(&self) -> usize {
        let state = self.read();
        state.orders.len() + state.pending_orders.len()
    }

    /// Search consumer orders first, then farmer orders.
    #[must_use]
    pub fn order(&self, id: &str) -> Option<Order> {
        let state = self.read();
        state
            .orders
            .iter()
            .chain(state.farmer_orders.iter())
            .find(|o| o.id == id)
            .cloned()
    }

    #[must_use]
    pub fn pending_by_farmer(&self) -> BTreeMap<String, Vec<PendingOrder>> {
        let mut groups: BTreeMap<String, Vec<PendingOrder>> = BTreeMap::new();
        for order in &self.read().pending_orders {
            groups.entry(order.farmer_id.clone()).or_default().push(order.clone());
        }
        groups
    }

    /// Placed and pending orders together, newest first. Timestamps are
    /// ISO-8601 strings and compare lexicographically.
    #[must_use]
    pub fn current_orders(&self) -> Vec<CurrentOrder> {
        let state = self.read();
        let mut all: Vec<CurrentOrder> = state
            .orders
            .iter()
            .cloned()
            .map(CurrentOrder::Placed)
            .chain(state.pending_orders.iter().cloned().map(CurrentOrder::Pending))
            .collect();
        all.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        all
    }

    fn persisting(&self, apply: impl FnOnce(&mut OrderState)) {
        let persisted = {
            let mut state = self.write();
            apply(&mut state);
            PersistedOrders {
                pending_orders: state.pending_orders.clone(),
                last_created_orders: state.last_created_orders.clone(),
            }
        };
        persist_json(self.storage.as_ref(), ORDER_STORAGE_KEY, &persisted);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, OrderState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, OrderState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_error_text(err: &ApiError) -> String {
    match err {
        ApiError::Server { message, .. } => message.clone(),
        _ => LOAD_FAILED_MESSAGE.to_owned(),
    }
}
