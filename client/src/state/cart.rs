//! Persisted shopping cart mirror.
//!
//! Holds the last cart fetched from `GET /api/cart-items` plus local edits,
//! so the header badge and cart page render instantly after a reload. Only
//! `items` is persisted; loading and error flags are per-session.

#[cfg(test)]
#[path = "cart_test.rs"]
mod cart_test;

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::net::types::CartItem;
use crate::util::storage::{CART_STORAGE_KEY, Storage, load_json, persist_json};

/// Field-wise update for one cart line. `None` leaves the field as-is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartItemPatch {
    pub quantity: Option<u32>,
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct PersistedCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct CartStore {
    state: RwLock<CartState>,
    storage: Arc<dyn Storage>,
}

impl CartStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { state: RwLock::new(CartState::default()), storage }
    }

    pub fn rehydrate(&self) {
        let persisted: PersistedCart = load_json(self.storage.as_ref(), CART_STORAGE_KEY).unwrap_or_default();
        log::debug!("cart rehydrated with {} items", persisted.items.len());
        self.write().items = persisted.items;
    }

    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.read().clone()
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.read().items.clone()
    }

    pub fn set_items(&self, items: Vec<CartItem>) {
        self.mutate(|state| state.items = items);
    }

    pub fn add_item(&self, item: CartItem) {
        self.mutate(|state| state.items.push(item));
    }

    pub fn update_item(&self, id: &str, patch: CartItemPatch) {
        self.mutate(|state| {
            for item in state.items.iter_mut().filter(|item| item.id == id) {
                if let Some(quantity) = patch.quantity {
                    item.quantity = Some(quantity);
                }
                if let Some(created_at) = &patch.created_at {
                    item.created_at = Some(created_at.clone());
                }
            }
        });
    }

    pub fn remove_item(&self, id: &str) {
        self.mutate(|state| state.items.retain(|item| item.id != id));
    }

    pub fn clear(&self) {
        self.mutate(|state| state.items.clear());
    }

    pub fn set_loading(&self, loading: bool) {
        self.write().loading = loading;
    }

    pub fn set_error(&self, error: Option<String>) {
        self.write().error = error;
    }

    /// Sum of quantities. Lines without a quantity are skipped.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.read().items.iter().filter_map(|item| item.quantity).sum()
    }

    /// Sum of `price * quantity`. Lines missing either value are skipped.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.read()
            .items
            .iter()
            .filter_map(|item| {
                let price = item.product.as_ref()?.price?;
                Some(price * f64::from(item.quantity?))
            })
            .sum()
    }

    #[must_use]
    pub fn item(&self, id: &str) -> Option<CartItem> {
        self.read().items.iter().find(|item| item.id == id).cloned()
    }

    /// Apply an item mutation, clear the error, and persist.
    fn mutate(&self, apply: impl FnOnce(&mut CartState)) {
        let persisted = {
            let mut state = self.write();
            apply(&mut state);
            state.error = None;
            PersistedCart { items: state.items.clone() }
        };
        persist_json(self.storage.as_ref(), CART_STORAGE_KEY, &persisted);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, CartState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, CartState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
