//! Durable key-value storage behind the persisted stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session, user, cart, and order stores persist through the [`Storage`]
//! trait. The browser build writes to `localStorage`; tests and non-browser
//! builds use [`MemoryStorage`].

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const IS_LOGGED_IN_KEY: &str = "isLoggedIn";
pub const USER_STORAGE_KEY: &str = "user-storage";
pub const CART_STORAGE_KEY: &str = "cart-storage";
pub const ORDER_STORAGE_KEY: &str = "order-storage";

/// Errors raised while writing durable state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No storage backend is reachable (e.g. private browsing, no window).
    #[error("storage unavailable")]
    Unavailable,
    /// The backend rejected the write (quota, security policy).
    #[error("storage write failed for {key}: {reason}")]
    Write { key: String, reason: String },
    /// The value could not be serialized to JSON.
    #[error("storage serialize failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage with `localStorage` semantics.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend is unreachable.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Load a JSON value for `key`. Missing or malformed entries yield `None`.
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("discarding malformed stored value for {key}: {e}");
            None
        }
    }
}

/// Save `value` as JSON under `key`.
///
/// # Errors
///
/// Returns [`StorageError`] if serialization or the write fails.
pub fn save_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, &raw)
}

/// Save, logging instead of propagating failures. Stores keep their
/// in-memory state even when persistence is unavailable.
pub fn persist_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    if let Err(e) = save_json(storage, key, value) {
        log::warn!("failed to persist {key}: {e}");
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// Process-local storage for tests and non-browser targets.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed storage with raw entries, as if written by a previous run.
    #[must_use]
    pub fn with_items<I, K, V>(items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = items.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { items: Mutex::new(map) }
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `window.localStorage`. Inert outside the `hydrate` build.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            None
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            let storage = local_storage().ok_or(StorageError::Unavailable)?;
            storage.set_item(key, value).map_err(|e| StorageError::Write {
                key: key.to_owned(),
                reason: format!("{e:?}"),
            })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Ok(())
        }
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            let storage = local_storage().ok_or(StorageError::Unavailable)?;
            storage.remove_item(key).map_err(|e| StorageError::Write {
                key: key.to_owned(),
                reason: format!("{e:?}"),
            })
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Ok(())
        }
    }
}
