//! Token store: access/refresh tokens and the pending post-login redirect.
//!
//! SYSTEM CONTEXT
//! ==============
//! Read by the HTTP wrapper (bearer header) and route guards (login state).
//! Written by login/logout flows, the refresh loop, and the invalidation
//! listener installed by [`ClientContext`](super::context::ClientContext).
//!
//! DESIGN
//! ======
//! `is_logged_in` is derived from the access token rather than stored, so
//! the two can never disagree. The `isLoggedIn` storage key is still
//! written for anything else reading the same storage.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, PoisonError, RwLock};

use super::events::{SessionEvent, SessionEvents};
use crate::routes;
use crate::util::storage::{
    ACCESS_TOKEN_KEY, IS_LOGGED_IN_KEY, REFRESH_TOKEN_KEY, Storage, StorageError, save_json,
};

/// Current session credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Where the auth guard sends the user after a successful login.
    pub redirect_path: String,
}

impl Default for Session {
    fn default() -> Self {
        Self { access_token: None, refresh_token: None, redirect_path: routes::HOME.to_owned() }
    }
}

impl Session {
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }

    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Persisted, shareable token store.
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Arc<dyn Storage>,
    events: SessionEvents,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Empty store. Call [`rehydrate`](Self::rehydrate) to restore persisted tokens.
    pub fn new(storage: Arc<dyn Storage>, events: SessionEvents) -> Self {
        Self { state: RwLock::new(Session::default()), storage, events }
    }

    /// Restore tokens from durable storage and return the restored session.
    pub fn rehydrate(&self) -> Session {
        let access_token = read_token(self.storage.as_ref(), ACCESS_TOKEN_KEY);
        let refresh_token = read_token(self.storage.as_ref(), REFRESH_TOKEN_KEY);

        let mut state = self.write();
        state.access_token = access_token;
        state.refresh_token = refresh_token;
        log::debug!("session rehydrated (logged_in={})", state.is_logged_in());
        state.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.read().is_logged_in()
    }

    #[must_use]
    pub fn has_refresh_token(&self) -> bool {
        self.read().has_refresh_token()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    /// Store both tokens and mark the session logged in.
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();
        {
            let mut state = self.write();
            state.access_token = Some(access_token.clone());
            state.refresh_token = Some(refresh_token.clone());
        }
        self.persist(Some(&access_token), Some(&refresh_token));
        self.events.emit(SessionEvent::TokensSet);
    }

    /// Replace only the access token (refresh-token exchange).
    pub fn set_access_token(&self, access_token: impl Into<String>) {
        let access_token = access_token.into();
        let refresh_token = {
            let mut state = self.write();
            state.access_token = Some(access_token.clone());
            state.refresh_token.clone()
        };
        self.persist(Some(&access_token), refresh_token.as_deref());
        self.events.emit(SessionEvent::TokensSet);
    }

    /// Reset every field to its initial value, in memory and in storage.
    pub fn clear_tokens(&self) {
        *self.write() = Session::default();
        self.persist(None, None);
        self.events.emit(SessionEvent::TokensCleared);
    }

    pub fn set_redirect(&self, path: impl Into<String>) {
        self.write().redirect_path = path.into();
    }

    /// Return the pending redirect and reset it to home.
    pub fn take_redirect(&self) -> String {
        std::mem::replace(&mut self.write().redirect_path, routes::HOME.to_owned())
    }

    fn persist(&self, access_token: Option<&str>, refresh_token: Option<&str>) {
        let result = write_token(self.storage.as_ref(), ACCESS_TOKEN_KEY, access_token)
            .and_then(|()| write_token(self.storage.as_ref(), REFRESH_TOKEN_KEY, refresh_token))
            .and_then(|()| save_json(self.storage.as_ref(), IS_LOGGED_IN_KEY, &access_token.is_some()));
        if let Err(e) = result {
            log::warn!("failed to persist session: {e}");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Tokens are stored JSON-encoded; a bare string written by other code is
/// accepted as-is.
fn read_token(storage: &dyn Storage, key: &str) -> Option<String> {
    let raw = storage.get_item(key)?;
    let token = match serde_json::from_str::<Option<String>>(&raw) {
        Ok(token) => token,
        Err(_) => Some(raw),
    };
    token.filter(|t| !t.is_empty())
}

fn write_token(storage: &dyn Storage, key: &str, token: Option<&str>) -> Result<(), StorageError> {
    match token {
        Some(token) => save_json(storage, key, &token),
        None => storage.remove_item(key),
    }
}
