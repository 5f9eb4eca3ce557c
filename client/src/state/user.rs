//! Authenticated user profile and roles.
//!
//! SYSTEM CONTEXT
//! ==============
//! Role-gated guards (admin, farmer) read this store. It is filled from
//! `GET /auth/info` after login or rehydration and cleared alongside the
//! token store.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use super::events::{SessionEvent, SessionEvents};
use crate::net::http::{ApiClient, ApiError};
use crate::net::transport::Transport;
use crate::net::types::{AccountInfo, Role};
use crate::util::storage::{Storage, USER_STORAGE_KEY, load_json, persist_json};

/// Profile of the signed-in user. `id == None` means nobody is loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

impl User {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.id.is_some()
    }

    /// Role membership. Always false until the profile is loaded.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.is_loaded() && self.roles.as_ref().is_some_and(|roles| roles.contains(&role))
    }
}

impl From<AccountInfo> for User {
    fn from(info: AccountInfo) -> Self {
        Self {
            id: info.id,
            display_name: info.display_name,
            email: info.email,
            avatar: info.avatar,
            roles: info.roles,
        }
    }
}

/// Where the profile stands relative to the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfileLoad {
    /// No profile yet, and no failed fetch since the last reset.
    #[default]
    Pending,
    Loaded,
    /// The last `GET /auth/info` failed; roles are treated as absent.
    Failed,
}

/// Persisted, shareable user store.
pub struct UserStore {
    user: RwLock<User>,
    load: RwLock<ProfileLoad>,
    storage: Arc<dyn Storage>,
    events: SessionEvents,
}

impl UserStore {
    pub fn new(storage: Arc<dyn Storage>, events: SessionEvents) -> Self {
        Self { user: RwLock::new(User::default()), load: RwLock::new(ProfileLoad::Pending), storage, events }
    }

    /// Restore the profile saved by a previous run.
    pub fn rehydrate(&self) -> User {
        let restored: User = load_json(self.storage.as_ref(), USER_STORAGE_KEY).unwrap_or_default();
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = restored.clone();
        self.set_load(load_for(&restored));
        restored
    }

    #[must_use]
    pub fn user(&self) -> User {
        self.user.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn load(&self) -> ProfileLoad {
        *self.load.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.user.read().unwrap_or_else(PoisonError::into_inner).has_role(role)
    }

    /// Overlay the fields present in `patch` onto the current profile.
    pub fn set_user(&self, patch: AccountInfo) {
        self.update(|user| {
            if patch.id.is_some() {
                user.id = patch.id;
            }
            if patch.display_name.is_some() {
                user.display_name = patch.display_name;
            }
            if patch.email.is_some() {
                user.email = patch.email;
            }
            if patch.avatar.is_some() {
                user.avatar = patch.avatar;
            }
            if patch.roles.is_some() {
                user.roles = patch.roles;
            }
        });
    }

    pub fn clear_user(&self) {
        self.update(|user| *user = User::default());
    }

    /// Reload the profile from `GET /auth/info`. A failed fetch leaves the
    /// store empty and marked [`ProfileLoad::Failed`].
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the backend call.
    pub async fn fetch_user<T: Transport>(&self, api: &ApiClient<T>) -> Result<User, ApiError> {
        // A retry starts undecided again.
        if self.load() == ProfileLoad::Failed {
            self.set_load(ProfileLoad::Pending);
        }
        match api.account_info().await {
            Ok(info) => {
                let user = User::from(info);
                let stored = user.clone();
                self.update(move |current| *current = stored);
                Ok(user)
            }
            Err(e) => {
                log::warn!("user fetch failed: {e}");
                self.replace(|user| *user = User::default(), |_| ProfileLoad::Failed);
                Err(e)
            }
        }
    }

    fn update(&self, apply: impl FnOnce(&mut User)) {
        self.replace(apply, load_for);
    }

    /// Apply `apply`, record the resulting load state, persist, then announce.
    fn replace(&self, apply: impl FnOnce(&mut User), load: impl FnOnce(&User) -> ProfileLoad) {
        let snapshot = {
            let mut user = self.user.write().unwrap_or_else(PoisonError::into_inner);
            apply(&mut user);
            user.clone()
        };
        self.set_load(load(&snapshot));
        persist_json(self.storage.as_ref(), USER_STORAGE_KEY, &snapshot);
        self.events.emit(SessionEvent::UserChanged);
    }

    fn set_load(&self, load: ProfileLoad) {
        *self.load.write().unwrap_or_else(PoisonError::into_inner) = load;
    }
}

fn load_for(user: &User) -> ProfileLoad {
    if user.is_loaded() { ProfileLoad::Loaded } else { ProfileLoad::Pending }
}
