//! Application-wide session context.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`ClientContext`] is built at app start and provided through Leptos
//! context. It owns every store, the event bus, and the storage-ready latch,
//! and installs the listener that clears the session when the backend
//! rejects our credentials.
//!
//! DESIGN
//! ======
//! The invalidation listener holds `Weak` store handles: the stores hold the
//! bus, so strong handles would keep everything alive after teardown.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::sync::{Arc, Weak};

use super::cart::CartStore;
use super::events::{SessionEvent, SessionEvents};
use super::orders::OrderStore;
use super::ready::StorageReady;
use super::session::SessionStore;
use super::user::{User, UserStore};
use crate::config::ClientConfig;
use crate::net::http::{ApiClient, ApiError};
use crate::net::transport::Transport;
use crate::net::types::{Farmer, LoginRequest, UpgradeToFarmerRequest};
use crate::util::storage::Storage;

#[derive(Clone)]
pub struct ClientContext {
    pub config: Arc<ClientConfig>,
    pub storage: Arc<dyn Storage>,
    pub events: SessionEvents,
    pub ready: StorageReady,
    pub session: Arc<SessionStore>,
    pub user: Arc<UserStore>,
    pub cart: Arc<CartStore>,
    pub orders: Arc<OrderStore>,
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("config", &self.config)
            .field("ready", &self.ready)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ClientContext {
    /// Build empty stores over `storage` and wire session invalidation.
    /// Call [`rehydrate`](Self::rehydrate) before any guard is evaluated.
    pub fn new(config: ClientConfig, storage: Arc<dyn Storage>) -> Self {
        let events = SessionEvents::new();
        let session = Arc::new(SessionStore::new(Arc::clone(&storage), events.clone()));
        let user = Arc::new(UserStore::new(Arc::clone(&storage), events.clone()));
        let cart = Arc::new(CartStore::new(Arc::clone(&storage)));
        let orders = Arc::new(OrderStore::new(Arc::clone(&storage)));

        install_invalidation_listener(&events, Arc::downgrade(&session), Arc::downgrade(&user));

        Self {
            config: Arc::new(config),
            storage,
            events,
            ready: StorageReady::new(),
            session,
            user,
            cart,
            orders,
        }
    }

    /// Restore every store from durable storage, then fire the ready signal.
    pub fn rehydrate(&self) {
        self.session.rehydrate();
        self.user.rehydrate();
        self.cart.rehydrate();
        self.orders.rehydrate();
        self.ready.mark_ready();
    }

    /// REST client sharing this context's session and event bus.
    pub fn api<T: Transport>(&self, transport: T) -> ApiClient<T> {
        ApiClient::new(transport, Arc::clone(&self.config), Arc::clone(&self.session), self.events.clone())
    }

    /// Exchange the stored refresh token for a fresh access token. A failed
    /// exchange leaves the session as it was.
    pub async fn refresh_session<T: Transport>(&self, api: &ApiClient<T>) {
        let Some(refresh_token) = self.session.refresh_token() else {
            return;
        };
        match api.refresh_token(&refresh_token).await {
            Ok(tokens) => match tokens.refresh_token {
                Some(rotated) => self.session.set_tokens(tokens.access_token, rotated),
                None => self.session.set_access_token(tokens.access_token),
            },
            Err(e) => log::warn!("token refresh failed: {e}"),
        }
    }

    /// Startup sequence once storage is ready: refresh the access token,
    /// then load the user profile if still logged in.
    pub async fn bootstrap<T: Transport>(&self, api: &ApiClient<T>) {
        self.ready.wait().await;
        self.refresh_session(api).await;
        if self.session.is_logged_in() {
            let _ = self.user.fetch_user(api).await;
        }
    }

    /// Sign in, store the token pair, and load the profile.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the login or profile call.
    pub async fn login<T: Transport>(&self, api: &ApiClient<T>, body: &LoginRequest) -> Result<User, ApiError> {
        let tokens = api.login(body).await?;
        match tokens.refresh_token {
            Some(refresh_token) => self.session.set_tokens(tokens.access_token, refresh_token),
            None => self.session.set_access_token(tokens.access_token),
        }
        self.user.fetch_user(api).await
    }

    /// Revoke the refresh token server-side (best effort) and clear local
    /// session, profile, and cart.
    pub async fn logout<T: Transport>(&self, api: &ApiClient<T>) {
        if let Some(refresh_token) = self.session.refresh_token() {
            if let Err(e) = api.logout(&refresh_token).await {
                log::warn!("logout request failed: {e}");
            }
        }
        self.session.clear_tokens();
        self.user.clear_user();
        self.cart.clear();
    }

    /// Upgrade the account, switch to the returned `FARMER` tokens, and
    /// reload the profile so role guards see the new role.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the upgrade call.
    pub async fn upgrade_to_farmer<T: Transport>(
        &self,
        api: &ApiClient<T>,
        body: &UpgradeToFarmerRequest,
    ) -> Result<Farmer, ApiError> {
        let response = api.upgrade_to_farmer(body).await?;
        self.session.set_tokens(response.access_token, response.refresh_token);
        if let Err(e) = self.user.fetch_user(api).await {
            log::warn!("profile reload after upgrade failed: {e}");
        }
        Ok(response.farmer_response)
    }
}

fn install_invalidation_listener(events: &SessionEvents, session: Weak<SessionStore>, user: Weak<UserStore>) {
    events.on(move |event| {
        let SessionEvent::Invalidated { status } = event else {
            return;
        };
        log::info!("session invalidated by status {status}");
        if let Some(session) = session.upgrade() {
            session.clear_tokens();
        }
        if let Some(user) = user.upgrade() {
            user.clear_user();
        }
    });
}

// =============================================================================
// BROWSER WIRING
// =============================================================================

/// Build the browser context, provide it to the Leptos tree, and start the
/// token refresh loop. Rehydration only happens in the browser; on the
/// server the ready signal never fires and guards render nothing.
pub fn provide_client_context() -> ClientContext {
    let storage: Arc<dyn Storage> = Arc::new(crate::util::storage::LocalStorage);
    let ctx = ClientContext::new(ClientConfig::from_env(), storage);

    #[cfg(feature = "hydrate")]
    {
        ctx.rehydrate();
        leptos::task::spawn_local(refresh_loop(ctx.clone()));
    }

    leptos::prelude::provide_context(ctx.clone());
    ctx
}

/// Fetch the context provided by [`provide_client_context`].
pub fn use_client_context() -> ClientContext {
    leptos::prelude::expect_context::<ClientContext>()
}

#[cfg(feature = "hydrate")]
async fn refresh_loop(ctx: ClientContext) {
    let api = ctx.api(crate::net::transport::BrowserTransport);
    ctx.bootstrap(&api).await;
    let period = ctx.config.refresh_period();
    loop {
        gloo_timers::future::sleep(period).await;
        if ctx.session.is_logged_in() {
            ctx.refresh_session(&api).await;
        }
    }
}
