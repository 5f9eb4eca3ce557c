//! # client
//!
//! Leptos + WASM session core for the Agrimart storefront.
//!
//! This crate owns the browser-side session lifecycle: persisted token and
//! user stores, the bearer-token HTTP wrapper and its REST service calls,
//! cart/order state, and the route guards that gate page rendering on
//! session and role state.

pub mod components;
pub mod config;
pub mod net;
pub mod routes;
pub mod state;
pub mod util;

/// Install panic and console logging hooks for the browser build.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
