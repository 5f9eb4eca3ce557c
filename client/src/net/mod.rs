//! Networking modules for the storefront REST backend and widget proxy.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` wraps every call with the bearer token and error normalization,
//! `transport` abstracts the wire, `api`/`shop`/`widgets` name the endpoints,
//! and `types` defines the shared wire schema.

pub mod api;
pub mod http;
pub mod shop;
pub mod transport;
pub mod types;
pub mod widgets;

#[cfg(test)]
pub(crate) mod mock;
