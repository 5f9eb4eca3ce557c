//! Client-side session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stores are plain `Send + Sync` structs behind `Arc`, owned by one
//! [`context::ClientContext`]. Changes are announced on the
//! [`events::SessionEvents`] bus so route guards can re-evaluate.

pub mod cart;
pub mod context;
pub mod events;
pub mod orders;
pub mod ready;
pub mod session;
pub mod user;
