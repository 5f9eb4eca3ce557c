//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from components so
//! guard decisions, validation, and storage stay testable off-browser.

pub mod guard;
pub mod messages;
pub mod storage;
pub mod validate;
