//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read session state from the `ClientContext` provided at app
//! start. Rendering itself belongs to the pages that embed them.

pub mod route_guard;
