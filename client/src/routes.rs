//! Named navigation targets used by guards and session flows.

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const NOT_FOUND: &str = "/not-found";
pub const ADMIN: &str = "/admin";
pub const ADMIN_LOGIN: &str = "/admin/login";
