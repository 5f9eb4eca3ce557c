//! Route guard decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each guarded layout owns one [`Guard`]. It stays `NotReady` until durable
//! storage has been rehydrated, then makes exactly one decision: render the
//! children or redirect. [`settle`] drives that decision from a
//! [`ClientContext`]; the Leptos wrapper lives in `components::route_guard`.
//!
//! DESIGN
//! ======
//! [`evaluate`] is pure so every predicate is testable without a browser.
//! `None` means "not decidable yet" (the profile is still loading), which
//! keeps the guard `NotReady` until the next session event. A failed
//! profile fetch announces itself with `UserChanged` and is decidable.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use futures::StreamExt;

use crate::net::types::Role;
use crate::routes;
use crate::state::context::ClientContext;
use crate::state::session::Session;
use crate::state::user::{ProfileLoad, User};

/// Which layout is being guarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardKind {
    /// Always renders.
    Public,
    /// Login/register pages: signed-in users are sent to their pending redirect.
    Auth,
    /// Admin login page: signed-in users are sent to the admin area.
    AdminAuth,
    /// Requires stored session tokens.
    Protected,
    /// Requires the `ADMIN` role.
    Admin,
    /// Requires the `FARMER` role.
    Farmer,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    Redirect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardState {
    NotReady,
    Ready(GuardOutcome),
}

fn redirect(route: &str) -> Option<GuardOutcome> {
    Some(GuardOutcome::Redirect(route.to_owned()))
}

/// Decide what a guard of `kind` does for this session and profile.
/// Returns `None` while the decision depends on a profile still loading;
/// a failed profile load counts as having no roles.
pub fn evaluate(kind: GuardKind, session: &Session, user: &User, load: ProfileLoad) -> Option<GuardOutcome> {
    let role = |role: Role| -> Option<bool> {
        if user.is_loaded() {
            Some(user.has_role(role))
        } else if load == ProfileLoad::Failed {
            Some(false)
        } else {
            None
        }
    };
    match kind {
        GuardKind::Public => Some(GuardOutcome::Render),
        GuardKind::Auth => {
            if session.is_logged_in() {
                redirect(&session.redirect_path)
            } else {
                Some(GuardOutcome::Render)
            }
        }
        // Only admins are bounced to the admin area; anyone else would be
        // sent straight back here by the `Admin` guard.
        GuardKind::AdminAuth => {
            if !session.is_logged_in() {
                Some(GuardOutcome::Render)
            } else if role(Role::Admin)? {
                redirect(routes::ADMIN)
            } else {
                Some(GuardOutcome::Render)
            }
        }
        GuardKind::Protected => {
            if session.has_refresh_token() {
                Some(GuardOutcome::Render)
            } else {
                redirect(routes::LOGIN)
            }
        }
        GuardKind::Admin => {
            if !session.is_logged_in() {
                redirect(routes::ADMIN_LOGIN)
            } else if role(Role::Admin)? {
                Some(GuardOutcome::Render)
            } else {
                redirect(routes::ADMIN_LOGIN)
            }
        }
        GuardKind::Farmer => {
            if !session.is_logged_in() {
                redirect(routes::LOGIN)
            } else if role(Role::Farmer)? {
                Some(GuardOutcome::Render)
            } else {
                redirect(routes::NOT_FOUND)
            }
        }
    }
}

/// Where a mounted guard sends the user when the backend invalidates the
/// session. Pages that never required a session stay put.
pub fn invalidation_redirect(kind: GuardKind) -> Option<&'static str> {
    match kind {
        GuardKind::Protected | GuardKind::Admin | GuardKind::Farmer => Some(routes::LOGIN),
        GuardKind::Public | GuardKind::Auth | GuardKind::AdminAuth => None,
    }
}

/// One guard's `NotReady -> Ready` state machine.
#[derive(Clone, Debug)]
pub struct Guard {
    kind: GuardKind,
    state: GuardState,
}

impl Guard {
    pub fn new(kind: GuardKind) -> Self {
        Self { kind, state: GuardState::NotReady }
    }

    pub fn kind(&self) -> GuardKind {
        self.kind
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Feed the latest state. Returns the outcome only on the call that
    /// moves the guard to `Ready`; every later call returns `None`.
    pub fn observe(
        &mut self,
        storage_ready: bool,
        session: &Session,
        user: &User,
        load: ProfileLoad,
    ) -> Option<GuardOutcome> {
        if !storage_ready || self.state != GuardState::NotReady {
            return None;
        }
        let outcome = evaluate(self.kind, session, user, load)?;
        self.state = GuardState::Ready(outcome.clone());
        Some(outcome)
    }
}

/// Wait for rehydration and the session events needed to decide, then
/// return the decision. An `Auth` redirect consumes the pending redirect
/// path. Returns `None` if the context is torn down first.
pub async fn settle(ctx: &ClientContext, kind: GuardKind) -> Option<GuardOutcome> {
    // Subscribe before waiting so no change between rehydration and the
    // first evaluation is lost.
    let mut events = ctx.events.subscribe();
    ctx.ready.wait().await;

    let mut guard = Guard::new(kind);
    loop {
        let observed = guard.observe(ctx.ready.is_ready(), &ctx.session.snapshot(), &ctx.user.user(), ctx.user.load());
        if let Some(outcome) = observed {
            if kind == GuardKind::Auth && matches!(outcome, GuardOutcome::Redirect(_)) {
                ctx.session.take_redirect();
            }
            log::debug!("guard {kind:?} settled: {outcome:?}");
            return Some(outcome);
        }
        events.next().await?;
    }
}
