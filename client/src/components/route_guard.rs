//! Layout wrapper that gates its children on session and role state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps each route group (public, auth, admin-auth, protected, admin,
//! farmer). Children render only once the guard settles on `Render`; a
//! `Redirect` outcome navigates exactly once. Guards that require a session
//! also send the user to `/login` when the backend invalidates it.

use leptos::prelude::*;

use crate::state::context::use_client_context;
use crate::util::guard::{GuardKind, GuardOutcome, GuardState};

/// Render `children` only when the `kind` guard allows it.
#[component]
pub fn RouteGuard(kind: GuardKind, children: ChildrenFn) -> impl IntoView {
    let ctx = use_client_context();
    let state = RwSignal::new(GuardState::NotReady);
    let navigate = leptos_router::hooks::use_navigate();

    #[cfg(feature = "hydrate")]
    {
        use futures::StreamExt;
        use futures::future::{AbortHandle, Abortable};
        use leptos_router::NavigateOptions;

        use crate::state::events::SessionEvent;
        use crate::util::guard::{invalidation_redirect, settle};

        let (settle_abort, settle_reg) = AbortHandle::new_pair();
        let settle_ctx = ctx.clone();
        let settle_navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            let decide = async move {
                let Some(outcome) = settle(&settle_ctx, kind).await else {
                    return;
                };
                if let GuardOutcome::Redirect(route) = &outcome {
                    settle_navigate(route, NavigateOptions { replace: true, ..NavigateOptions::default() });
                }
                state.set(GuardState::Ready(outcome));
            };
            let _ = Abortable::new(decide, settle_reg).await;
        });
        on_cleanup(move || settle_abort.abort());

        if let Some(route) = invalidation_redirect(kind) {
            let (watch_abort, watch_reg) = AbortHandle::new_pair();
            let mut events = ctx.events.subscribe();
            leptos::task::spawn_local(async move {
                let watch = async move {
                    while let Some(event) = events.next().await {
                        if matches!(event, SessionEvent::Invalidated { .. }) {
                            navigate(route, NavigateOptions::default());
                            break;
                        }
                    }
                };
                let _ = Abortable::new(watch, watch_reg).await;
            });
            on_cleanup(move || watch_abort.abort());
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (ctx, navigate, kind);
    }

    view! {
        <Show when=move || state.get() == GuardState::Ready(GuardOutcome::Render)>
            {children()}
        </Show>
    }
}
