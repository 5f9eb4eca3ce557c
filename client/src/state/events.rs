//! Session lifecycle broadcast.
//!
//! DESIGN
//! ======
//! The HTTP layer never mutates stores directly. It emits
//! [`SessionEvent::Invalidated`] and whoever cares (the context's store
//! listener, mounted route guards) reacts. Synchronous listeners run in the
//! emitting turn; async consumers read an unbounded channel.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::sync::{Arc, Mutex, PoisonError};

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

/// Something about the session changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// Tokens were stored (login, refresh, token hand-off).
    TokensSet,
    /// Tokens were cleared (logout or invalidation).
    TokensCleared,
    /// The user profile was replaced, merged, or cleared.
    UserChanged,
    /// The backend rejected our credentials with this HTTP status.
    Invalidated { status: u16 },
}

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    listeners: Vec<Listener>,
    channels: Vec<UnboundedSender<SessionEvent>>,
}

/// Cloneable handle to the shared event bus.
#[derive(Clone, Default)]
pub struct SessionEvents {
    inner: Arc<Mutex<Subscribers>>,
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("SessionEvents")
            .field("listeners", &inner.listeners.len())
            .field("channels", &inner.channels.len())
            .finish()
    }
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener invoked synchronously on every emit.
    pub fn on<F>(&self, listener: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .push(Arc::new(listener));
    }

    /// Open a channel receiving every subsequent event. Dropping the
    /// receiver unsubscribes on the next emit.
    pub fn subscribe(&self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = unbounded();
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .channels
            .push(tx);
        rx
    }

    pub fn emit(&self, event: SessionEvent) {
        // Listeners may emit follow-up events, so they run after the lock is released.
        let listeners = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.channels.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
            inner.listeners.clone()
        };
        log::debug!("session event: {event:?}");
        for listener in &listeners {
            listener(&event);
        }
    }
}
