//! One-shot "storage rehydrated" signal.
//!
//! Guards await this instead of sleeping for a fixed settle delay, so the
//! first evaluation always sees restored tokens.

#[cfg(test)]
#[path = "ready_test.rs"]
mod ready_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::Shared;

/// Cloneable readiness latch. Fires at most once.
#[derive(Clone)]
pub struct StorageReady {
    ready: Arc<AtomicBool>,
    tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    rx: Shared<oneshot::Receiver<()>>,
}

impl std::fmt::Debug for StorageReady {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageReady").field("ready", &self.is_ready()).finish()
    }
}

impl Default for StorageReady {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageReady {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            ready: Arc::new(AtomicBool::new(false)),
            tx: Arc::new(Mutex::new(Some(tx))),
            rx: rx.shared(),
        }
    }

    /// Release every waiter. Later calls are no-ops.
    pub fn mark_ready(&self) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(tx) = tx {
            self.ready.store(true, Ordering::Release);
            let _ = tx.send(());
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Resolve once [`mark_ready`](Self::mark_ready) has been called.
    pub async fn wait(&self) {
        if self.is_ready() {
            return;
        }
        // A dropped sender only happens when every handle is gone, which
        // means nobody is left to render anyway.
        let _ = self.rx.clone().await;
    }
}
