//! Observer registration lists for control events.
//!
//! Architecture:
//! - Hosts register callbacks and get a [`SubscriptionId`] back
//! - emit() invokes every callback synchronously on the emitting thread
//! - Callbacks run outside the list lock, so a callback may subscribe,
//!   unsubscribe, or call back into the control that emitted the event
//!
//! Callback order: FIFO (first-subscribed, first-called).

use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Handle returned by `subscribe`, used to detach later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type-erased observer callback
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Multicast list of observers for events of type `E`.
pub struct Observers<E> {
    entries: RwLock<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish()
    }
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Register a callback. Returns the id to pass to [`Observers::remove`].
    pub fn add<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(callback)));
        id
    }

    /// Detach a callback. Returns false if the id was not registered here.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|(entry_id, _)| *entry_id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every registered callback with `event`.
    pub fn emit(&self, event: &E) {
        // Snapshot so callbacks never run under the lock
        let callbacks: Vec<Callback<E>> = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for cb in callbacks {
            cb(event);
        }
    }
}
