//! Lifecycle Hook Bus
//!
//! A typed notifier the cache calls around mutations and on expiration. Kept
//! as an explicit collaborator injected into the operations that emit, rather
//! than an event-emitter base class, so the engine stays testable with a
//! plain bus and no listeners.

use std::cell::Cell;
use std::collections::HashMap;

use crate::value::CacheValue;

/// The five lifecycle moments listeners can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEvent {
    BeforeSet,
    AfterSet,
    BeforeDelete,
    AfterDelete,
    Expired,
}

/// Payload handed to listeners.
#[derive(Debug)]
pub enum HookPayload<'a> {
    /// Carried by `BeforeSet` and `AfterSet`
    Set { key: &'a str, value: &'a CacheValue },
    /// Carried by `BeforeDelete` and `AfterDelete`
    Delete { key: &'a str },
    /// Carried by `Expired`
    Expired(&'a ExpiredNotice<'a>),
}

/// One lapsed entry as reported by the sweeper.
///
/// Holds a one-shot deletion capability bound to this key at sweep time. A
/// listener that never calls [`ExpiredNotice::delete_current_key`] vetoes the
/// expiration: the entry stays intact, value and metadata both, and is
/// reported again on every subsequent tick until deleted.
#[derive(Debug)]
pub struct ExpiredNotice<'a> {
    pub key: &'a str,
    pub value: &'a CacheValue,
    /// The entry's TTL in seconds
    pub ttl: u64,
    delete_requested: Cell<bool>,
}

impl<'a> ExpiredNotice<'a> {
    pub(crate) fn new(key: &'a str, value: &'a CacheValue, ttl: u64) -> Self {
        Self {
            key,
            value,
            ttl,
            delete_requested: Cell::new(false),
        }
    }

    /// Asks the sweeper to remove this entry once all listeners have run.
    ///
    /// Removal goes through the same atomic path as an explicit delete,
    /// without the delete hook pair. Calling this more than once is the same
    /// as calling it once.
    pub fn delete_current_key(&self) {
        self.delete_requested.set(true);
    }

    pub(crate) fn delete_requested(&self) -> bool {
        self.delete_requested.get()
    }
}

/// A registered hook callback.
pub type Listener = Box<dyn Fn(&HookPayload<'_>) + Send + Sync>;

/// Dispatches cache lifecycle events to registered listeners.
///
/// All listeners of a kind run synchronously, in registration order, on the
/// call stack of the operation that triggered them. Listeners must not call
/// back into the cache; the expired notice carries its own deletion
/// capability so they never need to.
#[derive(Default)]
pub struct HookBus {
    listeners: HashMap<CacheEvent, Vec<Listener>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `listener` to the end of the listener list for `event`.
    pub fn on<F>(&mut self, event: CacheEvent, listener: F)
    where
        F: Fn(&HookPayload<'_>) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event)
            .or_default()
            .push(Box::new(listener));
    }

    /// Whether anything is subscribed to `event`.
    pub fn has_listeners(&self, event: CacheEvent) -> bool {
        self.listeners
            .get(&event)
            .is_some_and(|listeners| !listeners.is_empty())
    }

    /// Invokes every listener of `event` with `payload`, in registration
    /// order.
    pub fn emit(&self, event: CacheEvent, payload: &HookPayload<'_>) {
        if let Some(listeners) = self.listeners.get(&event) {
            for listener in listeners {
                listener(payload);
            }
        }
    }

    /// Detaches every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
