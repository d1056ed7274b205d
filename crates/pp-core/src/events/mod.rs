//! Typed signal/subscription primitive used at every component boundary.
//!
//! A [`Signal`] owns an ordered list of handlers. Emission calls them
//! synchronously in subscription order, so an emitter that sends several
//! events in sequence is observed in exactly that sequence by every handler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::Mutex;

/// Handle returned by [`Signal::subscribe`], used to disconnect later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E) + Send>;

struct SignalInner<E> {
    handlers: Mutex<Vec<(SubscriptionId, Handler<E>)>>,
    next_id: AtomicU64,
}

/// Multi-subscriber notification channel for events of type `E`.
///
/// Cloning a signal yields another handle onto the same subscriber list.
/// Handlers run while the subscriber list is locked: a handler must not
/// emit, subscribe to or unsubscribe from the signal that is invoking it.
pub struct Signal<E> {
    inner: Arc<SignalInner<E>>,
}

impl<E> Signal<E> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                handlers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Register a handler; it stays connected until [`Signal::unsubscribe`]
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.handlers.lock().push((id, Box::new(handler)));
        id
    }

    /// Disconnect a handler. Returns `false` if it was not connected.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.inner.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Deliver an event to every connected handler, in subscription order
    pub fn emit(&self, event: &E) {
        let mut handlers = self.inner.handlers.lock();
        for (_, handler) in handlers.iter_mut() {
            handler(event);
        }
    }

    /// Number of connected handlers
    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.lock().len()
    }
}

impl<E> Clone for Signal<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
