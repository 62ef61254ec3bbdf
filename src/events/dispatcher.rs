//! Typed event dispatcher with copy-on-write handler lists
//!
//! Handlers are stored in an immutable snapshot that is swapped on every
//! subscribe/unsubscribe. A dispatch iterates the snapshot it started with,
//! so handlers may subscribe or unsubscribe (themselves included) while the
//! dispatch is running.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;
type HandlerList<E> = Arc<Vec<(u64, Handler<E>)>>;

/// Dispatcher for one event type
pub struct Dispatcher<E> {
    handlers: Arc<RwLock<HandlerList<E>>>,
    next_id: Arc<AtomicU64>,
}

impl<E> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            next_id: self.next_id.clone(),
        }
    }
}

impl<E> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.len())
            .finish()
    }
}

impl<E> Dispatcher<E> {
    /// Create a dispatcher with no handlers
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn snapshot(&self) -> HandlerList<E> {
        match self.handlers.read() {
            Ok(list) => list.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Vec<(u64, Handler<E>)>)) {
        let mut guard = match self.handlers.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = guard.as_ref().clone();
        f(&mut next);
        *guard = Arc::new(next);
    }

    /// Register a handler. Dropping the returned [`Subscription`] keeps the
    /// handler registered; call [`Subscription::unsubscribe`] to remove it.
    pub fn on<F>(&self, f: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
        E: 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.update(|list| list.push((id, Arc::new(f))));

        let dispatcher = self.clone();
        Subscription {
            remove: Some(Box::new(move || dispatcher.off(id))),
        }
    }

    fn off(&self, id: u64) {
        self.update(|list| list.retain(|(handler_id, _)| *handler_id != id));
    }

    /// Dispatch an event to every handler registered when the dispatch began
    pub fn dispatch(&self, event: &E) {
        let handlers = self.snapshot();
        for (_, handler) in handlers.iter() {
            handler(event);
        }
    }

    /// Remove all handlers
    pub fn clear(&self) {
        self.update(Vec::clear);
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether no handler is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disposer returned by [`Dispatcher::on`]
#[must_use = "a subscription must be unsubscribed when its owner unmounts"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

impl Subscription {
    /// Remove the handler. Idempotent.
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}
