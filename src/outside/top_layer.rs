//! Per-purpose stacks of open layers
//!
//! Nested popovers register under a shared purpose (`"outside-click"`,
//! `"scroll-lock"`, ...). The most recently registered entry of a purpose is
//! the top layer, and only it reacts to global events.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::events::{Dispatcher, Subscription};

/// Identity of one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

/// Published whenever a purpose's stack changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerChange {
    pub purpose: &'static str,
    /// The stack after the change, bottom first
    pub stack: Arc<[LayerId]>,
}

type Stacks = HashMap<&'static str, Arc<[LayerId]>>;

/// Registry of layer stacks, shared by every detector of one
/// [`Services`](crate::config::Services) bundle
#[derive(Clone, Default)]
pub struct TopLayerRegistry {
    stacks: Arc<RwLock<Stacks>>,
    next_id: Arc<AtomicU64>,
    changes: Dispatcher<LayerChange>,
}

impl fmt::Debug for TopLayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let purposes = match self.stacks.read() {
            Ok(stacks) => stacks.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        };
        f.debug_struct("TopLayerRegistry")
            .field("purposes", &purposes)
            .finish()
    }
}

impl TopLayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, purpose: &'static str, f: impl FnOnce(&mut Vec<LayerId>)) -> Arc<[LayerId]> {
        let snapshot = {
            let mut stacks = match self.stacks.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let mut next = stacks
                .get(purpose)
                .map(|s| s.to_vec())
                .unwrap_or_default();
            f(&mut next);
            let snapshot: Arc<[LayerId]> = Arc::from(next);
            if snapshot.is_empty() {
                stacks.remove(purpose);
            } else {
                stacks.insert(purpose, snapshot.clone());
            }
            snapshot
        };
        self.changes.dispatch(&LayerChange {
            purpose,
            stack: snapshot.clone(),
        });
        snapshot
    }

    /// Push a new top layer for `purpose`. It stays registered until the
    /// guard is dropped.
    pub fn push(&self, purpose: &'static str) -> LayerGuard {
        let id = LayerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.update(purpose, |stack| stack.push(id));
        log::trace!("layer {:?} pushed for {}", id, purpose);
        LayerGuard {
            registry: self.clone(),
            purpose,
            id,
        }
    }

    fn remove(&self, purpose: &'static str, id: LayerId) {
        self.update(purpose, |stack| stack.retain(|&l| l != id));
    }

    /// Current stack for `purpose`, bottom first
    pub fn stack(&self, purpose: &str) -> Arc<[LayerId]> {
        let stacks = match self.stacks.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        stacks
            .get(purpose)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    pub fn top(&self, purpose: &str) -> Option<LayerId> {
        self.stack(purpose).last().copied()
    }

    pub fn is_top(&self, purpose: &str, id: LayerId) -> bool {
        self.top(purpose) == Some(id)
    }

    /// Subscribe to stack changes of every purpose
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&LayerChange) + Send + Sync + 'static,
    {
        self.changes.on(f)
    }
}

/// Registration of one layer; dropping it pops the layer
pub struct LayerGuard {
    registry: TopLayerRegistry,
    purpose: &'static str,
    id: LayerId,
}

impl fmt::Debug for LayerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerGuard")
            .field("purpose", &self.purpose)
            .field("id", &self.id)
            .finish()
    }
}

impl LayerGuard {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn purpose(&self) -> &'static str {
        self.purpose
    }

    /// Whether this layer currently receives global events
    pub fn is_top(&self) -> bool {
        self.registry.is_top(self.purpose, self.id)
    }
}

impl Drop for LayerGuard {
    fn drop(&mut self) {
        log::trace!("layer {:?} popped for {}", self.id, self.purpose);
        self.registry.remove(self.purpose, self.id);
    }
}
