//! Ordered set of the options currently mounted in one collection
//!
//! Membership changes re-sort the whole list so that index order always
//! matches display order, and report where the active option ended up.

use std::cmp::Ordering;

use crate::dom::Dom;

use super::{CollectionOption, OptionId};

/// Options of one collection, kept in display order
#[derive(Debug, Clone)]
pub struct OptionRegistry<V> {
    options: Vec<CollectionOption<V>>,
}

impl<V> Default for OptionRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OptionRegistry<V> {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
        }
    }

    /// Options in display order
    pub fn options(&self) -> &[CollectionOption<V>] {
        &self.options
    }

    /// Mutable access for text-value caching; order must not be changed
    /// through this slice.
    pub fn options_mut(&mut self) -> &mut [CollectionOption<V>] {
        &mut self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CollectionOption<V>> {
        self.options.get(index)
    }

    pub fn index_of(&self, id: &OptionId) -> Option<usize> {
        self.options.iter().position(|o| &o.id == id)
    }

    /// Add `option` (replacing a live option with the same id) and re-sort.
    /// Returns the active index after relocation by identity.
    pub fn register<D: Dom + ?Sized>(
        &mut self,
        option: CollectionOption<V>,
        dom: &D,
        active: Option<usize>,
    ) -> Option<usize> {
        let active_id = self.active_id(active);
        match self.index_of(&option.id) {
            Some(existing) => self.options[existing] = option,
            None => self.options.push(option),
        }
        self.sort(dom);
        active_id.and_then(|id| self.index_of(&id))
    }

    /// Remove the option with `id`. Unknown ids are a no-op. Returns the
    /// active index after removal; `None` if the active option was removed.
    pub fn unregister(&mut self, id: &OptionId, active: Option<usize>) -> Option<usize> {
        let active_id = self.active_id(active);
        if let Some(index) = self.index_of(id) {
            self.options.remove(index);
        }
        active_id.and_then(|id| self.index_of(&id))
    }

    /// Re-sort without membership change. Returns the relocated active index.
    pub fn reorder<D: Dom + ?Sized>(&mut self, dom: &D, active: Option<usize>) -> Option<usize> {
        let active_id = self.active_id(active);
        self.sort(dom);
        active_id.and_then(|id| self.index_of(&id))
    }

    /// Remove every option
    pub fn clear(&mut self) {
        self.options.clear();
    }

    fn active_id(&self, active: Option<usize>) -> Option<OptionId> {
        active
            .and_then(|i| self.options.get(i))
            .map(|o| o.id.clone())
    }

    /// Sort by `order` when every option carries one, else by composed
    /// document order. Options whose node is detached keep their relative
    /// insertion order after all connected ones.
    fn sort<D: Dom + ?Sized>(&mut self, dom: &D) {
        if self.options.iter().all(|o| o.order.is_some()) {
            self.options.sort_by_key(|o| o.order);
            return;
        }

        let (mut connected, detached): (Vec<_>, Vec<_>) = self
            .options
            .drain(..)
            .partition(|o| dom.is_connected(o.node));
        connected.sort_by(|a, b| {
            dom.document_order(a.node, b.node)
                .unwrap_or(Ordering::Equal)
        });
        if !detached.is_empty() {
            log::trace!(
                "{} option(s) detached during reorder; keeping them last",
                detached.len()
            );
        }
        connected.extend(detached);
        self.options = connected;
    }
}
