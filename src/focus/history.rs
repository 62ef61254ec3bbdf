//! Recently focused elements, newest first

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::dom::{query, Dom, NodeId};
use crate::events::{FocusEvent, PointerEvent};

use super::focusable::is_focusable_element;

/// Bounded, deduplicated most-recently-focused list shared by every focus
/// trap of one [`Services`](crate::config::Services) bundle.
///
/// Readers get an immutable snapshot; writers swap in a new one. Entries that
/// left the document are dropped lazily on read.
#[derive(Clone)]
pub struct ActiveElementHistory {
    capacity: usize,
    entries: Arc<RwLock<Arc<[NodeId]>>>,
}

impl fmt::Debug for ActiveElementHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveElementHistory")
            .field("capacity", &self.capacity)
            .field("entries", &self.snapshot())
            .finish()
    }
}

impl Default for ActiveElementHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ActiveElementHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Arc::new(RwLock::new(Arc::from(Vec::new()))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn snapshot(&self) -> Arc<[NodeId]> {
        match self.entries.read() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, next: Vec<NodeId>) {
        let mut guard = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::from(next);
    }

    /// Record an interaction with `target`. The closest focusable ancestor
    /// is stored, so clicking an icon inside a button records the button.
    /// The document body and non-elements are ignored.
    pub fn record<D: Dom + ?Sized>(&self, dom: &D, target: NodeId) {
        if !dom.is_element(target) || dom.tag_name(target) == Some("body") {
            return;
        }
        let current = self.snapshot();
        if current.first() == Some(&target) {
            return;
        }
        let entry = query::closest(dom, target, |dom, n| is_focusable_element(dom, n))
            .unwrap_or(target);

        let next: Vec<NodeId> = std::iter::once(entry)
            .chain(current.iter().copied().filter(|&n| n != entry))
            .filter(|&n| dom.is_connected(n))
            .take(self.capacity)
            .collect();
        self.store(next);
    }

    /// `focus` listener (capture phase)
    pub fn on_focus<D: Dom + ?Sized>(&self, dom: &D, event: &FocusEvent) {
        self.record(dom, event.target);
    }

    /// `mousedown`/`click` listener (capture phase)
    pub fn on_pointer<D: Dom + ?Sized>(&self, dom: &D, event: &PointerEvent) {
        self.record(dom, event.origin());
    }

    /// Connected entries, newest first. Disconnected entries are pruned.
    pub fn entries<D: Dom + ?Sized>(&self, dom: &D) -> Arc<[NodeId]> {
        let current = self.snapshot();
        if current.iter().all(|&n| dom.is_connected(n)) {
            return current;
        }
        let pruned: Vec<NodeId> = current
            .iter()
            .copied()
            .filter(|&n| dom.is_connected(n))
            .collect();
        self.store(pruned);
        self.snapshot()
    }

    /// Newest entry still in the document
    pub fn most_recent_connected<D: Dom + ?Sized>(&self, dom: &D) -> Option<NodeId> {
        self.entries(dom).first().copied()
    }

    /// Newest connected entry accepted by `filter`
    pub fn find<D, F>(&self, dom: &D, filter: F) -> Option<NodeId>
    where
        D: Dom + ?Sized,
        F: Fn(NodeId) -> bool,
    {
        self.entries(dom).iter().copied().find(|&n| filter(n))
    }

    pub fn clear(&self) {
        self.store(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn test_newest_first_and_deduplicated() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let a = dom.append_element(body, "button");
        let b = dom.append_element(body, "button");
        let history = ActiveElementHistory::new(10);

        history.record(&dom, a);
        history.record(&dom, b);
        history.record(&dom, a);
        assert_eq!(&*history.entries(&dom), &[a, b]);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let history = ActiveElementHistory::new(3);
        let buttons: Vec<_> = (0..5).map(|_| dom.append_element(body, "button")).collect();
        for &b in &buttons {
            history.record(&dom, b);
        }
        assert_eq!(&*history.entries(&dom), &[buttons[4], buttons[3], buttons[2]]);
    }

    #[test]
    fn test_disconnected_entries_are_pruned_on_read() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let a = dom.append_element(body, "button");
        let b = dom.append_element(body, "button");
        let history = ActiveElementHistory::new(10);
        history.record(&dom, a);
        history.record(&dom, b);

        dom.remove(b);
        assert_eq!(history.most_recent_connected(&dom), Some(a));
        assert_eq!(history.entries(&dom).len(), 1);
    }

    #[test]
    fn test_records_closest_focusable_ancestor() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let button = dom.append_element(body, "button");
        let icon = dom.append_element(button, "svg");
        let history = ActiveElementHistory::new(10);

        history.record(&dom, icon);
        history.record(&dom, body);
        assert_eq!(&*history.entries(&dom), &[button]);
    }
}
