//! Pointer, touch and focus events

use crate::dom::{query, Dom, NodeId};

use super::EventPropagation;

/// A `pointerdown`/`mousedown`/`click`/`pointermove` event
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// `event.target` as retargeted for the listener
    pub target: NodeId,
    /// `event.composedPath()`, innermost first. Empty when the host does not
    /// expose one.
    pub composed_path: Vec<NodeId>,
    /// Whether the event crosses shadow boundaries
    pub composed: bool,
    pub client_x: f64,
    pub client_y: f64,
    pub propagation: EventPropagation,
}

impl PointerEvent {
    /// Event targeting `target` at the origin, without a composed path
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            composed_path: Vec::new(),
            composed: false,
            client_x: 0.0,
            client_y: 0.0,
            propagation: EventPropagation::default(),
        }
    }

    /// Event whose composed path is resolved from the host tree. The
    /// listener-visible target is the outermost shadow host, as browsers
    /// retarget for document listeners.
    pub fn composed<D: Dom + ?Sized>(dom: &D, inner_target: NodeId) -> Self {
        let composed_path = query::composed_path(dom, inner_target);
        let target = composed_path
            .iter()
            .rev()
            .copied()
            .find(|&n| dom.shadow_host(n).is_some())
            .and_then(|shadow| dom.shadow_host(shadow))
            .unwrap_or(inner_target);
        Self {
            target,
            composed_path,
            composed: true,
            ..Self::new(inner_target)
        }
    }

    /// Same event at a client position
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.client_x = x;
        self.client_y = y;
        self
    }

    /// The innermost target: first entry of the composed path, else `target`
    pub fn origin(&self) -> NodeId {
        self.composed_path.first().copied().unwrap_or(self.target)
    }

    pub fn prevent_default(&mut self) {
        self.propagation.prevent_default();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.propagation.is_default_prevented()
    }
}

/// A `touchstart`/`touchend` event, reduced to its first touch point
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub target: NodeId,
    /// `touches[0]` for touchstart, `changedTouches[0]` for touchend
    pub client_x: f64,
    pub client_y: f64,
    pub propagation: EventPropagation,
}

impl TouchEvent {
    pub fn new(target: NodeId, client_x: f64, client_y: f64) -> Self {
        Self {
            target,
            client_x,
            client_y,
            propagation: EventPropagation::default(),
        }
    }

    pub fn prevent_default(&mut self) {
        self.propagation.prevent_default();
    }

    pub fn is_default_prevented(&self) -> bool {
        self.propagation.is_default_prevented()
    }
}

/// A `focus`/`blur`/`focusin`/`focusout` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    /// Element gaining (focus) or losing (blur) focus
    pub target: NodeId,
    /// The other side of the focus move, if known
    pub related_target: Option<NodeId>,
}

impl FocusEvent {
    pub fn new(target: NodeId, related_target: Option<NodeId>) -> Self {
        Self {
            target,
            related_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDom;

    #[test]
    fn test_composed_event_retargets_to_shadow_host() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let host = dom.append_element(body, "x-popover");
        let shadow = dom.attach_shadow(host);
        let button = dom.append_element(shadow, "button");

        let event = PointerEvent::composed(&dom, button);
        assert_eq!(event.target, host);
        assert_eq!(event.origin(), button);
        assert!(event.composed_path.contains(&host));
    }

    #[test]
    fn test_plain_event_origin_is_target() {
        let mut dom = MemoryDom::new();
        let body = dom.body();
        let div = dom.append_element(body, "div");

        let event = PointerEvent::new(div).at(4.0, 8.0);
        assert_eq!(event.origin(), div);
        assert_eq!(event.client_y, 8.0);
    }
}
